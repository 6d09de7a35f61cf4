//! The acting identity.

use crate::{RoleLabel, UserKey};
use serde::{Deserialize, Serialize};

/// The resolved acting party for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User document key.
    pub key: UserKey,
    /// Current role of the user.
    pub role: RoleLabel,
}

impl Identity {
    /// Creates an identity.
    pub fn new(key: impl Into<UserKey>, role: RoleLabel) -> Self {
        Self {
            key: key.into(),
            role,
        }
    }

    /// Returns true if the identity holds the given role.
    #[must_use]
    pub fn has_role(&self, role: RoleLabel) -> bool {
        self.role == role
    }
}
