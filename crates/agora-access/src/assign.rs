//! Assignment policies.

use agora_core::{Identity, RoleLabel};
use serde::{Deserialize, Serialize};

/// Role a target user must currently hold to receive a role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assign {
    /// Target currently holds `user`.
    User,
    /// Target currently holds `admin`.
    Admin,
    /// Target currently holds `super_admin`.
    SuperAdmin,
}

impl Assign {
    /// Returns the role this policy accepts.
    #[must_use]
    pub const fn role(&self) -> RoleLabel {
        match self {
            Self::User => RoleLabel::User,
            Self::Admin => RoleLabel::Admin,
            Self::SuperAdmin => RoleLabel::SuperAdmin,
        }
    }

    /// Checks the target's current role.
    #[must_use]
    pub fn permits(&self, target: &Identity) -> bool {
        target.role == self.role()
    }
}

impl From<RoleLabel> for Assign {
    fn from(label: RoleLabel) -> Self {
        match label {
            RoleLabel::User => Self::User,
            RoleLabel::Admin => Self::Admin,
            RoleLabel::SuperAdmin => Self::SuperAdmin,
        }
    }
}

/// Evaluates a list of assignment policies as OR.
///
/// An empty list accepts every target role.
#[must_use]
pub fn decide_assignment(policies: &[Assign], target: &Identity) -> bool {
    policies.is_empty() || policies.iter().any(|p| p.permits(target))
}
