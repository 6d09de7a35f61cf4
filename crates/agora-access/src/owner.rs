//! Ownership policies.

use agora_core::{Identity, UserKey};
use serde::{Deserialize, Serialize};

/// Rule deciding whether an identity may act on a resource given its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    /// Any resource, whoever owns it.
    Any,
    /// Only resources owned by the acting identity.
    Own,
}

impl Owner {
    /// Checks the policy against the resource owner.
    ///
    /// An absent owner never satisfies `Own`.
    #[must_use]
    pub fn permits(&self, initiator: &Identity, owner_key: Option<&UserKey>) -> bool {
        match self {
            Self::Any => true,
            Self::Own => owner_key.map_or(false, |key| *key == initiator.key),
        }
    }
}

/// Evaluates a list of ownership policies as OR.
///
/// An empty list attaches no ownership constraint.
#[must_use]
pub fn decide_ownership(policies: &[Owner], initiator: &Identity, owner_key: Option<&UserKey>) -> bool {
    policies.is_empty() || policies.iter().any(|p| p.permits(initiator, owner_key))
}
