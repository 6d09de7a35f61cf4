//! Per-invocation decision state.

use crate::RoleAccess;
use agora_core::Identity;

/// Resolved identity and matched role alternative for one invocation.
///
/// Produced by the outermost decision and threaded into nested ones so the
/// identity is resolved once per request. Operations only receive it when
/// the innermost layer keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionContext {
    identity: Identity,
    role: RoleAccess,
}

impl DecisionContext {
    /// Creates a context from an identity the caller already holds.
    #[must_use]
    pub fn new(identity: Identity, role: RoleAccess) -> Self {
        Self { identity, role }
    }

    /// Returns the acting identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the matched role alternative.
    #[must_use]
    pub fn role(&self) -> &RoleAccess {
        &self.role
    }

    /// Splits the context into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Identity, RoleAccess) {
        (self.identity, self.role)
    }
}
