//! Role alternatives and matching.

use crate::{assign::decide_assignment, owner::decide_ownership, AccessError, AccessResult, Assign, Owner};
use agora_core::{Identity, RoleLabel, UserKey};

/// One legal (role, ownership policies, assignment policies) combination
/// for a protected operation.
///
/// Built at the call site and never mutated during a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAccess {
    name: RoleLabel,
    owners: Vec<Owner>,
    assigns: Vec<Assign>,
}

impl RoleAccess {
    /// Creates an alternative with no ownership or assignment constraint.
    #[must_use]
    pub fn new(name: RoleLabel) -> Self {
        Self {
            name,
            owners: Vec::new(),
            assigns: Vec::new(),
        }
    }

    /// Sets the ownership policies.
    #[must_use]
    pub fn owners(mut self, owners: impl IntoIterator<Item = Owner>) -> Self {
        self.owners = owners.into_iter().collect();
        self
    }

    /// Sets the assignment policies.
    #[must_use]
    pub fn assigns(mut self, assigns: impl IntoIterator<Item = Assign>) -> Self {
        self.assigns = assigns.into_iter().collect();
        self
    }

    /// Returns the role label.
    #[must_use]
    pub fn name(&self) -> RoleLabel {
        self.name
    }

    /// Returns the ownership policies.
    #[must_use]
    pub fn owner_policies(&self) -> &[Owner] {
        &self.owners
    }

    /// Returns the assignment policies.
    #[must_use]
    pub fn assign_policies(&self) -> &[Assign] {
        &self.assigns
    }

    /// Checks whether `initiator` may act on a resource owned by `owner_key`.
    #[must_use]
    pub fn check_owner_access(&self, initiator: &Identity, owner_key: Option<&UserKey>) -> bool {
        decide_ownership(&self.owners, initiator, owner_key)
    }

    /// Checks whether `target` may receive a role change under this alternative.
    #[must_use]
    pub fn check_assignable(&self, target: &Identity) -> bool {
        decide_assignment(&self.assigns, target)
    }
}

/// Returns the first alternative whose name equals the identity's role.
///
/// # Errors
/// Returns `AccessError::NoMatchingRole` when no alternative matches.
pub fn match_role<'a>(alternatives: &'a [RoleAccess], identity: &Identity) -> AccessResult<&'a RoleAccess> {
    alternatives
        .iter()
        .find(|alt| alt.name == identity.role)
        .ok_or(AccessError::NoMatchingRole { role: identity.role })
}
