//! Role catalog storage.

use crate::{ApiError, ApiResult};
use agora_access::MemoryDirectory;
use agora_core::{RoleLabel, RoleRecord, UserKey};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// Role catalog and role assignment.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Returns every role that may be handed out through assignment.
    async fn all_assignable(&self) -> ApiResult<Vec<RoleRecord>>;

    /// Looks a role up by its storage key.
    async fn role_by_key(&self, key: &str) -> ApiResult<Option<RoleRecord>>;

    /// Gives `role` to the user. Fails with `NotFound` for an unknown user.
    async fn assign(&self, user_key: &UserKey, role: &RoleRecord) -> ApiResult<()>;
}

/// In-memory role catalog backed by a [`MemoryDirectory`].
pub struct MemoryRoleStore {
    roles: RwLock<Vec<RoleRecord>>,
    users: Arc<MemoryDirectory>,
}

impl MemoryRoleStore {
    /// Creates an empty catalog writing assignments to `users`.
    pub fn new(users: Arc<MemoryDirectory>) -> Self {
        Self {
            roles: RwLock::new(Vec::new()),
            users,
        }
    }

    /// Installs `records` if the catalog is empty. Returns the number of roles added.
    ///
    /// Records without a key get a fresh one.
    pub fn seed(&self, records: impl IntoIterator<Item = RoleRecord>) -> usize {
        let mut roles = self.roles.write();
        if !roles.is_empty() {
            return 0;
        }

        roles.extend(records.into_iter().map(|record| {
            if record.key.is_some() {
                record
            } else {
                let key = uuid::Uuid::new_v4().simple().to_string();
                record.with_key(key)
            }
        }));

        tracing::info!(count = roles.len(), "Role catalog seeded");
        roles.len()
    }

    /// Returns the key of the first role with the given label.
    pub fn key_of(&self, label: RoleLabel) -> Option<String> {
        self.roles
            .read()
            .iter()
            .find(|r| r.name_en == label)
            .and_then(|r| r.key.clone())
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn all_assignable(&self) -> ApiResult<Vec<RoleRecord>> {
        Ok(self
            .roles
            .read()
            .iter()
            .filter(|r| r.name_en != RoleLabel::SuperAdmin)
            .cloned()
            .collect())
    }

    async fn role_by_key(&self, key: &str) -> ApiResult<Option<RoleRecord>> {
        Ok(self
            .roles
            .read()
            .iter()
            .find(|r| r.key.as_deref() == Some(key))
            .cloned())
    }

    async fn assign(&self, user_key: &UserKey, role: &RoleRecord) -> ApiResult<()> {
        if !self.users.set_role(user_key, role.name_en) {
            return Err(ApiError::NotFound("User not found".into()));
        }

        tracing::info!(user_key = %user_key, role = %role.name_en, "Role assigned");
        Ok(())
    }
}
