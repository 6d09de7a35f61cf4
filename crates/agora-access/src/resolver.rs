//! Identity resolution and user lookup.
//!
//! The engine only depends on the two traits here; storage and token
//! internals stay behind them.

use crate::{AccessResult, AuthFailure, TokenManager, TokenScope};
use agora_core::{Identity, RoleLabel, UserKey};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Turns a bearer credential into the acting identity.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolves a credential.
    ///
    /// Fails with `AccessError::AuthenticationFailure` when the credential is
    /// absent, malformed, expired or issued for another purpose.
    async fn resolve(&self, credential: &str) -> AccessResult<Identity>;
}

/// Read-only view of the user collection.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks a user up by key. `Ok(None)` means no such user.
    async fn user_by_key(&self, key: &UserKey) -> AccessResult<Option<Identity>>;
}

#[async_trait]
impl<T: UserDirectory + ?Sized> UserDirectory for Arc<T> {
    async fn user_by_key(&self, key: &UserKey) -> AccessResult<Option<Identity>> {
        (**self).user_by_key(key).await
    }
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: DashMap<UserKey, RoleLabel>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub fn insert(&self, identity: Identity) {
        self.users.insert(identity.key, identity.role);
    }

    /// Removes a user, returning its last identity.
    pub fn remove(&self, key: &UserKey) -> Option<Identity> {
        self.users
            .remove(key)
            .map(|(key, role)| Identity::new(key, role))
    }

    /// Changes the role of an existing user. Returns false if the user is unknown.
    pub fn set_role(&self, key: &UserKey, role: RoleLabel) -> bool {
        match self.users.get_mut(key) {
            Some(mut entry) => {
                *entry = role;
                true
            }
            None => false,
        }
    }

    /// Returns the number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if the directory has no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<Identity> for MemoryDirectory {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        let directory = Self::new();
        for identity in iter {
            directory.insert(identity);
        }
        directory
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn user_by_key(&self, key: &UserKey) -> AccessResult<Option<Identity>> {
        Ok(self
            .users
            .get(key)
            .map(|entry| Identity::new(entry.key().clone(), *entry.value())))
    }
}

/// Resolves access tokens against a user directory.
pub struct TokenResolver<D> {
    tokens: Arc<TokenManager>,
    directory: D,
}

impl<D: UserDirectory> TokenResolver<D> {
    /// Creates a resolver.
    pub fn new(tokens: Arc<TokenManager>, directory: D) -> Self {
        Self { tokens, directory }
    }
}

#[async_trait]
impl<D: UserDirectory> IdentityResolver for TokenResolver<D> {
    async fn resolve(&self, credential: &str) -> AccessResult<Identity> {
        let claims = self.tokens.validate(credential, TokenScope::Access)?;
        let key = UserKey::from(claims.sub);

        match self.directory.user_by_key(&key).await? {
            Some(identity) => Ok(identity),
            None => {
                tracing::warn!(user_key = %key, "Token subject not found");
                Err(AuthFailure::UnknownSubject.into())
            }
        }
    }
}
