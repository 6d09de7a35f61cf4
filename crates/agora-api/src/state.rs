//! Application state.

use crate::store::RoleStore;
use agora_access::{AccessAudit, AccessHandler, TokenManager, TokenResolver, UserDirectory};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Access decision engine.
    pub access: AccessHandler,
    /// Token manager.
    pub tokens: Arc<TokenManager>,
    /// Role catalog.
    pub roles: Arc<dyn RoleStore>,
}

impl AppState {
    /// Creates a new application state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }
}

/// Builder for AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    tokens: Option<Arc<TokenManager>>,
    directory: Option<Arc<dyn UserDirectory>>,
    roles: Option<Arc<dyn RoleStore>>,
    audit: Option<Arc<AccessAudit>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token manager.
    pub fn tokens(mut self, tokens: Arc<TokenManager>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the user directory.
    pub fn directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Sets the role catalog.
    pub fn roles(mut self, roles: Arc<dyn RoleStore>) -> Self {
        self.roles = Some(roles);
        self
    }

    /// Attaches an audit service to the access engine.
    pub fn audit(mut self, audit: Arc<AccessAudit>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> Result<AppState, &'static str> {
        let tokens = self.tokens.ok_or("tokens is required")?;
        let directory = self.directory.ok_or("directory is required")?;
        let roles = self.roles.ok_or("roles is required")?;

        let resolver = Arc::new(TokenResolver::new(tokens.clone(), directory.clone()));
        let mut access = AccessHandler::new(resolver, directory);
        if let Some(audit) = self.audit {
            access = access.with_audit(audit);
        }

        Ok(AppState { access, tokens, roles })
    }
}
