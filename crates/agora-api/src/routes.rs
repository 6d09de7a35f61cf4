//! API routes.

use crate::{
    handlers::{auth, roles},
    middleware::logging_layer,
    state::AppState,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/roles", role_routes())
        .layer(middleware::from_fn(logging_layer))
        .with_state(state)
}

/// Authentication routes.
fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/refresh", post(auth::refresh_token_handler))
        .route("/logout", post(auth::logout_handler))
}

/// Role catalog routes.
fn role_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all_can_assign", get(roles::all_can_assign))
        .route("/assign", post(roles::assign))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRoleStore;
    use agora_access::{MemoryDirectory, TokenConfig, TokenManager};
    use agora_core::{default_catalog, Identity, RoleLabel};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_router() -> (Router, Arc<TokenManager>) {
        let tokens = Arc::new(TokenManager::new(TokenConfig::new("router-secret")));
        let users = Arc::new(MemoryDirectory::from_iter([
            Identity::new("u1", RoleLabel::User),
            Identity::new("a1", RoleLabel::Admin),
        ]));
        let roles = Arc::new(MemoryRoleStore::new(users.clone()));
        roles.seed(default_catalog());

        let state = AppState::builder()
            .tokens(tokens.clone())
            .directory(users)
            .roles(roles)
            .build()
            .unwrap();

        (create_router(Arc::new(state)), tokens)
    }

    #[tokio::test]
    async fn test_missing_bearer_is_unauthorized() {
        let (app, _) = test_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/roles/all_can_assign")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_lists_roles() {
        let (app, tokens) = test_router();
        let token = tokens.issue_access("a1").unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/roles/all_can_assign")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_user_cannot_list_roles() {
        let (app, tokens) = test_router();
        let token = tokens.issue_access("u1").unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/roles/all_can_assign")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
