//! Role catalog handlers.

use crate::{
    error::ApiError,
    middleware::require_bearer,
    response::{ListResponse, MessageResponse},
    state::AppState,
    ApiResult,
};
use agora_access::{Assign, RoleAccess};
use agora_core::{RoleLabel, RoleRecord, UserKey};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Roles allowed to manage role assignments, with the target roles each may reassign.
fn role_managers() -> Vec<RoleAccess> {
    vec![
        RoleAccess::new(RoleLabel::SuperAdmin).assigns([Assign::Admin, Assign::User]),
        RoleAccess::new(RoleLabel::Admin).assigns([Assign::Admin, Assign::User]),
    ]
}

/// Lists every role that can be assigned.
pub async fn all_can_assign(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ListResponse<RoleRecord>>> {
    let token = require_bearer(&headers)?;

    state
        .access
        .require_role(Some(&token), Some(role_managers()))
        .invoke(|| async {
            let roles = state.roles.all_assignable().await?;
            Ok::<_, ApiError>(Json(ListResponse::from(roles)))
        })
        .await
}

/// Query of an assignment request.
#[derive(Debug, Deserialize)]
pub struct AssignQuery {
    /// Key of the role to give.
    pub role_key: String,
    /// Key of the user receiving it.
    pub user_key: String,
}

/// Assigns a role to a user.
pub async fn assign(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AssignQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let token = require_bearer(&headers)?;
    let user_key = UserKey::parse(&query.user_key)?;

    state
        .access
        .require_role(Some(&token), Some(role_managers()))
        .keep_context()
        .nest(state.access.require_assignable(user_key.clone(), None, None, true))
        .invoke(|| async {
            let role = state
                .roles
                .role_by_key(&query.role_key)
                .await?
                .ok_or_else(|| ApiError::NotFound("Role not found".into()))?;

            state.roles.assign(&user_key, &role).await?;
            Ok::<_, ApiError>(Json(MessageResponse::new("Role successfully assigned")))
        })
        .await
}
