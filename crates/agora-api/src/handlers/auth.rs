//! Authentication handlers.

use crate::{middleware::require_bearer, response::MessageResponse, state::AppState, ApiResult};
use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Fresh access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type.
    pub token_type: String,
    /// Expires in seconds.
    pub expires_in: i64,
}

/// Exchanges the refresh token in the bearer header for a new access token.
pub async fn refresh_token_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<AccessTokenResponse>> {
    let refresh_token = require_bearer(&headers)?;
    let access_token = state.tokens.refresh(&refresh_token)?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.config().access_token_ttl,
    }))
}

/// Revokes the token in the bearer header.
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<MessageResponse>> {
    let token = require_bearer(&headers)?;
    state.tokens.revoke(&token)?;

    Ok(Json(MessageResponse::new("Logged out successfully")))
}
