//! HTTP layer for agora.
//!
//! This crate provides:
//! - Translation of access decisions into HTTP responses
//! - Bearer credential extraction
//! - The role catalog endpoints and token refresh over Axum
//! - Request logging

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::{AppState, AppStateBuilder};
pub use store::{MemoryRoleStore, RoleStore};
