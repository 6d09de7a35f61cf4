//! API middleware.

pub mod auth;
pub mod logging;

pub use auth::{bearer_credential, require_bearer};
pub use logging::logging_layer;
