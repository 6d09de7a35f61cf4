//! # Agora Core
//!
//! Core domain types shared by the agora crates:
//! - Opaque user keys (newtype pattern)
//! - Role labels and the role catalog
//! - The acting identity resolved for a request
//! - Error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod role;
pub mod user;

pub use error::{CoreError, CoreResult};
pub use id::UserKey;
pub use role::{default_catalog, RoleLabel, RoleRecord};
pub use user::Identity;
