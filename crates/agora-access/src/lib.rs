//! Authorization decision engine for agora.
//!
//! For every protected operation the engine decides whether the acting
//! identity may perform it, based on:
//! - membership in one of the role alternatives listed for the operation
//! - ownership of the target resource
//! - eligibility of a target user to receive a role change
//!
//! Decisions are computed fresh per invocation; nothing is cached.

pub mod assign;
pub mod audit;
pub mod context;
pub mod error;
pub mod handler;
pub mod owner;
pub mod resolver;
pub mod role;
pub mod token;

pub use assign::{decide_assignment, Assign};
pub use audit::{AccessAudit, AuditDecision, AuditEvent, AuditSink, InMemoryAuditSink, Procedure, TracingAuditSink};
pub use context::DecisionContext;
pub use error::{AccessError, AccessResult, AuthFailure, OutcomeClass};
pub use handler::{AccessHandler, Wrapper};
pub use owner::{decide_ownership, Owner};
pub use resolver::{IdentityResolver, MemoryDirectory, TokenResolver, UserDirectory};
pub use role::{match_role, RoleAccess};
pub use token::{TokenClaims, TokenConfig, TokenManager, TokenPair, TokenScope};
