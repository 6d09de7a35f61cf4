//! Access control error types.

use agora_core::{RoleLabel, UserKey};
use std::fmt;
use thiserror::Error;

/// Access control result type.
pub type AccessResult<T> = Result<T, AccessError>;

/// Why a credential could not be resolved to an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No credential was presented.
    Missing,
    /// The credential could not be decoded or its signature is invalid.
    Malformed(String),
    /// The credential is past its expiry.
    Expired,
    /// The credential was issued for another purpose.
    WrongScope {
        /// Scope the caller required.
        expected: String,
        /// Scope carried by the credential.
        found: String,
    },
    /// The credential was revoked.
    Revoked,
    /// The credential names a user that does not exist.
    UnknownSubject,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "no credential presented"),
            Self::Malformed(reason) => write!(f, "invalid token: {}", reason),
            Self::Expired => write!(f, "token expired"),
            Self::WrongScope { expected, found } => {
                write!(f, "scope for the token is invalid: expected {}, got {}", expected, found)
            }
            Self::Revoked => write!(f, "token has been revoked"),
            Self::UnknownSubject => write!(f, "token subject is not a known user"),
        }
    }
}

/// Outcome class used by the external translation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    /// The credential is bad.
    Authentication,
    /// The credential is fine, policy says no.
    Authorization,
    /// The object of the decision does not exist.
    NotFound,
    /// The engine itself could not verify access.
    Verification,
}

/// Access control errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The credential could not be resolved.
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(AuthFailure),

    /// The identity's role is not among the supplied alternatives.
    #[error("The user's role '{role}' is not in the list of roles allowed for this method")]
    NoMatchingRole {
        /// Role held by the acting identity.
        role: RoleLabel,
    },

    /// The role matched but no ownership policy accepted the resource.
    #[error("Ownership of the resource does not permit this action")]
    OwnershipDenied,

    /// The role matched but the target's role cannot be reassigned by it.
    #[error("Users with role '{target_role}' cannot be assigned by this role")]
    AssignmentDenied {
        /// Current role of the target user.
        target_role: RoleLabel,
    },

    /// The target user of an assignment does not exist.
    #[error("User not found: {0}")]
    TargetNotFound(UserKey),

    /// A decision was requested without the inputs it needs.
    #[error("Engine misconfiguration: {0}")]
    EngineMisconfiguration(String),

    /// The user directory failed to answer.
    #[error("Directory lookup failed: {0}")]
    Directory(String),
}

impl AccessError {
    /// Returns the outcome class.
    #[must_use]
    pub fn class(&self) -> OutcomeClass {
        match self {
            Self::AuthenticationFailure(_) => OutcomeClass::Authentication,
            Self::NoMatchingRole { .. } | Self::OwnershipDenied | Self::AssignmentDenied { .. } => {
                OutcomeClass::Authorization
            }
            Self::TargetNotFound(_) => OutcomeClass::NotFound,
            Self::EngineMisconfiguration(_) | Self::Directory(_) => OutcomeClass::Verification,
        }
    }

    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure(AuthFailure::Expired) => "TOKEN_EXPIRED",
            Self::AuthenticationFailure(AuthFailure::WrongScope { .. }) => "INVALID_SCOPE",
            Self::AuthenticationFailure(_) => "UNAUTHORIZED",
            Self::NoMatchingRole { .. } => "NO_MATCHING_ROLE",
            Self::OwnershipDenied => "OWNERSHIP_DENIED",
            Self::AssignmentDenied { .. } => "ASSIGNMENT_DENIED",
            Self::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Self::EngineMisconfiguration(_) | Self::Directory(_) => "ACCESS_VERIFICATION_FAILED",
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self.class() {
            OutcomeClass::Authentication => 401,
            OutcomeClass::Authorization => 403,
            OutcomeClass::NotFound => 404,
            OutcomeClass::Verification => 500,
        }
    }

    /// Returns true for denials decided by policy.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        self.class() == OutcomeClass::Authorization
    }
}

impl From<AuthFailure> for AccessError {
    fn from(failure: AuthFailure) -> Self {
        Self::AuthenticationFailure(failure)
    }
}
