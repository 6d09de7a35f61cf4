//! JWT token management.

use crate::{AccessError, AccessResult, AuthFailure};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Token configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret key for signing.
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Access token expiration (seconds).
    pub access_token_ttl: i64,
    /// Refresh token expiration (seconds).
    pub refresh_token_ttl: i64,
    /// Algorithm to use.
    pub algorithm: Algorithm,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            issuer: "agora".to_string(),
            access_token_ttl: 30 * 60,
            refresh_token_ttl: 86400 * 7,
            algorithm: Algorithm::HS256,
        }
    }
}

impl TokenConfig {
    /// Creates a new config with secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets access token TTL.
    #[must_use]
    pub fn with_access_ttl(mut self, seconds: i64) -> Self {
        self.access_token_ttl = seconds;
        self
    }

    /// Sets refresh token TTL.
    #[must_use]
    pub fn with_refresh_ttl(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl = seconds;
        self
    }
}

/// Purpose a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenScope {
    /// Grants access to protected operations.
    #[serde(rename = "access_token")]
    Access,
    /// Can only be exchanged for a new access token.
    #[serde(rename = "refresh_token")]
    Refresh,
}

impl TokenScope {
    /// Returns the wire name of the scope.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user key).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// JWT ID (unique identifier).
    pub jti: String,
    /// Token scope.
    pub scope: TokenScope,
}

impl TokenClaims {
    /// Creates claims for the given scope.
    ///
    /// # Errors
    /// Returns `AccessError::EngineMisconfiguration` when `ttl_seconds` does not
    /// yield a representable expiry.
    pub fn new(
        user_key: impl Into<String>,
        issuer: impl Into<String>,
        scope: TokenScope,
        ttl_seconds: i64,
    ) -> AccessResult<Self> {
        let now = Utc::now();
        let exp = Duration::try_seconds(ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AccessError::EngineMisconfiguration(format!("token lifetime of {ttl_seconds}s is out of range"))
            })?;

        Ok(Self {
            sub: user_key.into(),
            iss: issuer.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            scope,
        })
    }

    /// Checks if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Token pair (access + refresh).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Issues and verifies signed tokens.
pub struct TokenManager {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Revoked JWT IDs with their expiry.
    revoked: RwLock<HashMap<String, i64>>,
}

impl TokenManager {
    /// Creates a new token manager.
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    /// Issues an access token for a user.
    pub fn issue_access(&self, user_key: &str) -> AccessResult<String> {
        let claims = TokenClaims::new(user_key, &self.config.issuer, TokenScope::Access, self.config.access_token_ttl)?;
        self.encode(&claims)
    }

    /// Issues a refresh token for a user.
    pub fn issue_refresh(&self, user_key: &str) -> AccessResult<String> {
        let claims = TokenClaims::new(user_key, &self.config.issuer, TokenScope::Refresh, self.config.refresh_token_ttl)?;
        self.encode(&claims)
    }

    /// Issues an access and a refresh token.
    pub fn issue_pair(&self, user_key: &str) -> AccessResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(user_key)?,
            refresh_token: self.issue_refresh(user_key)?,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Encodes claims into a token.
    pub fn encode(&self, claims: &TokenClaims) -> AccessResult<String> {
        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthFailure::Malformed(e.to_string()).into())
    }

    /// Decodes a token and checks its signature, issuer and expiry.
    pub fn decode(&self, token: &str) -> AccessResult<TokenClaims> {
        if token.trim().is_empty() {
            return Err(AuthFailure::Missing.into());
        }

        let mut validation = Validation::new(self.config.algorithm);
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                AuthFailure::Expired
            } else {
                AuthFailure::Malformed(e.to_string())
            }
        })?;

        if data.claims.is_expired() {
            return Err(AuthFailure::Expired.into());
        }

        Ok(data.claims)
    }

    /// Validates a token issued for `expected` and returns its claims.
    pub fn validate(&self, token: &str, expected: TokenScope) -> AccessResult<TokenClaims> {
        let claims = self.decode(token)?;

        if self.revoked.read().contains_key(&claims.jti) {
            return Err(AuthFailure::Revoked.into());
        }

        if claims.scope != expected {
            return Err(AuthFailure::WrongScope {
                expected: expected.to_string(),
                found: claims.scope.to_string(),
            }
            .into());
        }

        Ok(claims)
    }

    /// Exchanges a refresh token for a new access token.
    pub fn refresh(&self, refresh_token: &str) -> AccessResult<String> {
        let claims = self.validate(refresh_token, TokenScope::Refresh)?;
        tracing::debug!(user_key = %claims.sub, "Refreshing access token");
        self.issue_access(&claims.sub)
    }

    /// Revokes a token by its JWT ID.
    pub fn revoke(&self, token: &str) -> AccessResult<()> {
        let claims = self.decode(token)?;
        tracing::info!(user_key = %claims.sub, jti = %claims.jti, "Revoking token");

        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write();
        // Expired tokens fail validation anyway.
        revoked.retain(|_, exp| *exp >= now);
        revoked.insert(claims.jti, claims.exp);
        Ok(())
    }

    /// Returns the number of revocations still tracked.
    #[must_use]
    pub fn revoked_count(&self) -> usize {
        self.revoked.read().len()
    }

    /// Returns the config.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_manager() -> TokenManager {
        TokenManager::new(TokenConfig::new("test-secret"))
    }

    #[test]
    fn test_issue_and_validate_access() {
        let manager = create_manager();
        let token = manager.issue_access("u1").unwrap();

        let claims = manager.validate(&token, TokenScope::Access).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.scope, TokenScope::Access);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let manager = create_manager();
        let token = manager.issue_refresh("u1").unwrap();

        let err = manager.validate(&token, TokenScope::Access).unwrap_err();
        assert!(matches!(
            err,
            AccessError::AuthenticationFailure(AuthFailure::WrongScope { .. })
        ));
    }

    #[test]
    fn test_refresh_exchange() {
        let manager = create_manager();
        let pair = manager.issue_pair("u1").unwrap();

        let access = manager.refresh(&pair.refresh_token).unwrap();
        let claims = manager.validate(&access, TokenScope::Access).unwrap();
        assert_eq!(claims.sub, "u1");

        // An access token cannot be used to refresh.
        assert!(manager.refresh(&pair.access_token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let manager = TokenManager::new(TokenConfig::new("test-secret").with_access_ttl(-3600));
        let token = manager.issue_access("u1").unwrap();

        assert_eq!(
            manager.validate(&token, TokenScope::Access).unwrap_err(),
            AccessError::AuthenticationFailure(AuthFailure::Expired)
        );
    }

    #[test]
    fn test_foreign_secret() {
        let other = TokenManager::new(TokenConfig::new("other-secret"));
        let token = other.issue_access("u1").unwrap();

        let err = create_manager().validate(&token, TokenScope::Access).unwrap_err();
        assert!(matches!(err, AccessError::AuthenticationFailure(AuthFailure::Malformed(_))));
    }

    #[test]
    fn test_missing_and_garbage() {
        let manager = create_manager();
        assert_eq!(
            manager.validate("", TokenScope::Access).unwrap_err(),
            AccessError::AuthenticationFailure(AuthFailure::Missing)
        );
        assert!(manager.validate("not-a-jwt", TokenScope::Access).is_err());
    }

    #[test]
    fn test_oversized_ttl_is_an_error() {
        let manager = TokenManager::new(TokenConfig::new("test-secret").with_access_ttl(1_000_000_000_000_000 * 60));

        let err = manager.issue_access("u1").unwrap_err();
        assert!(matches!(err, AccessError::EngineMisconfiguration(_)));
        assert!(manager.issue_pair("u1").is_err());

        let err = TokenClaims::new("u1", "agora", TokenScope::Refresh, i64::MAX).unwrap_err();
        assert!(matches!(err, AccessError::EngineMisconfiguration(_)));
    }

    #[test]
    fn test_revoke_prunes_expired_entries() {
        let manager = create_manager();
        let past = Utc::now().timestamp() - 60;
        manager.revoked.write().insert("stale".to_string(), past);

        let token = manager.issue_access("u1").unwrap();
        manager.revoke(&token).unwrap();

        assert_eq!(manager.revoked_count(), 1);
        assert!(!manager.revoked.read().contains_key("stale"));
    }

    #[test]
    fn test_revoke() {
        let manager = create_manager();
        let token = manager.issue_access("u1").unwrap();
        assert!(manager.validate(&token, TokenScope::Access).is_ok());

        manager.revoke(&token).unwrap();

        assert_eq!(
            manager.validate(&token, TokenScope::Access).unwrap_err(),
            AccessError::AuthenticationFailure(AuthFailure::Revoked)
        );
    }
}
