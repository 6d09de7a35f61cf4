//! Bearer credential extraction.

use crate::{ApiError, ApiResult};
use axum::http::{header, HeaderMap};

/// Returns the token of an `Authorization: Bearer <token>` header.
pub fn bearer_credential(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Like [`bearer_credential`], but a missing header is a 401.
pub fn require_bearer(headers: &HeaderMap) -> ApiResult<String> {
    bearer_credential(headers).ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_credential() {
        assert_eq!(bearer_credential(&headers("Bearer abc.def")), Some("abc.def".into()));
        assert_eq!(bearer_credential(&headers("Basic dXNlcg==")), None);
        assert_eq!(bearer_credential(&headers("Bearer ")), None);
        assert_eq!(bearer_credential(&HeaderMap::new()), None);
    }

    #[test]
    fn test_require_bearer() {
        let err = require_bearer(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
