//! Request authentication.
//!
//! Every trigger must carry `Authorization: Bearer <token>`. Verification runs
//! before the job is looked up or the body is read.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use crate::ListenerError;

/// Decides whether a request may trigger jobs.
pub trait TokenVerifier: Send + Sync {
    /// Returns `Ok(())` if the request is authenticated.
    fn verify(&self, headers: &HeaderMap) -> Result<(), ListenerError>;
}

/// Accepts requests bearing one pre-shared token.
pub struct SharedSecretVerifier {
    token: String,
}

impl SharedSecretVerifier {
    /// Creates a verifier for `token`. Returns `None` for an empty token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self { token })
        }
    }
}

impl std::fmt::Debug for SharedSecretVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier for SharedSecretVerifier {
    fn verify(&self, headers: &HeaderMap) -> Result<(), ListenerError> {
        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(ListenerError::MissingToken)?;
        if constant_time_str_eq(presented, &self.token) {
            Ok(())
        } else {
            Err(ListenerError::InvalidToken)
        }
    }
}

fn constant_time_str_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn accepts_matching_bearer_token() {
        let verifier = SharedSecretVerifier::new("s3cret").unwrap();
        assert!(verifier.verify(&headers(Some("Bearer s3cret"))).is_ok());
    }

    #[test]
    fn rejects_missing_or_wrong_tokens() {
        let verifier = SharedSecretVerifier::new("s3cret").unwrap();
        assert!(matches!(
            verifier.verify(&headers(None)),
            Err(ListenerError::MissingToken)
        ));
        assert!(matches!(
            verifier.verify(&headers(Some("Basic s3cret"))),
            Err(ListenerError::MissingToken)
        ));
        assert!(matches!(
            verifier.verify(&headers(Some("Bearer s3cre"))),
            Err(ListenerError::InvalidToken)
        ));
    }

    #[test]
    fn empty_token_is_not_a_verifier() {
        assert!(SharedSecretVerifier::new("").is_none());
        let debug = format!("{:?}", SharedSecretVerifier::new("s3cret").unwrap());
        assert!(!debug.contains("s3cret"));
    }
}
