//! Bearer token issued by the backend.
//!
//! The portal never verifies the token signature - that is the backend's job.
//! It only reads the `exp` claim from the JWT payload to decide whether a
//! stored session is still worth presenting.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading the claims of a [`BearerToken`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token does not have a `header.payload.signature` shape.
    #[error("token is not a JWT")]
    Malformed,
    /// The payload segment is not valid base64.
    #[error("token payload is not base64: {0}")]
    Encoding(String),
    /// The payload is not a JSON object with a numeric `exp`.
    #[error("token payload is not valid JSON: {0}")]
    Payload(String),
    /// The `exp` claim is outside the representable range.
    #[error("token expiry out of range: {0}")]
    ExpiryOutOfRange(i64),
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<f64>,
}

/// A bearer JWT.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Decode the `exp` claim.
    ///
    /// Returns `Ok(None)` when the payload carries no `exp`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the token is not a decodable JWT.
    pub fn expires_at(&self) -> Result<Option<DateTime<Utc>>, TokenError> {
        let payload = self.0.split('.').nth(1).ok_or(TokenError::Malformed)?;
        let trimmed = payload.trim_end_matches('=');

        let bytes = URL_SAFE_NO_PAD
            .decode(trimmed)
            .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        let claims: Claims =
            serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

        claims
            .exp
            .map(|exp| {
                // Saturates at the i64 bounds, which from_timestamp rejects
                #[allow(clippy::cast_possible_truncation)]
                let secs = exp.trunc() as i64;
                DateTime::from_timestamp(secs, 0).ok_or(TokenError::ExpiryOutOfRange(secs))
            })
            .transpose()
    }

    /// Whether the session holding this token must be ended at `now`.
    ///
    /// Undecodable tokens count as expired; a token without an `exp` claim
    /// never expires locally.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Ok(Some(exp)) => exp < now,
            Ok(None) => false,
            Err(_) => true,
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn token_with_payload(payload: &str) -> BearerToken {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        BearerToken::new(format!("{header}.{body}.signature"))
    }

    #[test]
    fn test_expires_at_reads_exp_claim() {
        let token = token_with_payload(r#"{"id":"u1","exp":1700000000}"#);
        let exp = token.expires_at().unwrap().unwrap();
        assert_eq!(exp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_fractional_and_huge_exp() {
        let token = token_with_payload(r#"{"exp":1700000000.9}"#);
        assert_eq!(token.expires_at().unwrap().unwrap().timestamp(), 1_700_000_000);

        let token = token_with_payload(r#"{"exp":1e300}"#);
        assert_eq!(token.expires_at(), Err(TokenError::ExpiryOutOfRange(i64::MAX)));
        assert!(token.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let now = Utc::now();
        let past = (now - Duration::hours(1)).timestamp();
        let token = token_with_payload(&format!(r#"{{"exp":{past}}}"#));
        assert!(token.is_expired_at(now));
    }

    #[test]
    fn test_future_expiry_is_live() {
        let now = Utc::now();
        let future = (now + Duration::hours(24)).timestamp();
        let token = token_with_payload(&format!(r#"{{"exp":{future}}}"#));
        assert!(!token.is_expired_at(now));
    }

    #[test]
    fn test_missing_exp_never_expires() {
        let token = token_with_payload(r#"{"id":"u1"}"#);
        assert_eq!(token.expires_at().unwrap(), None);
        assert!(!token.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_garbage_token_counts_as_expired() {
        let token = BearerToken::new("not-a-jwt");
        assert_eq!(token.expires_at(), Err(TokenError::Malformed));
        assert!(token.is_expired_at(Utc::now()));

        let token = BearerToken::new("a.%%%.c");
        assert!(matches!(token.expires_at(), Err(TokenError::Encoding(_))));
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = BearerToken::new("eyJhbGciOi.secret.sig");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }
}
