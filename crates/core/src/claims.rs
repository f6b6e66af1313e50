//! Auth token claims.
//!
//! The backend issues a JWT on login. The storefront never verifies it - the
//! backend does that on every request - but it reads the payload to decide
//! which navigation links and pages to show.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Role, UserId};

/// Display name used when the token carries none.
pub const DEFAULT_DISPLAY_NAME: &str = "Pengguna";

/// Errors decoding a token payload.
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// The token does not have three dot-separated segments.
    #[error("token is not a JWT")]
    Malformed,
    /// The payload segment is not base64url.
    #[error("token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The payload is not the expected JSON object.
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Claims read from the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(alias = "user_id", alias = "id", default)]
    pub uid: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "displayName", alias = "name", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// Decode the payload of `token` without checking its signature.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimsError`] if the token is not a three-part JWT or the
    /// payload is not base64url-encoded JSON.
    pub fn decode_unverified(token: &str) -> Result<Self, ClaimsError> {
        let mut parts = token.trim().split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ClaimsError::Malformed);
        };

        // Some issuers keep the padding; the no-pad engine rejects it.
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Display name, or `Pengguna` when the token has none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    /// Role, defaulting to a regular user.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    /// When the token was issued.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|s| Utc.timestamp_opt(s, 0).single())
    }

    /// Whether the token's `exp` lies in the past. Tokens without `exp` never expire.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token_with(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    #[test]
    fn test_decode_owner_token() {
        let token = token_with(&serde_json::json!({
            "uid": "u-1",
            "email": "owner@pasarku.id",
            "displayName": "Bu Sari",
            "role": "owner",
            "iat": 1_749_600_000,
            "exp": 1_749_686_400
        }));

        let claims = Claims::decode_unverified(&token).unwrap();
        assert_eq!(claims.uid, UserId::new("u-1"));
        assert_eq!(claims.display_name(), "Bu Sari");
        assert!(claims.role().is_owner());
        assert_eq!(claims.issued_at().map(|t| t.timestamp()), Some(1_749_600_000));
    }

    #[test]
    fn test_decode_defaults() {
        let token = token_with(&serde_json::json!({ "user_id": "u-2", "email": "a@b.c" }));
        let claims = Claims::decode_unverified(&token).unwrap();
        assert_eq!(claims.uid.as_str(), "u-2");
        assert_eq!(claims.display_name(), DEFAULT_DISPLAY_NAME);
        assert_eq!(claims.role(), Role::User);
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn test_expiry() {
        let token = token_with(&serde_json::json!({ "uid": "u", "exp": 10 }));
        let claims = Claims::decode_unverified(&token).unwrap();
        assert!(claims.is_expired(Utc::now()));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Claims::decode_unverified("not-a-token"),
            Err(ClaimsError::Malformed)
        ));
        assert!(matches!(
            Claims::decode_unverified("a.@@@.c"),
            Err(ClaimsError::Base64(_))
        ));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("hello"));
        assert!(matches!(
            Claims::decode_unverified(&not_json),
            Err(ClaimsError::Json(_))
        ));
    }
}
