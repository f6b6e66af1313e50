//! Session-related types.
//!
//! The backend token is the only authentication state. It is kept server-side
//! in the session together with the claims decoded from it, so every page can
//! gate links without decoding the token again.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use pasarku_core::{Claims, ClaimsError, NavFlags, Role};

/// The logged-in user for the current request.
#[derive(Clone)]
pub struct CurrentUser {
    /// Bearer token issued by the backend.
    pub token: SecretString,
    /// Claims read (unverified) from the token payload.
    pub claims: Claims,
}

impl CurrentUser {
    /// Build from a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token payload cannot be decoded.
    pub fn from_token(token: String) -> Result<Self, ClaimsError> {
        let claims = Claims::decode_unverified(&token)?;
        Ok(Self {
            token: SecretString::from(token),
            claims,
        })
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.claims.display_name()
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.claims.role()
    }

    #[must_use]
    pub fn nav_flags(&self) -> NavFlags {
        NavFlags::from_claims(Some(&self.claims))
    }
}

impl fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentUser")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Serialized form kept in the session store.
#[derive(Serialize, Deserialize)]
pub(crate) struct StoredUser {
    token: String,
    claims: Claims,
}

impl From<&CurrentUser> for StoredUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            token: user.token.expose_secret().to_string(),
            claims: user.claims.clone(),
        }
    }
}

impl From<StoredUser> for CurrentUser {
    fn from(stored: StoredUser) -> Self {
        Self {
            token: SecretString::from(stored.token),
            claims: stored.claims,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for a one-shot message shown on the next page.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn token() -> String {
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({"uid": "u-1", "email": "sari@pasarku.id", "role": "owner"})
                .to_string(),
        );
        format!("eyJhbGciOiJIUzI1NiJ9.{payload}.c2ln")
    }

    #[test]
    fn test_debug_redacts_token() {
        let user = CurrentUser::from_token(token()).unwrap();
        let debug = format!("{user:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("c2ln"));
        assert!(user.nav_flags().is_owner);
    }

    #[test]
    fn test_round_trip_through_store() {
        let user = CurrentUser::from_token(token()).unwrap();
        let stored = StoredUser::from(&user);
        let restored = CurrentUser::from(stored);
        assert_eq!(restored.token.expose_secret(), user.token.expose_secret());
        assert_eq!(restored.claims, user.claims);
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(CurrentUser::from_token("not-a-jwt".to_string()).is_err());
    }
}
