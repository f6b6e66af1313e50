//! Data every page hands to `base.html`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use pasarku_core::{NavFlags, NavLink, nav_links};

use crate::middleware::{CspNonce, OptionalAuth, take_flash};
use crate::models::CurrentUser;

/// Navbar, nonce and flash message for the shared layout.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub nav: Vec<NavLink>,
    pub flags: NavFlags,
    pub nonce: String,
    pub user_name: Option<String>,
    pub flash: Option<String>,
}

impl Layout {
    #[must_use]
    pub fn new(user: Option<&CurrentUser>, nonce: CspNonce) -> Self {
        let flags = user.map_or_else(NavFlags::default, CurrentUser::nav_flags);
        Self {
            nav: nav_links(flags),
            flags,
            nonce: nonce.0,
            user_name: user.map(|u| u.display_name().to_string()),
            flash: None,
        }
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.flags.is_logged_in
    }

    #[must_use]
    pub const fn is_owner(&self) -> bool {
        self.flags.is_owner
    }
}

impl<S> FromRequestParts<S> for Layout
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;
        let nonce = CspNonce::from_request_parts(parts, state).await?;
        let mut layout = Self::new(user.as_ref(), nonce);
        if let Some(session) = parts.extensions.get::<Session>() {
            layout.flash = take_flash(session).await;
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_layout() {
        let layout = Layout::new(None, CspNonce("n".to_string()));
        assert!(!layout.is_logged_in());
        assert!(layout.user_name.is_none());
        assert!(layout.nav.iter().any(|l| l.href == "/auth/login"));
    }
}
