//! Navigation bar links.

use crate::claims::Claims;

/// Flags that decide which links the navbar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavFlags {
    pub is_logged_in: bool,
    pub is_owner: bool,
}

impl NavFlags {
    /// Flags for a visitor holding `claims` (or nothing).
    #[must_use]
    pub fn from_claims(claims: Option<&Claims>) -> Self {
        Self {
            is_logged_in: claims.is_some(),
            is_owner: claims.is_some_and(|c| c.role().is_owner()),
        }
    }
}

/// One navbar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    /// Rendered as a highlighted button (register call-to-action).
    pub special: bool,
    /// Rendered as a POST form instead of a link.
    pub is_action: bool,
}

const fn link(href: &'static str, label: &'static str) -> NavLink {
    NavLink {
        href,
        label,
        special: false,
        is_action: false,
    }
}

/// Links in display order for the given flags.
#[must_use]
pub fn nav_links(flags: NavFlags) -> Vec<NavLink> {
    let mut links = vec![
        link("/", "Home"),
        link("/products", "Products"),
        link("/about", "About"),
        link("/contact", "Contact"),
    ];

    if !flags.is_logged_in {
        links.push(link("/auth/login", "Login"));
        links.push(NavLink {
            special: true,
            ..link("/auth/register", "Register")
        });
        return links;
    }

    links.push(link("/cart", "Keranjang"));
    links.push(link("/orders", "Pesanan"));
    links.push(link("/quality-check", "Cek Kualitas"));
    if flags.is_owner {
        links.push(link("/owner", "Owner"));
    }
    links.push(link("/profile", "Profil"));
    links.push(NavLink {
        is_action: true,
        ..link("/auth/logout", "Logout")
    });
    links
}
