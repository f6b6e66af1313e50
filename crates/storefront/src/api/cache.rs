//! Cache types for public catalog responses.

use super::types::{Merchant, ProductListing};

/// Cache key for catalog data.
///
/// Only data that is identical for every visitor is cached. Carts, orders and
/// profiles are always fetched fresh.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// Search results for a normalized query (empty for the full catalog).
    Search(String),
    Merchants,
}

impl CacheKey {
    /// Key for a search query, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn search(query: &str) -> Self {
        Self::Search(query.trim().to_lowercase())
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Listings(Vec<ProductListing>),
    Merchants(Vec<Merchant>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key_is_normalized() {
        assert_eq!(CacheKey::search("  Beras "), CacheKey::search("beras"));
        assert_ne!(CacheKey::search("beras"), CacheKey::search("gula"));
    }
}
