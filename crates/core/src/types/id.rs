//! Newtype IDs for type-safe entity references.
//!
//! The Pasarku backend hands out opaque string identifiers (document IDs).
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! passing an item ID where a cart entry ID is expected.

use serde::{Deserialize, Deserializer};

/// Read an identifier the backend may send as a string, a number or `null`.
#[doc(hidden)]
pub fn deserialize_raw_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Uint(u64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Null(()) => String::new(),
    })
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - transparent `Serialize`, and a `Deserialize` that also takes numeric IDs
///   (`null` becomes the empty ID)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Default`
/// - Accessors: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display`
///
/// # Example
///
/// ```rust
/// # use pasarku_core::define_id;
/// define_id!(ShopId);
/// define_id!(InvoiceId);
///
/// let shop = ShopId::new("toko-1");
/// let invoice = InvoiceId::new("toko-1");
///
/// // These are different types, so this won't compile:
/// // let _: ShopId = invoice;
/// assert_eq!(shop.as_str(), invoice.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            Default,
            ::serde::Serialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the raw identifier.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the backend returned an empty identifier.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_raw_id(deserializer).map(Self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(MerchantId);
define_id!(ItemId);
define_id!(StockId);
define_id!(CartEntryId);
define_id!(OrderId);
define_id!(MessageId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_transparent_in_json() {
        let id = ItemId::new("abc123");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"abc123\""));

        let parsed: Option<ItemId> = serde_json::from_str("\"xyz\"").ok();
        assert_eq!(parsed, Some(ItemId::new("xyz")));
    }

    #[test]
    fn test_numeric_and_null_ids() {
        let ids: Vec<MerchantId> = serde_json::from_str("[7, \"m-2\", null]").unwrap_or_default();
        assert_eq!(
            ids,
            vec![MerchantId::new("7"), MerchantId::new("m-2"), MerchantId::default()]
        );
    }

    #[test]
    fn test_id_display_and_empty() {
        assert_eq!(OrderId::from("o-1").to_string(), "o-1");
        assert!(MerchantId::default().is_empty());
    }
}
