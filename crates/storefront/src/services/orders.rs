//! Order history helpers.

use std::collections::HashMap;

use pasarku_core::MerchantId;

use crate::api::{ApiError, Merchant, Order, PasarkuClient, UNKNOWN_MERCHANT};

/// Merchant name for every distinct merchant referenced by `orders`.
///
/// The merchant list is fetched once (and usually served from cache).
///
/// # Errors
///
/// Returns an error if the merchant list cannot be fetched.
pub async fn merchant_names(
    client: &PasarkuClient,
    orders: &[Order],
) -> Result<HashMap<MerchantId, String>, ApiError> {
    if orders.iter().all(|o| o.merchant_ref().is_none()) {
        return Ok(HashMap::new());
    }
    let merchants = client.merchants().await?;
    Ok(join_merchant_names(&merchants, orders))
}

/// Map each merchant id in `orders` to its name, or [`UNKNOWN_MERCHANT`].
#[must_use]
pub fn join_merchant_names(merchants: &[Merchant], orders: &[Order]) -> HashMap<MerchantId, String> {
    orders
        .iter()
        .filter_map(Order::merchant_ref)
        .map(|id| {
            let name = merchants
                .iter()
                .find(|m| &m.id == id)
                .map(|m| m.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string());
            (id.clone(), name)
        })
        .collect()
}

/// Name for `order`'s merchant from a map built by [`merchant_names`].
#[must_use]
pub fn merchant_name_of<'a>(names: &'a HashMap<MerchantId, String>, order: &Order) -> &'a str {
    order
        .merchant_ref()
        .and_then(|id| names.get(id))
        .map_or(UNKNOWN_MERCHANT, String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasarku_core::OrderId;

    fn order(id: &str, merchant: Option<&str>) -> Order {
        Order {
            id: OrderId::new(id),
            merchant_id: merchant.map(MerchantId::new),
            ..Order::default()
        }
    }

    #[test]
    fn test_join_defaults_unknown_merchants() {
        let merchants = vec![Merchant {
            id: MerchantId::new("m-1"),
            name: "Toko Makmur".to_string(),
            ..Merchant::default()
        }];
        let orders = vec![
            order("o-1", Some("m-1")),
            order("o-2", Some("m-9")),
            order("o-3", None),
        ];

        let names = join_merchant_names(&merchants, &orders);
        assert_eq!(names.len(), 2);
        assert_eq!(merchant_name_of(&names, &orders[0]), "Toko Makmur");
        assert_eq!(merchant_name_of(&names, &orders[1]), UNKNOWN_MERCHANT);
        assert_eq!(merchant_name_of(&names, &orders[2]), UNKNOWN_MERCHANT);
    }
}
