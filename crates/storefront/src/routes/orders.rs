//! Buyer order history.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use pasarku_core::{MerchantId, OrderStatus, Rupiah};

use crate::api::Order;
use crate::filters;
use crate::layout::Layout;
use crate::middleware::RequireAuth;
use crate::services::orders::{merchant_name_of, merchant_names};
use crate::state::AppState;

/// One order as listed to buyers, merchants and the owner.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub item_name: String,
    pub merchant_name: String,
    pub buyer_name: Option<String>,
    pub quantity: u32,
    pub total: Rupiah,
    pub delivery: &'static str,
    pub payment: &'static str,
    pub address: Option<String>,
    pub status: OrderStatus,
    pub proof_url: Option<String>,
    pub created_at: Option<String>,
}

impl OrderRow {
    #[must_use]
    pub fn new(order: &Order, names: &HashMap<MerchantId, String>) -> Self {
        Self {
            id: order.id.to_string(),
            item_name: order.item_name().to_string(),
            merchant_name: merchant_name_of(names, order).to_string(),
            buyer_name: order.buyer_name.clone(),
            quantity: order.quantity,
            total: order.total_price,
            delivery: order.delivery_method.map_or("-", |m| m.label()),
            payment: order.payment_method.map_or("-", |m| m.label()),
            address: order.address.clone().filter(|a| !a.trim().is_empty()),
            status: order.status.clone(),
            proof_url: order.payment_proof_url.clone(),
            created_at: order.created_at.clone(),
        }
    }
}

/// Build display rows, resolving merchant names with one merchant fetch.
///
/// A failed merchant fetch degrades to the unknown-merchant placeholder.
pub async fn order_rows(state: &AppState, orders: &[Order]) -> Vec<OrderRow> {
    let names = match merchant_names(state.api(), orders).await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(error = %e, "Merchant names unavailable");
            HashMap::new()
        }
    };
    orders.iter().map(|o| OrderRow::new(o, &names)).collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrderHistoryTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderRow>,
    pub error: Option<String>,
}

#[instrument(skip(state, layout, user), fields(user_id = %user.claims.uid))]
pub async fn history(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let (orders, error) = match state.api().buyer_orders(&user.token).await {
        Ok(orders) => (order_rows(&state, &orders).await, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch order history");
            (Vec::new(), Some(e.user_message()))
        }
    };

    OrderHistoryTemplate {
        layout,
        orders,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasarku_core::{DeliveryMethod, OrderId, PaymentMethod};

    #[test]
    fn test_row_labels_and_fallbacks() {
        let order = Order {
            id: OrderId::new("o-1"),
            merchant_id: Some(MerchantId::new("m-1")),
            quantity: 2,
            total_price: Rupiah::new(20_000),
            delivery_method: Some(DeliveryMethod::Ambil),
            payment_method: Some(PaymentMethod::Transfer),
            address: Some("  ".to_string()),
            ..Order::default()
        };
        let mut names = HashMap::new();
        names.insert(MerchantId::new("m-1"), "Toko Makmur".to_string());

        let row = OrderRow::new(&order, &names);
        assert_eq!(row.merchant_name, "Toko Makmur");
        assert_eq!(row.delivery, DeliveryMethod::Ambil.label());
        assert_eq!(row.address, None);

        let orphan = OrderRow::new(&Order::default(), &names);
        assert_eq!(orphan.delivery, "-");
        assert_eq!(orphan.merchant_name, crate::api::UNKNOWN_MERCHANT);
    }
}
