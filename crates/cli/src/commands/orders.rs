//! Order listing and owner payment confirmation.

use pasarku_core::{OrderId, OrderStatus, StatusError, check_owner_transition};
use pasarku_storefront::api::{ApiError, Order, PasarkuClient};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur during order commands.
#[derive(Debug, Error)]
pub enum OrderCommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The order is not visible to the caller.
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Transition(#[from] StatusError),
}

/// Which orders to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Orders the caller placed.
    Buyer,
    /// Orders received by the caller's merchant.
    Merchant,
    /// Every order (owner only).
    All,
}

/// Print orders in `scope`, one per line.
///
/// # Errors
///
/// Returns an error if the request fails.
#[allow(clippy::print_stdout)]
pub async fn list(
    client: &PasarkuClient,
    token: &SecretString,
    scope: Scope,
) -> Result<(), OrderCommandError> {
    let orders = match scope {
        Scope::Buyer => client.buyer_orders(token).await?,
        Scope::Merchant => client.merchant_orders(token).await?,
        Scope::All => client.all_orders(token).await?,
    };
    tracing::info!(?scope, "Found {} orders", orders.len());

    for order in &orders {
        println!("{}", order_line(order));
    }
    Ok(())
}

/// Move an order from payment confirmation back to pending.
///
/// The current status is read first so a refused transition never reaches
/// the backend.
///
/// # Errors
///
/// Returns an error if the order is unknown, the transition is not allowed,
/// or the backend rejects the update.
pub async fn confirm_payment(
    client: &PasarkuClient,
    token: &SecretString,
    order_id: &str,
) -> Result<(), OrderCommandError> {
    let orders = client.all_orders(token).await?;
    let current = orders
        .iter()
        .find(|o| o.id.as_str() == order_id)
        .map(|o| o.status.clone())
        .ok_or_else(|| OrderCommandError::NotFound(order_id.to_owned()))?;

    check_owner_transition(&current, &OrderStatus::Pending)?;

    let id = OrderId::new(order_id);
    client
        .update_order_status(token, &id, &OrderStatus::Pending)
        .await?;
    tracing::info!(order = %id, "Payment confirmed");
    Ok(())
}

fn order_line(order: &Order) -> String {
    format!(
        "{}\t{}\tx{}\t{}\t{}",
        order.id,
        order.item_name(),
        order.quantity,
        order.total_price,
        order.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasarku_core::Rupiah;

    #[test]
    fn test_order_line() {
        let order = Order {
            id: OrderId::new("o-7"),
            quantity: 2,
            total_price: Rupiah::new(30_000),
            status: OrderStatus::Shipped,
            ..Order::default()
        };
        let line = order_line(&order);
        assert!(line.starts_with("o-7\tProduk\tx2\tRp30.000\t"));
    }
}
