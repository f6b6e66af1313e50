//! Checkout: one order per cart line, then cart cleanup.
//!
//! The backend has no batch order endpoint. Orders are placed one line at a
//! time and failures are collected rather than compensated. The cart is only
//! cleared when every line was ordered, so a partial failure leaves the buyer
//! with the cart they can retry from.

use secrecy::SecretString;
use thiserror::Error;
use tracing::instrument;

use pasarku_core::{CartLine, CheckoutSelection};

use crate::api::{ApiError, NewOrder, PasarkuClient, Upload};

/// A cart line the backend refused to order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub item_name: String,
    pub message: String,
}

/// Result of a checkout attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// Number of orders created.
    pub placed: usize,
    /// Lines whose order failed.
    pub failures: Vec<LineFailure>,
    /// Ordered lines whose cart entry could not be deleted afterwards.
    pub cleanup_failures: Vec<LineFailure>,
}

impl CheckoutOutcome {
    /// Every line was ordered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.placed > 0
    }
}

/// Errors that stop a checkout before any order is placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Keranjang belanja kosong")]
    EmptyCart,
    #[error("Gagal memproses pembayaran: {0}")]
    Api(#[from] ApiError),
}

/// Order every cart line with the chosen payment and shipping options.
///
/// The proof of payment, if any, is attached to every order since each one is
/// confirmed separately by the owner.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] when `lines` is empty. Backend failures
/// on individual lines are reported in the outcome instead.
#[instrument(skip(client, token, lines, proof), fields(lines = lines.len()))]
pub async fn place_orders(
    client: &PasarkuClient,
    token: &SecretString,
    lines: &[CartLine],
    selection: &CheckoutSelection,
    proof: Option<&Upload>,
) -> Result<CheckoutOutcome, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut outcome = CheckoutOutcome::default();
    for line in lines {
        let order = NewOrder {
            item_id: line.item_id.clone(),
            merchant_id: line.merchant_id.clone(),
            quantity: line.quantity,
            delivery_method: selection.shipping.method,
            payment_method: selection.payment.method,
            address: selection.address.clone(),
            total_price: line.line_total(),
        };

        match client.create_order(token, &order, proof.cloned()).await {
            Ok(()) => outcome.placed += 1,
            Err(e) => {
                tracing::warn!(item = %line.name, error = %e, "Order for cart line failed");
                outcome.failures.push(LineFailure {
                    item_name: line.name.clone(),
                    message: e.user_message(),
                });
            }
        }
    }

    if !outcome.failures.is_empty() {
        return Ok(outcome);
    }

    for line in lines {
        if let Err(e) = client.remove_cart_entry(token, &line.entry_id).await {
            tracing::warn!(
                entry = %line.entry_id,
                error = %e,
                "Ordered line could not be removed from cart"
            );
            outcome.cleanup_failures.push(LineFailure {
                item_name: line.name.clone(),
                message: e.user_message(),
            });
        }
    }

    tracing::info!(placed = outcome.placed, "Checkout completed");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_completeness() {
        assert!(!CheckoutOutcome::default().is_complete());

        let ok = CheckoutOutcome {
            placed: 2,
            ..CheckoutOutcome::default()
        };
        assert!(ok.is_complete());

        let partial = CheckoutOutcome {
            placed: 1,
            failures: vec![LineFailure {
                item_name: "Telur".to_string(),
                message: "Stok habis".to_string(),
            }],
            cleanup_failures: Vec::new(),
        };
        assert!(!partial.is_complete());
    }
}
