//! Cart line arithmetic.
//!
//! Cart entries live on the backend. The storefront keeps a flat list of
//! lines for the page being rendered, recomputes the totals from that list and
//! patches it in place when the buyer changes a quantity.

use serde::{Deserialize, Serialize};

use crate::types::{CartEntryId, ItemId, MerchantId, Rupiah};
use crate::validation::ValidationError;

/// A cart line as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub entry_id: CartEntryId,
    pub item_id: ItemId,
    pub merchant_id: MerchantId,
    pub name: String,
    pub merchant_name: String,
    pub category: String,
    pub unit_price: Rupiah,
    pub quantity: u32,
    pub photo_url: Option<String>,
}

impl CartLine {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Rupiah {
        self.unit_price.times(self.quantity)
    }
}

/// Totals over a list of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Σ quantity.
    pub total_quantity: u32,
    /// Σ price × quantity.
    pub subtotal: Rupiah,
}

impl CartSummary {
    /// Compute the totals of `lines`.
    #[must_use]
    pub fn of(lines: &[CartLine]) -> Self {
        Self {
            total_quantity: lines
                .iter()
                .fold(0u32, |acc, l| acc.saturating_add(l.quantity)),
            subtotal: lines.iter().map(CartLine::line_total).sum(),
        }
    }

    /// Whether the cart has nothing to check out.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_quantity == 0
    }
}

/// Return `lines` with the quantity of `entry_id` set to `quantity`.
///
/// # Errors
///
/// Returns [`ValidationError::QuantityTooLow`] when `quantity` is zero and
/// [`ValidationError::UnknownCartEntry`] when no line has `entry_id`.
pub fn apply_quantity(
    lines: &[CartLine],
    entry_id: &CartEntryId,
    quantity: u32,
) -> Result<Vec<CartLine>, ValidationError> {
    if quantity < 1 {
        return Err(ValidationError::QuantityTooLow);
    }
    if !lines.iter().any(|l| &l.entry_id == entry_id) {
        return Err(ValidationError::UnknownCartEntry);
    }

    Ok(lines
        .iter()
        .map(|l| {
            if &l.entry_id == entry_id {
                CartLine {
                    quantity,
                    ..l.clone()
                }
            } else {
                l.clone()
            }
        })
        .collect())
}

/// Return `lines` without `entry_id`.
#[must_use]
pub fn remove_line(lines: &[CartLine], entry_id: &CartEntryId) -> Vec<CartLine> {
    lines
        .iter()
        .filter(|l| &l.entry_id != entry_id)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, price: i64, quantity: u32) -> CartLine {
        CartLine {
            entry_id: CartEntryId::new(id),
            item_id: ItemId::new(format!("item-{id}")),
            merchant_id: MerchantId::new("m-1"),
            name: format!("Produk {id}"),
            merchant_name: "Toko Sumber Rejeki".to_owned(),
            category: "Sembako".to_owned(),
            unit_price: Rupiah::new(price),
            quantity,
            photo_url: None,
        }
    }

    #[test]
    fn test_summary_matches_line_totals() {
        let lines = vec![line("a", 65_000, 2), line("b", 32_000, 1)];
        let summary = CartSummary::of(&lines);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.subtotal, Rupiah::new(162_000));
        assert_eq!(
            summary.subtotal,
            lines.iter().map(CartLine::line_total).sum::<Rupiah>()
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::of(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.subtotal, Rupiah::ZERO);
    }

    #[test]
    fn test_apply_quantity_patches_one_line() {
        let lines = vec![line("a", 10_000, 1), line("b", 5_000, 4)];
        let patched = apply_quantity(&lines, &CartEntryId::new("a"), 3).unwrap();
        assert_eq!(patched[0].quantity, 3);
        assert_eq!(patched[1].quantity, 4);
        assert_eq!(CartSummary::of(&patched).subtotal, Rupiah::new(50_000));
    }

    #[test]
    fn test_apply_quantity_rejects_zero_and_unknown() {
        let lines = vec![line("a", 10_000, 1)];
        assert_eq!(
            apply_quantity(&lines, &CartEntryId::new("a"), 0),
            Err(ValidationError::QuantityTooLow)
        );
        assert_eq!(
            apply_quantity(&lines, &CartEntryId::new("zzz"), 2),
            Err(ValidationError::UnknownCartEntry)
        );
    }

    #[test]
    fn test_remove_line() {
        let lines = vec![line("a", 10_000, 1), line("b", 5_000, 4)];
        let remaining = remove_line(&lines, &CartEntryId::new("a"));
        assert_eq!(remaining.len(), 1);
        assert_eq!(CartSummary::of(&remaining).subtotal, Rupiah::new(20_000));
    }
}
