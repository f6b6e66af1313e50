//! Merchant dashboard view model.
//!
//! The dashboard is assembled from four independent fetches (merchant, stats,
//! items, stock). Items and stock rows are joined by item id.

use std::collections::HashMap;

use pasarku_core::{ItemId, Rupiah};

use crate::api::{DashboardStats, Item, Merchant, StockEntry};

/// One row of the merchant's item table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardItemView {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub price: Rupiah,
    pub stock: u32,
    pub photo_url: Option<String>,
    /// Shown as active while there is stock to sell.
    pub is_active: bool,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub merchant: Merchant,
    pub stats: DashboardStats,
    /// Set when the stats fetch failed and zeros are shown instead.
    pub stats_unavailable: bool,
    pub items: Vec<DashboardItemView>,
}

impl Dashboard {
    /// Total units in stock across all items.
    #[must_use]
    pub fn total_stock(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.stock))
    }

    /// Items with no stock left.
    #[must_use]
    pub fn inactive_count(&self) -> usize {
        self.items.iter().filter(|i| !i.is_active).count()
    }
}

/// Join items with their stock rows.
///
/// `stats` is `None` when its fetch failed; the page then shows zeros but
/// still renders the item list.
#[must_use]
pub fn build_dashboard(
    merchant: Merchant,
    stats: Option<DashboardStats>,
    items: &[Item],
    stock: &[StockEntry],
) -> Dashboard {
    let stock_by_item: HashMap<&ItemId, u32> = stock
        .iter()
        .map(|entry| (&entry.item_id, entry.quantity))
        .collect();

    let items = items
        .iter()
        .map(|item| {
            let stock = stock_by_item.get(&item.id).copied().unwrap_or(0);
            DashboardItemView {
                id: item.id.clone(),
                name: item.name.clone(),
                category: item.category.clone(),
                price: item.base_price,
                stock,
                photo_url: item.photo_url.clone(),
                is_active: stock > 0,
            }
        })
        .collect();

    Dashboard {
        merchant,
        stats_unavailable: stats.is_none(),
        stats: stats.unwrap_or_default(),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasarku_core::StockId;

    fn item(id: &str, price: i64) -> Item {
        Item {
            id: ItemId::new(id),
            name: format!("Produk {id}"),
            category: "Sayur".to_string(),
            base_price: Rupiah::new(price),
            ..Item::default()
        }
    }

    fn stock(item_id: &str, quantity: u32) -> StockEntry {
        StockEntry {
            id: StockId::new(format!("s-{item_id}")),
            item_id: ItemId::new(item_id),
            quantity,
        }
    }

    #[test]
    fn test_joins_stock_by_item() {
        let dashboard = build_dashboard(
            Merchant::default(),
            Some(DashboardStats {
                total_orders: 4,
                ..DashboardStats::default()
            }),
            &[item("a", 10_000), item("b", 5_000), item("c", 2_000)],
            &[stock("a", 7), stock("b", 0)],
        );

        assert_eq!(dashboard.items[0].stock, 7);
        assert!(dashboard.items[0].is_active);
        assert!(!dashboard.items[1].is_active);
        // No stock row at all counts as empty.
        assert_eq!(dashboard.items[2].stock, 0);
        assert_eq!(dashboard.total_stock(), 7);
        assert_eq!(dashboard.inactive_count(), 2);
        assert!(!dashboard.stats_unavailable);
        assert_eq!(dashboard.stats.total_orders, 4);
    }

    #[test]
    fn test_missing_stats_default_to_zero() {
        let dashboard = build_dashboard(Merchant::default(), None, &[item("a", 1_000)], &[]);
        assert!(dashboard.stats_unavailable);
        assert_eq!(dashboard.stats, DashboardStats::default());
        assert_eq!(dashboard.items.len(), 1);
    }
}
