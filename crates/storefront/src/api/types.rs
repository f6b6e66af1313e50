//! Pasarku backend wire types.
//!
//! The backend is loosely typed: numbers sometimes arrive as strings, field
//! names drift between endpoints and nested objects may be missing. Every
//! type here deserializes leniently so one odd record never blanks a page.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use pasarku_core::{
    CartEntryId, CartLine, DeliveryMethod, ItemId, MerchantId, MessageId, OrderId, OrderStatus,
    PaymentMethod, Role, Rupiah, StockId, UserId, ValidItem, ValidMerchant,
};

/// Name shown when a merchant cannot be resolved.
pub const UNKNOWN_MERCHANT: &str = "Toko Tidak Ditemukan";

// =============================================================================
// Lenient helpers
// =============================================================================

/// Accept a number or numeric string, falling back to zero.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => u32::try_from(n.max(0)).unwrap_or(u32::MAX),
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Raw::Float(f) => f.max(0.0).min(f64::from(u32::MAX)) as u32,
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
        Raw::Null(()) => 0,
    })
}

/// Parse an optional enum-like string, mapping unknown values to `None`.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().to_lowercase().parse().ok()))
}

/// Treat an explicit `null` like a missing string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a number or numeric string, falling back to zero.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n,
        Raw::Text(s) => s.trim().parse().unwrap_or(0.0),
        Raw::Null(()) => 0.0,
    })
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[serde(alias = "id", alias = "userId")]
    pub uid: UserId,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(alias = "name")]
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub merchant_id: Option<MerchantId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// =============================================================================
// Merchants
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Merchant {
    #[serde(alias = "merchantId")]
    pub id: MerchantId,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(alias = "latitude", deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lon", deserialize_with = "lenient_f64")]
    pub lng: f64,
    #[serde(alias = "photo")]
    pub photo_url: Option<String>,
}

/// Fields for `POST /merchant`; sent as multipart with an optional photo.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMerchant {
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<ValidMerchant> for NewMerchant {
    fn from(m: ValidMerchant) -> Self {
        Self {
            name: m.name,
            category: m.category,
            lat: m.lat,
            lng: m.lng,
        }
    }
}

// =============================================================================
// Items and stock
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    #[serde(alias = "itemId")]
    pub id: ItemId,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(alias = "price")]
    pub base_price: Rupiah,
    #[serde(alias = "photo", alias = "image")]
    pub photo_url: Option<String>,
    pub merchant_id: Option<MerchantId>,
    pub description: Option<String>,
}

/// Fields for `POST /item`; sent as multipart with an optional photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub base_price: Rupiah,
    pub stock: u32,
}

impl From<ValidItem> for NewItem {
    fn from(item: ValidItem) -> Self {
        Self {
            name: item.name,
            category: item.category,
            base_price: item.price,
            stock: item.stock,
        }
    }
}

/// Body of `PUT /item/:id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: String,
    pub category: String,
    pub base_price: i64,
}

impl From<&ValidItem> for ItemUpdate {
    fn from(item: &ValidItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone(),
            base_price: item.price.amount(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StockEntry {
    #[serde(alias = "stockId")]
    pub id: StockId,
    pub item_id: ItemId,
    #[serde(alias = "stock", alias = "qty", deserialize_with = "lenient_u32")]
    pub quantity: u32,
}

/// Body of `POST /stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// One row of the public catalog: a stock row joined with its item and merchant.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductListing {
    pub id: StockId,
    pub item: Item,
    pub merchant: Option<Merchant>,
    pub merchant_id: Option<MerchantId>,
    #[serde(alias = "stock", deserialize_with = "lenient_u32")]
    pub quantity: u32,
}

impl ProductListing {
    #[must_use]
    pub fn merchant_name(&self) -> &str {
        self.merchant
            .as_ref()
            .map(|m| m.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_MERCHANT)
    }

    /// Merchant id from the row, the nested merchant or the item itself.
    #[must_use]
    pub fn seller_id(&self) -> Option<&MerchantId> {
        self.merchant_id
            .as_ref()
            .or_else(|| self.merchant.as_ref().map(|m| &m.id))
            .or(self.item.merchant_id.as_ref())
            .filter(|id| !id.is_empty())
    }

    /// Item id to order; older rows only carry the stock id.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        if self.item.id.is_empty() {
            ItemId::new(self.id.as_str())
        } else {
            self.item.id.clone()
        }
    }

    /// Photo of the item, or of its merchant when the item has none.
    #[must_use]
    pub fn photo_url(&self) -> Option<&str> {
        self.item
            .photo_url
            .as_deref()
            .or_else(|| self.merchant.as_ref().and_then(|m| m.photo_url.as_deref()))
            .filter(|u| !u.is_empty())
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartEntry {
    #[serde(alias = "cartId")]
    pub id: CartEntryId,
    pub item_id: ItemId,
    pub merchant_id: MerchantId,
    #[serde(deserialize_with = "lenient_u32")]
    pub quantity: u32,
    pub item: Option<Item>,
    pub merchant: Option<Merchant>,
}

impl From<&CartEntry> for CartLine {
    fn from(entry: &CartEntry) -> Self {
        let item = entry.item.clone().unwrap_or_default();
        let item_id = if entry.item_id.is_empty() {
            item.id.clone()
        } else {
            entry.item_id.clone()
        };
        let merchant_id = if entry.merchant_id.is_empty() {
            entry
                .merchant
                .as_ref()
                .map(|m| m.id.clone())
                .or_else(|| item.merchant_id.clone())
                .unwrap_or_default()
        } else {
            entry.merchant_id.clone()
        };

        Self {
            entry_id: entry.id.clone(),
            item_id,
            merchant_id,
            name: item.name,
            merchant_name: entry
                .merchant
                .as_ref()
                .map(|m| m.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()),
            category: item.category,
            unit_price: item.base_price,
            quantity: entry.quantity,
            photo_url: item.photo_url,
        }
    }
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub item_id: ItemId,
    pub merchant_id: MerchantId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    #[serde(alias = "orderId")]
    pub id: OrderId,
    pub item_id: Option<ItemId>,
    pub item: Option<Item>,
    pub merchant_id: Option<MerchantId>,
    #[serde(deserialize_with = "lenient_u32")]
    pub quantity: u32,
    #[serde(alias = "total", alias = "totalAmount")]
    pub total_price: Rupiah,
    #[serde(deserialize_with = "lenient_enum")]
    pub delivery_method: Option<DeliveryMethod>,
    #[serde(deserialize_with = "lenient_enum")]
    pub payment_method: Option<PaymentMethod>,
    pub address: Option<String>,
    pub status: OrderStatus,
    #[serde(alias = "paymentProof")]
    pub payment_proof_url: Option<String>,
    #[serde(alias = "userName")]
    pub buyer_name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Order {
    /// Item name, or a placeholder when the backend omitted the item.
    #[must_use]
    pub fn item_name(&self) -> &str {
        self.item
            .as_ref()
            .map(|i| i.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Produk")
    }

    /// Merchant id from the order or its nested item.
    #[must_use]
    pub fn merchant_ref(&self) -> Option<&MerchantId> {
        self.merchant_id
            .as_ref()
            .or_else(|| self.item.as_ref().and_then(|i| i.merchant_id.as_ref()))
    }
}

/// Fields for `POST /order`; sent as multipart with an optional payment proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub item_id: ItemId,
    pub merchant_id: MerchantId,
    pub quantity: u32,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub address: Option<String>,
    pub total_price: Rupiah,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate<'a> {
    pub status: &'a str,
}

// =============================================================================
// Dashboard and messages
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    #[serde(alias = "totalItems", deserialize_with = "lenient_u32")]
    pub total_products: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub total_orders: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub pending_orders: u32,
    #[serde(alias = "totalRevenue")]
    pub revenue: Rupiah,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MerchantMessage {
    pub id: MessageId,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subject: String,
    #[serde(deserialize_with = "lenient_string")]
    pub message: String,
    pub created_at: Option<String>,
}

/// Body of `POST /send-message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<MerchantId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_entry_to_line() {
        let entry: CartEntry = serde_json::from_value(json!({
            "id": "c-1",
            "itemId": "i-1",
            "merchantId": "m-1",
            "quantity": "2",
            "item": { "id": "i-1", "name": "Beras 5kg", "category": "Sembako", "basePrice": 65000 },
            "merchant": { "id": "m-1", "name": "Toko Makmur" }
        }))
        .unwrap();

        let line = CartLine::from(&entry);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, Rupiah::new(65_000));
        assert_eq!(line.merchant_name, "Toko Makmur");
        assert_eq!(line.line_total(), Rupiah::new(130_000));
    }

    #[test]
    fn test_cart_entry_without_snapshot() {
        let entry: CartEntry = serde_json::from_value(json!({
            "id": "c-2",
            "quantity": 1,
            "item": { "id": "i-9", "merchantId": "m-3", "price": "12000" }
        }))
        .unwrap();

        let line = CartLine::from(&entry);
        assert_eq!(line.item_id, ItemId::new("i-9"));
        assert_eq!(line.merchant_id, MerchantId::new("m-3"));
        assert_eq!(line.merchant_name, UNKNOWN_MERCHANT);
    }

    #[test]
    fn test_order_with_unknown_methods() {
        let order: Order = serde_json::from_value(json!({
            "id": "o-1",
            "quantity": 3,
            "totalPrice": 45000,
            "deliveryMethod": "drone",
            "paymentMethod": "digital",
            "status": "konfirmasi pembayaran"
        }))
        .unwrap();

        assert_eq!(order.delivery_method, None);
        assert_eq!(order.payment_method, Some(PaymentMethod::Transfer));
        assert!(order.status.awaits_payment_confirmation());
        assert_eq!(order.item_name(), "Produk");
    }

    #[test]
    fn test_listing_merchant_fallbacks() {
        let listing: ProductListing = serde_json::from_value(json!({
            "id": "s-1",
            "item": { "id": "i-1", "name": "Cabai", "merchantId": "m-7", "basePrice": 40000 },
            "quantity": 0
        }))
        .unwrap();

        assert_eq!(listing.merchant_name(), UNKNOWN_MERCHANT);
        assert_eq!(listing.seller_id(), Some(&MerchantId::new("m-7")));
        assert!(!listing.in_stock());
    }

    #[test]
    fn test_merchant_string_coordinates() {
        let merchant: Merchant = serde_json::from_value(json!({
            "id": "m-1",
            "name": "Toko Makmur",
            "lat": "-2.97",
            "lng": 104.77
        }))
        .unwrap();
        assert!((merchant.lat - -2.97).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cart_entry_with_null_strings() {
        let entry: CartEntry = serde_json::from_value(json!({
            "id": "c-3",
            "quantity": 1,
            "item": { "id": "i-2", "name": "Tomat", "category": null, "basePrice": 8000 },
            "merchant": { "id": "m-1", "name": null }
        }))
        .unwrap();

        let item = entry.item.as_ref().unwrap();
        assert_eq!(item.category, "");
        assert_eq!(entry.merchant.as_ref().unwrap().name, "");
        assert_eq!(CartLine::from(&entry).unit_price, Rupiah::new(8_000));
    }

    #[test]
    fn test_merchant_list_with_numeric_ids() {
        let merchants: Vec<Merchant> = serde_json::from_value(json!([
            { "id": 7, "name": "Toko Tujuh", "category": "Sayur" },
            { "merchantId": "m-8", "name": "Toko Delapan" }
        ]))
        .unwrap();

        assert_eq!(merchants[0].id, MerchantId::new("7"));
        assert_eq!(merchants[1].id, MerchantId::new("m-8"));
    }
}
