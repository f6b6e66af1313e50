//! Merchant dashboard (`/dashboard-toko/{id}`).
//!
//! Every handler first resolves the caller's own merchant through
//! `GET /merchant`. A path id that is not the caller's merchant redirects to
//! the caller's own dashboard, so one seller can never act on another's shop.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pasarku_core::{ItemForm, ItemId, MerchantId, OrderId, OrderStatus};

use crate::api::{ApiError, ItemUpdate, Merchant, MerchantMessage, NewItem, StockUpdate};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{RequireAuth, set_flash};
use crate::routes::form_data::MultipartForm;
use crate::routes::orders::{OrderRow, order_rows};
use crate::services::dashboard::{Dashboard, build_dashboard};
use crate::services::quality::validate_image;
use crate::state::AppState;

pub const ITEM_CREATED: &str = "Produk berhasil ditambahkan";
pub const ITEM_UPDATED: &str = "Produk berhasil diperbarui";
pub const ITEM_DELETED: &str = "Produk berhasil dihapus";
pub const STOCK_UPDATED: &str = "Stok berhasil diperbarui";
pub const STATUS_UPDATED: &str = "Status pesanan berhasil diperbarui";
const NO_MERCHANT: &str = "Anda belum memiliki toko. Tambahkan toko terlebih dahulu.";

#[derive(Debug, Deserialize)]
pub struct StockForm {
    pub item_id: String,
    #[serde(default)]
    pub quantity: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub confirm: Option<String>,
}

impl StatusForm {
    /// Whether the confirmation dialog was accepted.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

/// Dashboard URL for `id`.
#[must_use]
pub fn dashboard_path(id: &MerchantId) -> String {
    format!("/dashboard-toko/{}", urlencoding::encode(id.as_str()))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/show.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub base: String,
    pub dashboard: Dashboard,
    pub items_error: Option<String>,
    pub item_form: ItemForm,
    pub item_error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/orders.html")]
pub struct MerchantOrdersTemplate {
    pub layout: Layout,
    pub base: String,
    pub merchant: Merchant,
    pub orders: Vec<OrderRow>,
    pub choices: [OrderStatus; 4],
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/messages.html")]
pub struct MessagesTemplate {
    pub layout: Layout,
    pub base: String,
    pub merchant: Merchant,
    pub messages: Vec<MerchantMessage>,
    pub error: Option<String>,
}

/// Confirmation step shown before any status change.
#[derive(Template, WebTemplate)]
#[template(path = "status_confirm.html")]
pub struct StatusConfirmTemplate {
    pub layout: Layout,
    pub action: String,
    pub order_id: String,
    pub status: OrderStatus,
    pub back: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// The caller's merchant, or the response to send instead.
async fn own_merchant(
    state: &AppState,
    session: &Session,
    token: &SecretString,
    id: &str,
) -> std::result::Result<Merchant, Response> {
    match state.api().merchant(token).await {
        Ok(merchant) if merchant.id.as_str() == id => Ok(merchant),
        Ok(merchant) => {
            tracing::debug!(requested = id, own = %merchant.id, "Redirecting to own dashboard");
            Err(Redirect::to(&dashboard_path(&merchant.id)).into_response())
        }
        Err(ApiError::NotFound(_)) => {
            if let Err(e) = set_flash(session, NO_MERCHANT).await {
                tracing::warn!(error = %e, "Could not store flash message");
            }
            Err(Redirect::to("/profile").into_response())
        }
        Err(e) => Err(AppError::from(e).into_response()),
    }
}

/// Fetch stats, items and stock concurrently and join them.
async fn load_dashboard(
    state: &AppState,
    token: &SecretString,
    merchant: Merchant,
) -> (Dashboard, Option<String>) {
    let api = state.api();
    let (stats, items, stock) = tokio::join!(api.dashboard(token), api.items(token), api.stock(token));

    let stats = stats
        .inspect_err(|e| tracing::warn!(error = %e, "Dashboard stats unavailable"))
        .ok();
    let stock = stock.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stock list unavailable");
        Vec::new()
    });
    let (items, error) = match items {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::warn!(error = %e, "Item list unavailable");
            (Vec::new(), Some(e.user_message()))
        }
    };

    (build_dashboard(merchant, stats, &items, &stock), error)
}

/// Flash the outcome of a row action and go back to the dashboard.
async fn finish(
    session: &Session,
    back: &str,
    outcome: std::result::Result<(), String>,
    success: &'static str,
) -> Result<Response> {
    match outcome {
        Ok(()) => set_flash(session, success).await?,
        Err(message) => set_flash(session, message).await?,
    }
    Ok(Redirect::to(back).into_response())
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip(state, session, layout, user), fields(user_id = %user.claims.uid))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let merchant = match own_merchant(&state, &session, &user.token, &id).await {
        Ok(merchant) => merchant,
        Err(response) => return Ok(response),
    };
    let base = dashboard_path(&merchant.id);
    let (dashboard, items_error) = load_dashboard(&state, &user.token, merchant).await;

    Ok(DashboardTemplate {
        layout,
        base,
        dashboard,
        items_error,
        item_form: ItemForm::default(),
        item_error: None,
    }
    .into_response())
}

/// Add an item with its initial stock and an optional photo.
#[instrument(skip(state, session, layout, user, multipart), fields(user_id = %user.claims.uid))]
pub async fn create_item(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let merchant = match own_merchant(&state, &session, &user.token, &id).await {
        Ok(merchant) => merchant,
        Err(response) => return Ok(response),
    };
    let base = dashboard_path(&merchant.id);

    let mut upload = MultipartForm::read(multipart).await?;
    let form = ItemForm {
        name: upload.text("name"),
        category: upload.text("category"),
        price: upload.text("price"),
        stock: upload.text("stock"),
    };
    let photo = upload.take_file("photo");

    let checked = form.validate().map_err(|e| e.to_string()).and_then(|valid| {
        match &photo {
            Some(photo) => validate_image(photo).map_err(|e| e.to_string()),
            None => Ok(()),
        }
        .map(|()| valid)
    });
    let result = match checked {
        Ok(valid) => state
            .api()
            .create_item(&user.token, &NewItem::from(valid), photo)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Item creation failed");
                e.user_message()
            }),
        Err(message) => Err(message),
    };

    match result {
        Ok(()) => {
            add_breadcrumb("dashboard", "Item created", &[("merchant_id", merchant.id.as_str())]);
            set_flash(&session, ITEM_CREATED).await?;
            Ok(Redirect::to(&base).into_response())
        }
        Err(message) => {
            let (dashboard, items_error) = load_dashboard(&state, &user.token, merchant).await;
            Ok(DashboardTemplate {
                layout,
                base,
                dashboard,
                items_error,
                item_form: form,
                item_error: Some(message),
            }
            .into_response())
        }
    }
}

#[instrument(skip(state, session, user, form), fields(user_id = %user.claims.uid))]
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path((id, item_id)): Path<(String, String)>,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    let merchant = match own_merchant(&state, &session, &user.token, &id).await {
        Ok(merchant) => merchant,
        Err(response) => return Ok(response),
    };

    let outcome = match form.validate() {
        Ok(valid) => state
            .api()
            .update_item(&user.token, &ItemId::new(item_id), &ItemUpdate::from(&valid))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Item update failed");
                e.user_message()
            }),
        Err(e) => Err(e.to_string()),
    };
    finish(&session, &dashboard_path(&merchant.id), outcome, ITEM_UPDATED).await
}

#[instrument(skip(state, session, user), fields(user_id = %user.claims.uid))]
pub async fn delete_item(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Response> {
    let merchant = match own_merchant(&state, &session, &user.token, &id).await {
        Ok(merchant) => merchant,
        Err(response) => return Ok(response),
    };

    let outcome = state
        .api()
        .delete_item(&user.token, &ItemId::new(item_id))
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Item deletion failed");
            e.user_message()
        });
    finish(&session, &dashboard_path(&merchant.id), outcome, ITEM_DELETED).await
}

#[instrument(skip(state, session, user, form), fields(user_id = %user.claims.uid))]
pub async fn update_stock(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<StockForm>,
) -> Result<Response> {
    let merchant = match own_merchant(&state, &session, &user.token, &id).await {
        Ok(merchant) => merchant,
        Err(response) => return Ok(response),
    };

    let outcome = match form.quantity.trim().parse::<u32>() {
        Ok(quantity) => {
            let update = StockUpdate {
                item_id: ItemId::new(form.item_id),
                quantity,
            };
            state
                .api()
                .update_stock(&user.token, &update)
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "Stock update failed");
                    e.user_message()
                })
        }
        Err(_) => Err(pasarku_core::ValidationError::InvalidNumber("Stok").to_string()),
    };
    finish(&session, &dashboard_path(&merchant.id), outcome, STOCK_UPDATED).await
}

/// Orders received by the merchant (Daftar Pesanan).
#[instrument(skip(state, session, layout, user), fields(user_id = %user.claims.uid))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let merchant = match own_merchant(&state, &session, &user.token, &id).await {
        Ok(merchant) => merchant,
        Err(response) => return Ok(response),
    };

    let (orders, error) = match state.api().merchant_orders(&user.token).await {
        Ok(orders) => (order_rows(&state, &orders).await, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch merchant orders");
            (Vec::new(), Some(format!("Gagal memuat daftar pesanan: {}", e.user_message())))
        }
    };

    Ok(MerchantOrdersTemplate {
        layout,
        base: dashboard_path(&merchant.id),
        merchant,
        orders,
        choices: OrderStatus::MERCHANT_CHOICES,
        error,
    }
    .into_response())
}

/// Change an order's status after the confirmation step.
#[instrument(skip(state, session, layout, user, form), fields(user_id = %user.claims.uid))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Path((id, order_id)): Path<(String, String)>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let merchant = match own_merchant(&state, &session, &user.token, &id).await {
        Ok(merchant) => merchant,
        Err(response) => return Ok(response),
    };
    let back = format!("{}/orders", dashboard_path(&merchant.id));

    let status = match OrderStatus::parse_merchant_choice(&form.status) {
        Ok(status) => status,
        Err(e) => return finish(&session, &back, Err(e.to_string()), STATUS_UPDATED).await,
    };

    if !form.is_confirmed() {
        return Ok(StatusConfirmTemplate {
            layout,
            action: format!("{back}/{}/status", urlencoding::encode(&order_id)),
            order_id,
            status,
            back,
        }
        .into_response());
    }

    let order_id = OrderId::new(order_id);
    let outcome = state
        .api()
        .update_order_status(&user.token, &order_id, &status)
        .await
        .map_err(|e| {
            tracing::warn!(order = %order_id, error = %e, "Status change failed");
            format!("Gagal mengubah status pesanan: {}", e.user_message())
        });
    if outcome.is_ok() {
        add_breadcrumb(
            "order",
            "Merchant changed order status",
            &[("order_id", order_id.as_str()), ("status", status.as_str())],
        );
    }
    finish(&session, &back, outcome, STATUS_UPDATED).await
}

/// Contact messages sent to this merchant.
#[instrument(skip(state, session, layout, user), fields(user_id = %user.claims.uid))]
pub async fn messages(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let merchant = match own_merchant(&state, &session, &user.token, &id).await {
        Ok(merchant) => merchant,
        Err(response) => return Ok(response),
    };

    let (messages, error) = match state.api().merchant_messages(&user.token).await {
        Ok(messages) => (messages, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch merchant messages");
            (Vec::new(), Some(e.user_message()))
        }
    };

    Ok(MessagesTemplate {
        layout,
        base: dashboard_path(&merchant.id),
        merchant,
        messages,
        error,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_form_requires_explicit_yes() {
        let mut form = StatusForm {
            status: "shipped".to_string(),
            confirm: None,
        };
        assert!(!form.is_confirmed());
        form.confirm = Some("no".to_string());
        assert!(!form.is_confirmed());
        form.confirm = Some("yes".to_string());
        assert!(form.is_confirmed());
    }

    #[test]
    fn test_dashboard_path_is_encoded() {
        assert_eq!(dashboard_path(&MerchantId::new("m-1")), "/dashboard-toko/m-1");
        assert_eq!(dashboard_path(&MerchantId::new("a b")), "/dashboard-toko/a%20b");
    }
}
