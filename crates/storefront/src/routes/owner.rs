//! Owner oversight page.
//!
//! Lists every order across merchants. The only change an owner can make here
//! is confirming a transfer payment, which moves the order from
//! `konfirmasi pembayaran` back to `pending`. The restriction is checked
//! before anything is sent to the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;
use tracing::instrument;

use pasarku_core::{OrderId, OrderStatus, check_owner_transition};

use crate::api::Order;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{RequireAuth, set_flash};
use crate::routes::dashboard::{STATUS_UPDATED, StatusConfirmTemplate, StatusForm};
use crate::routes::orders::{OrderRow, order_rows};
use crate::state::AppState;

const OWNER_PATH: &str = "/owner";

#[derive(Template, WebTemplate)]
#[template(path = "owner.html")]
pub struct OwnerTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderRow>,
    pub error: Option<String>,
}

fn current_status(orders: &[Order], id: &str) -> Option<OrderStatus> {
    orders
        .iter()
        .find(|o| o.id.as_str() == id)
        .map(|o| o.status.clone())
}

/// Whether the backend profile says the caller is an owner.
///
/// The token's role claim is only used for the navbar; the page itself
/// trusts the backend.
async fn is_owner(state: &AppState, token: &SecretString) -> Result<bool> {
    Ok(state.api().profile(token).await?.role.is_owner())
}

#[instrument(skip(state, layout, user), fields(user_id = %user.claims.uid))]
pub async fn index(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    if !is_owner(&state, &user.token).await? {
        tracing::info!("Non-owner redirected away from owner page");
        return Ok(Redirect::to("/").into_response());
    }

    let (orders, error) = match state.api().all_orders(&user.token).await {
        Ok(orders) => (order_rows(&state, &orders).await, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch all orders");
            (
                Vec::new(),
                Some(format!("Gagal mengambil daftar pesanan: {}", e.user_message())),
            )
        }
    };

    Ok(OwnerTemplate {
        layout,
        orders,
        error,
    }
    .into_response())
}

/// Apply the owner's payment confirmation.
#[instrument(skip(state, session, layout, user, form), fields(user_id = %user.claims.uid))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    if !is_owner(&state, &user.token).await? {
        return Ok(Redirect::to("/").into_response());
    }

    let orders = state.api().all_orders(&user.token).await?;
    let Some(current) = current_status(&orders, &order_id) else {
        set_flash(&session, "Pesanan tidak ditemukan").await?;
        return Ok(Redirect::to(OWNER_PATH).into_response());
    };

    let requested = OrderStatus::from(form.status.trim().to_string());
    if let Err(e) = check_owner_transition(&current, &requested) {
        tracing::warn!(from = %current, to = %requested, "Owner transition refused");
        set_flash(&session, e.to_string()).await?;
        return Ok(Redirect::to(OWNER_PATH).into_response());
    }

    if !form.is_confirmed() {
        return Ok(StatusConfirmTemplate {
            layout,
            action: format!("{OWNER_PATH}/orders/{}/status", urlencoding::encode(&order_id)),
            order_id,
            status: requested,
            back: OWNER_PATH.to_string(),
        }
        .into_response());
    }

    let order_id = OrderId::new(order_id);
    match state
        .api()
        .update_order_status(&user.token, &order_id, &requested)
        .await
    {
        Ok(()) => {
            add_breadcrumb(
                "order",
                "Owner confirmed payment",
                &[("order_id", order_id.as_str())],
            );
            tracing::info!(order = %order_id, "Payment confirmed");
            set_flash(&session, STATUS_UPDATED).await?;
        }
        Err(e) => {
            tracing::warn!(order = %order_id, error = %e, "Owner status change failed");
            let status = e.status_code().map_or_else(|| "Unknown".to_string(), |s| s.to_string());
            set_flash(
                &session,
                format!("Gagal mengubah status pesanan: {} (HTTP {status})", e.user_message()),
            )
            .await?;
        }
    }
    Ok(Redirect::to(OWNER_PATH).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_status_lookup() {
        let orders = vec![Order {
            id: OrderId::new("o-1"),
            status: OrderStatus::AwaitingPaymentConfirmation,
            ..Order::default()
        }];
        assert_eq!(
            current_status(&orders, "o-1"),
            Some(OrderStatus::AwaitingPaymentConfirmation)
        );
        assert_eq!(current_status(&orders, "o-2"), None);
    }
}
