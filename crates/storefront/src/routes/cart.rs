//! Cart route handlers.
//!
//! Cart entries live on the backend. Quantity changes are applied to the
//! lines already fetched for this request and rendered straight away; when
//! the backend rejects the change the cart is fetched again so the page shows
//! what the server actually holds.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pasarku_core::cart::{apply_quantity, remove_line};
use pasarku_core::validation::validate_quantity;
use pasarku_core::{CartEntryId, CartLine, CartSummary};

use crate::api::{ApiError, PasarkuClient};
use crate::error::Result;
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{OptionalAuth, RequireAuth, set_flash};
use crate::routes::is_htmx;
use crate::state::AppState;

pub const CART_UPDATED: &str = "Keranjang diperbarui";
pub const CART_LINE_REMOVED: &str = "Produk dihapus dari keranjang";

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub entry_id: String,
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub entry_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub lines: Vec<CartLine>,
    pub summary: CartSummary,
    pub error: Option<String>,
}

/// Cart lines fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_lines.html")]
pub struct CartLinesTemplate {
    pub lines: Vec<CartLine>,
    pub summary: CartSummary,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Helpers
// =============================================================================

/// Fetch the cart and flatten it into display lines.
///
/// # Errors
///
/// Returns an error if the cart cannot be fetched.
pub async fn load_lines(
    client: &PasarkuClient,
    token: &SecretString,
) -> std::result::Result<Vec<CartLine>, ApiError> {
    Ok(client.cart(token).await?.iter().map(CartLine::from).collect())
}

/// Lines after a failed change: whatever the backend has now.
async fn refetch(client: &PasarkuClient, token: &SecretString, fallback: Vec<CartLine>) -> Vec<CartLine> {
    match load_lines(client, token).await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(error = %e, "Cart re-fetch failed");
            fallback
        }
    }
}

/// Render the outcome of a cart change.
///
/// HTMX requests get the cart lines fragment plus a `cartUpdated` event for
/// the navbar badge. Plain form posts are redirected back to the cart with a
/// flash message.
async fn respond(
    session: &Session,
    htmx: bool,
    lines: Vec<CartLine>,
    error: Option<String>,
    success: &'static str,
) -> Result<Response> {
    if htmx {
        let summary = CartSummary::of(&lines);
        let mut response = CartLinesTemplate {
            lines,
            summary,
            error,
        }
        .into_response();
        response
            .headers_mut()
            .insert("hx-trigger", HeaderValue::from_static("cartUpdated"));
        return Ok(response);
    }

    match error {
        Some(message) => set_flash(session, message).await?,
        None => set_flash(session, success).await?,
    }
    Ok(Redirect::to("/cart").into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, layout, user), fields(user_id = %user.claims.uid))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let (lines, error) = match load_lines(state.api(), &user.token).await {
        Ok(lines) => (lines, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart");
            (Vec::new(), Some(e.user_message()))
        }
    };

    CartShowTemplate {
        layout,
        summary: CartSummary::of(&lines),
        lines,
        error,
    }
}

/// Change the quantity of one cart line.
#[instrument(skip(state, session, user, headers, form), fields(user_id = %user.claims.uid))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let htmx = is_htmx(&headers);
    let client = state.api();
    let entry_id = CartEntryId::new(form.entry_id);
    let current = load_lines(client, &user.token).await?;

    let patched = validate_quantity(&form.quantity, None)
        .and_then(|quantity| apply_quantity(&current, &entry_id, quantity).map(|l| (quantity, l)));
    let (quantity, patched) = match patched {
        Ok(ok) => ok,
        Err(e) => return respond(&session, htmx, current, Some(e.to_string()), CART_UPDATED).await,
    };

    match client.update_cart_entry(&user.token, &entry_id, quantity).await {
        Ok(()) => {
            tracing::debug!(entry = %entry_id, quantity, "Cart line updated");
            respond(&session, htmx, patched, None, CART_UPDATED).await
        }
        Err(e) => {
            tracing::warn!(entry = %entry_id, error = %e, "Cart update failed");
            let lines = refetch(client, &user.token, current).await;
            respond(&session, htmx, lines, Some(e.user_message()), CART_UPDATED).await
        }
    }
}

/// Remove one line from the cart.
#[instrument(skip(state, session, user, headers, form), fields(user_id = %user.claims.uid))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let htmx = is_htmx(&headers);
    let client = state.api();
    let entry_id = CartEntryId::new(form.entry_id);
    let current = load_lines(client, &user.token).await?;

    match client.remove_cart_entry(&user.token, &entry_id).await {
        Ok(()) => {
            let lines = remove_line(&current, &entry_id);
            respond(&session, htmx, lines, None, CART_LINE_REMOVED).await
        }
        Err(e) => {
            tracing::warn!(entry = %entry_id, error = %e, "Cart removal failed");
            let lines = refetch(client, &user.token, current).await;
            respond(&session, htmx, lines, Some(e.user_message()), CART_LINE_REMOVED).await
        }
    }
}

/// Get cart item count (HTMX badge).
///
/// Visitors and failed fetches show an empty badge rather than an error.
#[instrument(skip(state, user))]
pub async fn count(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    let count = match user {
        Some(user) => match load_lines(state.api(), &user.token).await {
            Ok(lines) => CartSummary::of(&lines).total_quantity,
            Err(e) => {
                tracing::debug!(error = %e, "Cart count unavailable");
                0
            }
        },
        None => 0,
    };

    CartCountTemplate { count }
}
