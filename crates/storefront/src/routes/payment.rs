//! Checkout page.
//!
//! The buyer picks a payment and a shipping option, the page recomputes the
//! grand total, and the submit places one order per cart line. Transfers
//! carry a proof of payment upload, which is why the form is multipart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pasarku_core::{
    CartLine, CartSummary, CheckoutForm, CheckoutTotals, PAYMENT_OPTIONS, PaymentOption,
    SHIPPING_OPTIONS, ShippingOption,
};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{RequireAuth, set_flash};
use crate::routes::cart::load_lines;
use crate::routes::form_data::MultipartForm;
use crate::routes::is_htmx;
use crate::services::checkout::{LineFailure, place_orders};
use crate::services::quality::validate_image;
use crate::state::AppState;

pub const PAYMENT_DONE: &str = "Pembayaran berhasil! Pesanan Anda sedang diproses.";
const CLEANUP_WARNING: &str =
    "Pesanan dibuat, tetapi beberapa produk masih tercantum di keranjang.";

/// Selected options, as posted by the option pickers.
///
/// Kept as strings so an empty `<select>` value is "not selected" rather than
/// an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    #[serde(default)]
    pub payment: String,
    #[serde(default)]
    pub shipping: String,
}

fn option_id(raw: &str) -> Option<u8> {
    raw.trim().parse().ok()
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub layout: Layout,
    pub lines: Vec<CartLine>,
    pub summary: CartSummary,
    pub totals: CheckoutTotals,
    pub payments: &'static [PaymentOption],
    pub shippings: &'static [ShippingOption],
    pub payment_id: Option<u8>,
    pub shipping_id: Option<u8>,
    pub address: String,
    pub error: Option<String>,
    pub failures: Vec<LineFailure>,
}

/// Grand total fragment, refreshed when an option changes (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/payment_totals.html")]
pub struct PaymentTotalsTemplate {
    pub totals: CheckoutTotals,
}

impl PaymentTemplate {
    fn new(layout: Layout, lines: Vec<CartLine>, payment_id: Option<u8>, shipping_id: Option<u8>) -> Self {
        let summary = CartSummary::of(&lines);
        Self {
            layout,
            totals: totals_for(summary, payment_id, shipping_id),
            summary,
            lines,
            payments: &PAYMENT_OPTIONS,
            shippings: &SHIPPING_OPTIONS,
            payment_id,
            shipping_id,
            address: String::new(),
            error: None,
            failures: Vec::new(),
        }
    }

    /// Whether the selected payment option needs a proof upload.
    #[must_use]
    pub fn needs_proof(&self) -> bool {
        self.payment_id
            .and_then(PaymentOption::by_id)
            .is_some_and(PaymentOption::requires_proof)
    }

    /// Whether the selected shipping option needs an address.
    #[must_use]
    pub fn needs_address(&self) -> bool {
        self.shipping_id
            .and_then(ShippingOption::by_id)
            .is_some_and(ShippingOption::requires_address)
    }
}

fn totals_for(summary: CartSummary, payment_id: Option<u8>, shipping_id: Option<u8>) -> CheckoutTotals {
    CheckoutTotals::compute(
        summary.subtotal,
        shipping_id.and_then(ShippingOption::by_id),
        payment_id.and_then(PaymentOption::by_id),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page, or just the totals for an HTMX option change.
#[instrument(skip(state, layout, user, headers), fields(user_id = %user.claims.uid))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Query(query): Query<PaymentQuery>,
) -> Result<Response> {
    let payment_id = option_id(&query.payment);
    let shipping_id = option_id(&query.shipping);
    let lines = load_lines(state.api(), &user.token).await?;

    if is_htmx(&headers) {
        let totals = totals_for(CartSummary::of(&lines), payment_id, shipping_id);
        return Ok(PaymentTotalsTemplate { totals }.into_response());
    }

    Ok(PaymentTemplate::new(layout, lines, payment_id, shipping_id).into_response())
}

/// Validate the checkout form and place the orders.
#[instrument(skip(state, session, layout, user, multipart), fields(user_id = %user.claims.uid))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = MultipartForm::read(multipart).await?;
    let payment_id = option_id(&form.text("payment"));
    let shipping_id = option_id(&form.text("shipping"));
    let lines = load_lines(state.api(), &user.token).await?;

    let mut page = PaymentTemplate::new(layout, lines, payment_id, shipping_id);
    page.address = form.text("address");

    let checkout = CheckoutForm {
        payment_id,
        shipping_id,
        address: page.address.clone(),
        has_proof: form.has_file("proof"),
        line_count: page.lines.len(),
    };
    let selection = match checkout.validate() {
        Ok(selection) => selection,
        Err(e) => {
            page.error = Some(e.to_string());
            return Ok(page.into_response());
        }
    };

    // Only transfers keep the proof; a stray upload with COD is dropped.
    let proof = form
        .take_file("proof")
        .filter(|_| selection.payment.requires_proof());
    if let Some(proof) = &proof
        && let Err(e) = validate_image(proof)
    {
        page.error = Some(e.to_string());
        return Ok(page.into_response());
    }

    let outcome = match place_orders(
        state.api(),
        &user.token,
        &page.lines,
        &selection,
        proof.as_ref(),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "Checkout failed");
            page.error = Some(e.to_string());
            return Ok(page.into_response());
        }
    };

    state.api().invalidate_catalog();

    if !outcome.is_complete() {
        tracing::warn!(
            placed = outcome.placed,
            failed = outcome.failures.len(),
            "Checkout partially failed"
        );
        page.lines = load_lines(state.api(), &user.token).await?;
        page.summary = CartSummary::of(&page.lines);
        page.totals = totals_for(page.summary, payment_id, shipping_id);
        page.error = Some(format!(
            "{} dari {} pesanan gagal dibuat.",
            outcome.failures.len(),
            outcome.failures.len() + outcome.placed
        ));
        page.failures = outcome.failures;
        return Ok(page.into_response());
    }

    add_breadcrumb(
        "checkout",
        "Orders placed",
        &[("orders", &outcome.placed.to_string())],
    );

    if outcome.cleanup_failures.is_empty() {
        set_flash(&session, PAYMENT_DONE).await?;
    } else {
        set_flash(&session, format!("{PAYMENT_DONE} {CLEANUP_WARNING}")).await?;
    }
    Ok(Redirect::to("/orders").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_id_ignores_blank_and_garbage() {
        assert_eq!(option_id("2"), Some(2));
        assert_eq!(option_id(" 3 "), Some(3));
        assert_eq!(option_id(""), None);
        assert_eq!(option_id("gosend"), None);
    }

    #[test]
    fn test_totals_follow_selection() {
        let summary = CartSummary {
            total_quantity: 3,
            subtotal: pasarku_core::Rupiah::new(162_000),
        };
        let totals = totals_for(summary, Some(2), Some(3));
        assert_eq!(totals.grand_total, pasarku_core::Rupiah::new(187_000));
        assert_eq!(totals_for(summary, None, None).grand_total, summary.subtotal);
    }
}
