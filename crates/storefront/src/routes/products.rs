//! Catalog, product detail, direct orders and add-to-cart.
//!
//! The backend has no single-product endpoint. The detail page looks the
//! listing up in the cached catalog, keyed by its stock row id.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pasarku_core::validation::validate_quantity;
use pasarku_core::{DeliveryMethod, OrderForm, PaymentMethod};

use crate::api::{NewOrder, ProductListing};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{RequireAuth, set_flash};
use crate::routes::is_htmx;
use crate::state::AppState;

pub const ORDER_PLACED: &str = "Pesanan berhasil dibuat!";
pub const ADDED_TO_CART: &str = "Produk ditambahkan ke keranjang";
const MERCHANT_MISSING: &str = "Toko penjual tidak ditemukan";

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    #[serde(default = "one")]
    pub quantity: String,
}

fn one() -> String {
    "1".to_string()
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub query: String,
    pub listings: Vec<ProductListing>,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub listing: ProductListing,
    pub form: OrderForm,
    pub deliveries: [DeliveryMethod; 2],
    pub payments: [PaymentMethod; 2],
    pub error: Option<String>,
}

impl ProductShowTemplate {
    fn new(layout: Layout, listing: ProductListing) -> Self {
        Self {
            layout,
            listing,
            form: OrderForm::default(),
            deliveries: [DeliveryMethod::Antar, DeliveryMethod::Ambil],
            payments: [PaymentMethod::Cod, PaymentMethod::Transfer],
            error: None,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub message: String,
    pub is_error: bool,
}

// =============================================================================
// Helpers
// =============================================================================

/// Find a listing by stock row id (or item id) in the catalog.
async fn find_listing(state: &AppState, id: &str) -> Result<ProductListing> {
    let listings = state.api().search_products("").await?;
    listings
        .into_iter()
        .find(|l| l.id.as_str() == id || l.item.id.as_str() == id)
        .ok_or_else(|| AppError::NotFound(format!("produk {id}")))
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: Layout,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let (listings, error) = match state.api().search_products(&query.q).await {
        Ok(listings) => (listings, None),
        Err(e) => {
            tracing::warn!(error = %e, "Product search failed");
            (Vec::new(), Some(e.user_message()))
        }
    };

    ProductsIndexTemplate {
        layout,
        query: query.q,
        listings,
        error,
    }
}

#[instrument(skip(state, layout))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let listing = find_listing(&state, &id).await?;
    Ok(ProductShowTemplate::new(layout, listing))
}

/// Place a single order straight from the product page.
#[instrument(skip(state, session, layout, user, form), fields(user_id = %user.claims.uid))]
pub async fn order(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let listing = find_listing(&state, &id).await?;
    let mut page = ProductShowTemplate::new(layout, listing);

    let valid = match form.validate(page.listing.quantity) {
        Ok(valid) => valid,
        Err(e) => {
            page.form = form;
            page.error = Some(e.to_string());
            return Ok(page.into_response());
        }
    };
    let Some(merchant_id) = page.listing.seller_id().cloned() else {
        page.form = form;
        page.error = Some(MERCHANT_MISSING.to_string());
        return Ok(page.into_response());
    };

    let order = NewOrder {
        item_id: page.listing.item_id(),
        merchant_id,
        quantity: valid.quantity,
        delivery_method: valid.delivery_method,
        payment_method: valid.payment_method,
        address: valid.address,
        total_price: page.listing.item.base_price.times(valid.quantity),
    };

    if let Err(e) = state.api().create_order(&user.token, &order, None).await {
        tracing::warn!(error = %e, "Direct order failed");
        page.form = form;
        page.error = Some(e.user_message());
        return Ok(page.into_response());
    }

    add_breadcrumb("order", "Placed direct order", &[("item_id", order.item_id.as_str())]);
    state.api().invalidate_catalog();
    set_flash(&session, ORDER_PLACED).await?;
    Ok(Redirect::to("/orders").into_response())
}

/// Add a product to the backend cart.
///
/// HTMX requests get a status fragment and a `cartUpdated` event for the
/// navbar badge; plain form posts are redirected to the cart.
#[instrument(skip(state, session, user, headers, form), fields(user_id = %user.claims.uid))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let listing = find_listing(&state, &id).await?;
    let htmx = is_htmx(&headers);

    let outcome = match (
        validate_quantity(&form.quantity, Some(listing.quantity)),
        listing.seller_id(),
    ) {
        (Err(e), _) => Err(e.to_string()),
        (Ok(_), None) => Err(MERCHANT_MISSING.to_string()),
        (Ok(quantity), Some(merchant_id)) => state
            .api()
            .add_to_cart(&user.token, &listing.item_id(), merchant_id, quantity)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Add to cart failed");
                e.user_message()
            }),
    };

    if htmx {
        let is_error = outcome.is_err();
        let message = outcome.err().unwrap_or_else(|| ADDED_TO_CART.to_string());
        let mut response = CartAddedTemplate { message, is_error }.into_response();
        if !is_error {
            response
                .headers_mut()
                .insert("hx-trigger", HeaderValue::from_static("cartUpdated"));
        }
        return Ok(response);
    }

    match outcome {
        Ok(()) => {
            set_flash(&session, ADDED_TO_CART).await?;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(message) => {
            set_flash(&session, message).await?;
            Ok(Redirect::to(&format!("/products/{}", urlencoding::encode(&id))).into_response())
        }
    }
}
