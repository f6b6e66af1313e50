//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /about                  - About page
//! GET  /contact                - Contact form
//! POST /contact                - Send contact message
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products?q=            - Catalog with search
//! GET  /products/{id}          - Product detail + order form
//! POST /products/{id}/order    - Direct order
//! POST /products/{id}/cart     - Add to cart (HTMX fragment, triggers cartUpdated)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/update            - Update quantity (returns cart_lines fragment)
//! POST /cart/remove            - Remove line (returns cart_lines fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout and orders
//! GET  /payment                - Checkout page (totals fragment for HTMX)
//! POST /payment                - Place one order per cart line (multipart)
//! GET  /orders                 - Buyer order history
//!
//! # Auth (POSTs rate limited)
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Profile (requires auth)
//! GET  /profile                - Profile page
//! POST /profile                - Update profile
//! POST /profile/merchant       - Open a merchant (multipart)
//!
//! # Merchant dashboard (requires auth, own merchant only)
//! GET  /dashboard-toko/{id}                             - Overview, items, stock
//! POST /dashboard-toko/{id}/items                       - Add item (multipart)
//! POST /dashboard-toko/{id}/items/{item_id}             - Edit item
//! POST /dashboard-toko/{id}/items/{item_id}/delete      - Delete item
//! POST /dashboard-toko/{id}/stock                       - Set stock
//! GET  /dashboard-toko/{id}/orders                      - Received orders
//! POST /dashboard-toko/{id}/orders/{order_id}/status    - Change status
//! GET  /dashboard-toko/{id}/messages                    - Inbox
//!
//! # Owner (requires owner role)
//! GET  /owner                  - All orders
//! POST /owner/orders/{id}/status - Confirm payment
//!
//! # Quality check (requires auth)
//! GET  /quality-check          - Upload form
//! POST /quality-check          - Classify photo (multipart)
//! ```

pub mod auth;
pub mod cart;
pub mod contact;
pub mod dashboard;
pub mod form_data;
pub mod home;
pub mod orders;
pub mod owner;
pub mod payment;
pub mod products;
pub mod profile;
pub mod quality;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"true"))
}

/// Create the auth routes router.
///
/// Only the form posts are rate limited; the pages themselves are not.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/order", post(products::order))
        .route("/{id}/cart", post(products::add_to_cart))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).post(profile::update))
        .route("/merchant", post(profile::create_merchant))
}

/// Create the merchant dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(dashboard::show))
        .route("/{id}/items", post(dashboard::create_item))
        .route("/{id}/items/{item_id}", post(dashboard::update_item))
        .route("/{id}/items/{item_id}/delete", post(dashboard::delete_item))
        .route("/{id}/stock", post(dashboard::update_stock))
        .route("/{id}/orders", get(dashboard::orders))
        .route(
            "/{id}/orders/{order_id}/status",
            post(dashboard::update_status),
        )
        .route("/{id}/messages", get(dashboard::messages))
}

/// Create the owner routes router.
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(owner::index))
        .route("/orders/{id}/status", post(owner::update_status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(home::about))
        .route("/contact", get(contact::contact_page).post(contact::send))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/payment", get(payment::show).post(payment::submit))
        .route("/orders", get(orders::history))
        .nest("/auth", auth_routes())
        .nest("/profile", profile_routes())
        .nest("/dashboard-toko", dashboard_routes())
        .nest("/owner", owner_routes())
        .route("/quality-check", get(quality::page).post(quality::check))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("false"));
        assert!(!is_htmx(&headers));
    }
}
