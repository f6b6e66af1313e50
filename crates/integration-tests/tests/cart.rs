//! Cart page totals and quantity changes.

#![allow(clippy::unwrap_used)]

use pasarku_integration_tests::{MockBackend, MockUser, TestApp, location};
use reqwest::StatusCode;

async fn app_with_cart() -> (TestApp, MockUser, String) {
    let buyer = MockUser::buyer("u-buyer", "Rina");
    let backend = MockBackend::start(vec![buyer.clone()]).await.unwrap();
    let tomat = backend.add_listing("Tomat", 15_000, 20).await;
    let bayam = backend.add_listing("Bayam", 5_000, 10).await;
    let entry = backend.add_cart_entry(&buyer, &tomat, 2).await;
    backend.add_cart_entry(&buyer, &bayam, 1).await;
    (TestApp::spawn(backend).await.unwrap(), buyer, entry)
}

#[tokio::test]
async fn test_cart_page_shows_line_and_grand_totals() {
    let (app, buyer, _) = app_with_cart().await;
    let browser = app.login_as(&buyer).await.unwrap();

    let body = browser.page("/cart").await.unwrap();

    assert!(body.contains("Tomat"));
    assert!(body.contains("Bayam"));
    // 2 x 15.000
    assert!(body.contains("Rp30.000"));
    // 30.000 + 5.000
    assert!(body.contains("Rp35.000"));
    assert!(body.contains("Total Item: <strong>3</strong>"));
}

#[tokio::test]
async fn test_cart_count_badge() {
    let (app, buyer, _) = app_with_cart().await;
    let browser = app.login_as(&buyer).await.unwrap();

    let body = browser.page("/cart/count").await.unwrap();
    assert!(body.contains('3'));

    let anonymous = app.browser().unwrap();
    let body = anonymous.page("/cart/count").await.unwrap();
    assert!(!body.contains('3'));
}

#[tokio::test]
async fn test_zero_quantity_never_reaches_backend() {
    let (app, buyer, entry) = app_with_cart().await;
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser
        .post_form("/cart/update", &[("entry_id", entry.as_str()), ("quantity", "0")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));
    assert!(!app.backend.state().await.called("PUT /cart"));

    let body = browser.page("/cart").await.unwrap();
    assert!(body.contains("Jumlah minimal 1"));
}

#[tokio::test]
async fn test_htmx_quantity_update_returns_fragment() {
    let (app, buyer, entry) = app_with_cart().await;
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser
        .htmx_post_form("/cart/update", &[("entry_id", entry.as_str()), ("quantity", "3")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("hx-trigger")
            .and_then(|v| v.to_str().ok()),
        Some("cartUpdated")
    );

    let body = response.text().await.unwrap();
    assert!(body.starts_with("<div id=\"cart-lines\">"));
    assert!(!body.contains("<html"));
    // 3 x 15.000 + 5.000
    assert!(body.contains("Rp50.000"));
    assert!(app.backend.state().await.called(&format!("PUT /cart/{entry}")));
}

#[tokio::test]
async fn test_remove_line() {
    let (app, buyer, entry) = app_with_cart().await;
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser
        .htmx_post_form("/cart/remove", &[("entry_id", entry.as_str())])
        .await
        .unwrap();
    let body = response.text().await.unwrap();

    assert!(!body.contains("Tomat"));
    assert!(body.contains("Bayam"));
    assert_eq!(app.backend.state().await.cart.len(), 1);
}

#[tokio::test]
async fn test_refused_update_shows_backend_quantity() {
    let (app, buyer, entry) = app_with_cart().await;
    app.backend
        .state()
        .await
        .failing_cart_entries
        .insert(entry.clone(), 4);
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser
        .htmx_post_form("/cart/update", &[("entry_id", entry.as_str()), ("quantity", "5")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fragment = response.text().await.unwrap();

    assert!(fragment.contains("Stok tidak mencukupi"));
    // The backend kept 4, not the requested 5 nor the 2 shown before.
    assert!(fragment.contains("<span>4</span>"));
    assert!(fragment.contains("Rp60.000"));
    assert!(!fragment.contains("Rp75.000"));
    assert!(fragment.contains("Total Item: <strong>5</strong>"));
}

#[tokio::test]
async fn test_refused_update_flashes_error_on_plain_post() {
    let (app, buyer, entry) = app_with_cart().await;
    app.backend
        .state()
        .await
        .failing_cart_entries
        .insert(entry.clone(), 2);
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser
        .post_form("/cart/update", &[("entry_id", entry.as_str()), ("quantity", "9")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));

    let body = browser.page("/cart").await.unwrap();
    assert!(body.contains("Stok tidak mencukupi"));
    assert!(body.contains("Rp30.000"));
}
