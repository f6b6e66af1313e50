//! Product page: direct orders and add-to-cart against live stock.

#![allow(clippy::unwrap_used)]

use pasarku_integration_tests::{MockBackend, MockUser, TestApp, location};
use reqwest::StatusCode;

async fn app_with_listing(stock: u32) -> (TestApp, MockUser, String) {
    let buyer = MockUser::buyer("u-buyer", "Rina");
    let backend = MockBackend::start(vec![buyer.clone()]).await.unwrap();
    let item = backend.add_listing("Cabai Merah", 40_000, stock).await;
    (TestApp::spawn(backend).await.unwrap(), buyer, item)
}

#[tokio::test]
async fn test_sold_out_product_refuses_direct_order() {
    let (app, buyer, item) = app_with_listing(0).await;
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser
        .post_form(&format!("/products/{item}/order"), &[("quantity", "1")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();

    assert!(body.contains("Stok produk habis"));
    assert!(!body.contains("Jumlah harus antara 1 dan 0"));
    assert!(!app.backend.state().await.called("POST /order"));
}

#[tokio::test]
async fn test_sold_out_product_refuses_add_to_cart() {
    let (app, buyer, item) = app_with_listing(0).await;
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser
        .htmx_post_form(&format!("/products/{item}/cart"), &[("quantity", "1")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("hx-trigger").is_none());
    assert!(response.text().await.unwrap().contains("Stok produk habis"));

    let response = browser
        .post_form(&format!("/products/{item}/cart"), &[("quantity", "1")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(format!("/products/{item}").as_str()));

    assert!(!app.backend.state().await.called("POST /cart"));
}

#[tokio::test]
async fn test_quantity_above_stock_is_refused() {
    let (app, buyer, item) = app_with_listing(3).await;
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser
        .htmx_post_form(&format!("/products/{item}/cart"), &[("quantity", "4")])
        .await
        .unwrap();
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Jumlah harus antara 1 dan 3")
    );

    let response = browser
        .htmx_post_form(&format!("/products/{item}/cart"), &[("quantity", "2")])
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("hx-trigger")
            .and_then(|v| v.to_str().ok()),
        Some("cartUpdated")
    );
    assert_eq!(app.backend.state().await.cart.len(), 1);
}
