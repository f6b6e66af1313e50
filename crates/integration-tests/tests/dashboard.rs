//! Merchant dashboard: ownership guard and the item/stock table.

#![allow(clippy::unwrap_used)]

use pasarku_integration_tests::{MockBackend, MockUser, TestApp, location};
use reqwest::StatusCode;

struct Shops {
    app: TestApp,
    seller: MockUser,
    other_seller: MockUser,
    buyer: MockUser,
}

async fn shops() -> Shops {
    let seller = MockUser::buyer("u-ani", "Bu Ani");
    let other_seller = MockUser::buyer("u-budi", "Pak Budi");
    let buyer = MockUser::buyer("u-rina", "Rina");
    let backend = MockBackend::start(vec![seller.clone(), other_seller.clone(), buyer.clone()])
        .await
        .unwrap();
    backend.add_merchant(&seller, 7, "Toko Sayur Bu Ani").await;
    backend.add_merchant(&other_seller, 8, "Toko Buah Pak Budi").await;
    backend
        .add_merchant_item(&seller, "Bayam Segar", 5_000, Some(12))
        .await;
    backend
        .add_merchant_item(&seller, "Kangkung", 4_000, None)
        .await;
    backend
        .add_merchant_item(&other_seller, "Mangga", 20_000, Some(3))
        .await;
    Shops {
        app: TestApp::spawn(backend).await.unwrap(),
        seller,
        other_seller,
        buyer,
    }
}

#[tokio::test]
async fn test_dashboard_joins_items_with_stock() {
    let s = shops().await;
    let browser = s.app.login_as(&s.seller).await.unwrap();

    let body = browser.page("/dashboard-toko/7").await.unwrap();

    assert!(body.contains("Dashboard Toko Sayur Bu Ani"));
    assert!(body.contains("Bayam Segar"));
    assert!(body.contains(r#"value="12""#));
    // Kangkung has no stock row, so it shows as sold out.
    assert!(body.contains("Kangkung"));
    assert!(body.contains("Habis"));
    assert!(body.contains("Total Stok</span><strong>12</strong>"));
    assert!(body.contains("Produk Nonaktif</span><strong>1</strong>"));
    assert!(body.contains("Total Pesanan</span><strong>3</strong>"));
    // Another shop's items never show up.
    assert!(!body.contains("Mangga"));
}

#[tokio::test]
async fn test_other_merchant_id_redirects_to_own_dashboard() {
    let s = shops().await;
    let browser = s.app.login_as(&s.other_seller).await.unwrap();

    let response = browser.get("/dashboard-toko/7").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard-toko/8"));

    let response = browser.get("/dashboard-toko/7/orders").await.unwrap();
    assert_eq!(location(&response), Some("/dashboard-toko/8"));
}

#[tokio::test]
async fn test_user_without_merchant_is_sent_to_profile() {
    let s = shops().await;
    let browser = s.app.login_as(&s.buyer).await.unwrap();

    let response = browser.get("/dashboard-toko/7").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/profile"));

    let state = s.app.backend.state().await;
    assert!(!state.called("GET /items"));
    assert!(!state.called("GET /stock"));
}

#[tokio::test]
async fn test_dashboard_requires_login() {
    let s = shops().await;
    let response = s.app.browser().unwrap().get("/dashboard-toko/7").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login"));
}
