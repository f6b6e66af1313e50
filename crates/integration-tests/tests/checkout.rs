//! Payment page: form blocking, order placement and cart cleanup.

#![allow(clippy::unwrap_used)]

use pasarku_integration_tests::{MockBackend, MockUser, TestApp, UploadFile, location};
use reqwest::StatusCode;

struct Checkout {
    app: TestApp,
    buyer: MockUser,
    bayam: String,
}

async fn checkout() -> Checkout {
    let buyer = MockUser::buyer("u-buyer", "Rina");
    let backend = MockBackend::start(vec![buyer.clone()]).await.unwrap();
    let tomat = backend.add_listing("Tomat", 15_000, 20).await;
    let bayam = backend.add_listing("Bayam", 5_000, 10).await;
    backend.add_cart_entry(&buyer, &tomat, 2).await;
    backend.add_cart_entry(&buyer, &bayam, 1).await;
    Checkout {
        app: TestApp::spawn(backend).await.unwrap(),
        buyer,
        bayam,
    }
}

#[tokio::test]
async fn test_payment_page_lists_options_and_total() {
    let c = checkout().await;
    let browser = c.app.login_as(&c.buyer).await.unwrap();

    let body = browser.page("/payment").await.unwrap();
    assert!(body.contains("Transfer Bank"));
    assert!(body.contains("Ambil di Tempat"));
    assert!(body.contains("Rp35.000"));
}

#[tokio::test]
async fn test_missing_selection_blocks_submit() {
    let c = checkout().await;
    let browser = c.app.login_as(&c.buyer).await.unwrap();

    let response = browser
        .post_multipart("/payment", &[("address", "Jl. Merdeka 1")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Harap pilih metode pembayaran dan pengiriman."));

    let state = c.app.backend.state().await;
    assert!(!state.called("POST /order"));
    assert_eq!(state.cart.len(), 2);
}

#[tokio::test]
async fn test_delivery_without_address_blocks_submit() {
    let c = checkout().await;
    let browser = c.app.login_as(&c.buyer).await.unwrap();

    let body = browser
        .post_multipart("/payment", &[("payment", "2"), ("shipping", "2"), ("address", "  ")])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Harap masukkan alamat pengiriman."));
    assert!(!c.app.backend.state().await.called("POST /order"));
}

#[tokio::test]
async fn test_transfer_without_proof_blocks_submit() {
    let c = checkout().await;
    let browser = c.app.login_as(&c.buyer).await.unwrap();

    let body = browser
        .post_multipart("/payment", &[("payment", "1"), ("shipping", "1")])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Harap unggah bukti pembayaran."));
    assert!(!c.app.backend.state().await.called("POST /order"));
}

#[tokio::test]
async fn test_cod_pickup_orders_every_line_and_clears_cart() {
    let c = checkout().await;
    let browser = c.app.login_as(&c.buyer).await.unwrap();

    let response = browser
        .post_multipart("/payment", &[("payment", "2"), ("shipping", "1")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/orders"));

    {
        let state = c.app.backend.state().await;
        assert_eq!(state.orders.len(), 2);
        assert!(state.cart.is_empty());
        assert!(
            state
                .orders
                .iter()
                .all(|o| o["paymentMethod"] == "cod" && o["status"] == "pending")
        );
        let totals: Vec<i64> = state
            .orders
            .iter()
            .filter_map(|o| o["totalPrice"].as_i64())
            .collect();
        assert_eq!(totals, vec![30_000, 5_000]);
    }

    let history = browser.page("/orders").await.unwrap();
    assert!(history.contains("Pembayaran berhasil"));
}

#[tokio::test]
async fn test_transfer_with_proof_sends_it_with_every_order() {
    let c = checkout().await;
    let browser = c.app.login_as(&c.buyer).await.unwrap();

    let response = browser
        .post_multipart_file(
            "/payment",
            &[("payment", "1"), ("shipping", "1")],
            &UploadFile::png("proof"),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/orders"));

    let state = c.app.backend.state().await;
    assert_eq!(state.orders.len(), 2);
    assert!(state.cart.is_empty());
    for order in &state.orders {
        assert_eq!(order["paymentMethod"], "digital");
        assert_eq!(order["paymentProof"], "<file>");
        assert_eq!(order["status"], "konfirmasi pembayaran");
    }
}

#[tokio::test]
async fn test_proof_with_wrong_type_is_rejected() {
    let c = checkout().await;
    let browser = c.app.login_as(&c.buyer).await.unwrap();

    let pdf = UploadFile {
        mime: "application/pdf",
        file_name: "bukti.pdf",
        ..UploadFile::png("proof")
    };
    let response = browser
        .post_multipart_file("/payment", &[("payment", "1"), ("shipping", "1")], &pdf)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!c.app.backend.state().await.called("POST /order"));
}

#[tokio::test]
async fn test_partial_failure_keeps_cart() {
    let c = checkout().await;
    c.app
        .backend
        .state()
        .await
        .failing_items
        .push(c.bayam.clone());
    let browser = c.app.login_as(&c.buyer).await.unwrap();

    let response = browser
        .post_multipart("/payment", &[("payment", "2"), ("shipping", "1")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("1 dari 2 pesanan gagal dibuat."));
    assert!(body.contains("Stok tidak mencukupi"));

    let state = c.app.backend.state().await;
    assert_eq!(state.orders.len(), 1);
    assert_eq!(state.cart.len(), 2);
}
