//! Owner page access and the payment confirmation restriction.

#![allow(clippy::unwrap_used)]

use pasarku_integration_tests::{MockBackend, MockUser, TestApp, location};
use reqwest::StatusCode;

struct Owner {
    app: TestApp,
    buyer: MockUser,
    owner: MockUser,
    awaiting: String,
    pending: String,
}

async fn setup() -> Owner {
    let buyer = MockUser::buyer("u-buyer", "Rina");
    let owner = MockUser::owner("u-owner", "Bu Sari");
    let backend = MockBackend::start(vec![buyer.clone(), owner.clone()])
        .await
        .unwrap();
    let awaiting = backend.add_order(&buyer, "konfirmasi pembayaran").await;
    let pending = backend.add_order(&buyer, "pending").await;
    Owner {
        app: TestApp::spawn(backend).await.unwrap(),
        buyer,
        owner,
        awaiting,
        pending,
    }
}

fn status_path(id: &str) -> String {
    format!("/owner/orders/{id}/status")
}

#[tokio::test]
async fn test_buyer_is_sent_home() {
    let o = setup().await;
    let browser = o.app.login_as(&o.buyer).await.unwrap();

    let response = browser.get("/owner").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let response = browser
        .post_form(
            &status_path(&o.awaiting),
            &[("status", "pending"), ("confirm", "yes")],
        )
        .await
        .unwrap();
    assert_eq!(location(&response), Some("/"));
    assert_eq!(
        o.app.backend.order_status(&o.awaiting).await.as_deref(),
        Some("konfirmasi pembayaran")
    );
}

#[tokio::test]
async fn test_owner_sees_every_order() {
    let o = setup().await;
    let body = o
        .app
        .login_as(&o.owner)
        .await
        .unwrap()
        .page("/owner")
        .await
        .unwrap();

    assert!(body.contains(&o.awaiting));
    assert!(body.contains(&o.pending));
    assert!(body.contains(&status_path(&o.awaiting)));
    assert!(!body.contains(&status_path(&o.pending)));
}

#[tokio::test]
async fn test_confirmation_asks_first() {
    let o = setup().await;
    let browser = o.app.login_as(&o.owner).await.unwrap();

    let response = browser
        .post_form(&status_path(&o.awaiting), &[("status", "pending")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("name=\"confirm\" value=\"yes\""));

    assert!(!o.app.backend.state().await.called("PUT /order"));
}

#[tokio::test]
async fn test_confirmed_payment_moves_to_pending() {
    let o = setup().await;
    let browser = o.app.login_as(&o.owner).await.unwrap();

    let response = browser
        .post_form(
            &status_path(&o.awaiting),
            &[("status", "pending"), ("confirm", "yes")],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/owner"));
    assert_eq!(
        o.app.backend.order_status(&o.awaiting).await.as_deref(),
        Some("pending")
    );

    let body = browser.page("/owner").await.unwrap();
    assert!(body.contains("Status pesanan berhasil diperbarui"));
}

#[tokio::test]
async fn test_other_transitions_are_refused_locally() {
    let o = setup().await;
    let browser = o.app.login_as(&o.owner).await.unwrap();

    for (order, status) in [(&o.pending, "shipped"), (&o.awaiting, "completed")] {
        let response = browser
            .post_form(&status_path(order), &[("status", status), ("confirm", "yes")])
            .await
            .unwrap();
        assert_eq!(location(&response), Some("/owner"));
    }

    assert!(!o.app.backend.state().await.called("PUT /order"));
    assert_eq!(
        o.app.backend.order_status(&o.pending).await.as_deref(),
        Some("pending")
    );
    assert_eq!(
        o.app.backend.order_status(&o.awaiting).await.as_deref(),
        Some("konfirmasi pembayaran")
    );
}
