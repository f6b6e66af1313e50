//! Navbar links per login state and role.

#![allow(clippy::unwrap_used)]

use pasarku_integration_tests::{MockBackend, MockUser, TestApp, location};
use reqwest::StatusCode;

async fn app() -> (TestApp, MockUser, MockUser) {
    let buyer = MockUser::buyer("u-buyer", "Rina");
    let owner = MockUser::owner("u-owner", "Bu Sari");
    let backend = MockBackend::start(vec![buyer.clone(), owner.clone()])
        .await
        .unwrap();
    (TestApp::spawn(backend).await.unwrap(), buyer, owner)
}

#[tokio::test]
async fn test_anonymous_nav() {
    let (app, _, _) = app().await;
    let body = app.browser().unwrap().page("/").await.unwrap();

    assert!(body.contains("href=\"/products\""));
    assert!(body.contains("href=\"/auth/login\""));
    assert!(body.contains("href=\"/auth/register\""));
    assert!(!body.contains("href=\"/profile\""));
    assert!(!body.contains("href=\"/owner\""));
}

#[tokio::test]
async fn test_buyer_nav() {
    let (app, buyer, _) = app().await;
    let body = app.login_as(&buyer).await.unwrap().page("/").await.unwrap();

    assert!(body.contains("href=\"/cart\""));
    assert!(body.contains("href=\"/orders\""));
    assert!(body.contains("href=\"/profile\""));
    assert!(body.contains("action=\"/auth/logout\""));
    assert!(body.contains("Halo, Rina"));
    assert!(!body.contains("href=\"/auth/login\""));
    assert!(!body.contains("href=\"/owner\""));
}

#[tokio::test]
async fn test_owner_nav() {
    let (app, _, owner) = app().await;
    let body = app.login_as(&owner).await.unwrap().page("/").await.unwrap();

    assert!(body.contains("href=\"/owner\""));
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let (app, _, _) = app().await;
    let browser = app.browser().unwrap();

    for path in ["/cart", "/payment", "/orders", "/profile", "/owner", "/quality-check"] {
        let response = browser.get(path).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/auth/login"), "{path}");
    }
}

#[tokio::test]
async fn test_logout_restores_anonymous_nav() {
    let (app, buyer, _) = app().await;
    let browser = app.login_as(&buyer).await.unwrap();

    let response = browser.post_form("/auth/logout", &[]).await.unwrap();
    assert_eq!(location(&response), Some("/auth/login"));

    let body = browser.page("/").await.unwrap();
    assert!(body.contains("href=\"/auth/login\""));
    assert!(!body.contains("href=\"/cart\""));
}

#[tokio::test]
async fn test_wrong_password_stays_on_login() {
    let (app, buyer, _) = app().await;
    let browser = app.browser().unwrap();

    let response = browser
        .post_form(
            "/auth/login",
            &[("email", buyer.email.as_str()), ("password", "salah-sekali")],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Email atau password salah"));
}

#[tokio::test]
async fn test_health() {
    let (app, _, _) = app().await;
    assert_eq!(app.browser().unwrap().page("/health").await.unwrap(), "ok");
}
