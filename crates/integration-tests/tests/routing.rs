//! Integration tests for role-based routing.
//!
//! Each account belongs on exactly one dashboard; asking for another one
//! redirects there.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use silver_connect_integration_tests::{FakeBackend, TestPortal, fresh_token, location, member};

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    for path in ["/dashboard", "/helper", "/admin", "/profile", "/register/helper"] {
        let response = portal.get(path).await;
        assert_eq!(location(&response), Some("/login"), "{path}");
    }
}

#[tokio::test]
async fn test_public_pages_render_anonymous_navigation() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    for path in ["/", "/about", "/services", "/how-it-works", "/contact", "/login", "/register"] {
        let response = portal.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }

    let body = portal.get("/").await.text().await.unwrap();
    assert!(body.contains(r#"href="/how-it-works""#));
    assert!(!body.contains(r#"href="/dashboard""#));
}

#[tokio::test]
async fn test_admin_lands_on_terminal_and_is_kept_there() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    let response = portal
        .sign_in(member("a1", "Registry Admin", "admin", false), &fresh_token())
        .await;
    assert_eq!(location(&response), Some("/admin"));

    for path in ["/dashboard", "/helper"] {
        let response = portal.get(path).await;
        assert_eq!(location(&response), Some("/admin"), "{path}");
    }
}

#[tokio::test]
async fn test_verified_helper_lands_on_helper_terminal() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    let response = portal
        .sign_in(member("h1", "Ravi Kumar", "helper", true), &fresh_token())
        .await;
    assert_eq!(location(&response), Some("/helper"));

    let response = portal.get("/dashboard").await;
    assert_eq!(location(&response), Some("/helper"));
}

#[tokio::test]
async fn test_unverified_helper_uses_client_dashboard() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    let response = portal
        .sign_in(member("h2", "Meera Singh", "helper", false), &fresh_token())
        .await;
    assert_eq!(location(&response), Some("/dashboard"));

    let response = portal.get("/helper").await;
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_client_cannot_open_admin_terminal() {
    let portal = TestPortal::start(FakeBackend::new()).await;
    portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &fresh_token())
        .await;

    let response = portal.get("/admin").await;
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_signed_in_visitor_skips_login_page() {
    let portal = TestPortal::start(FakeBackend::new()).await;
    portal
        .sign_in(member("a1", "Registry Admin", "admin", false), &fresh_token())
        .await;

    let response = portal.get("/login").await;
    assert_eq!(location(&response), Some("/admin"));
}
