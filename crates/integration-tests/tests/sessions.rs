//! Integration tests for session handling against the backend.
//!
//! Covers sign-in, bearer propagation, and the three ways a session ends:
//! an expired token, a 401 from the backend, and logout.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;
use silver_connect_integration_tests::{
    FakeBackend, TestPortal, fresh_token, location, member, token_expiring_in,
};

// =============================================================================
// Health & Headers
// =============================================================================

#[tokio::test]
async fn test_health_reports_ok_with_security_headers() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    let response = portal.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "ok");
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_login_lands_client_on_dashboard() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    let response = portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &fresh_token())
        .await;

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), Some("/dashboard"));

    let sent = portal.backend.requests_to(Method::POST, "/api/auth/login").await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body["email"], "kamala@example.in");
    assert_eq!(sent[0].body["password"], "correct-horse");
    assert_eq!(sent[0].authorization, None);
}

#[tokio::test]
async fn test_rejected_login_shows_invalid_cipher() {
    let backend = FakeBackend::new();
    backend
        .answer(
            Method::POST,
            "/api/auth/login",
            StatusCode::UNAUTHORIZED,
            json!({"message": "Invalid credentials"}),
        )
        .await;
    let portal = TestPortal::start(backend).await;

    let response = portal
        .post_form("/login", &[("email", "kamala@example.in"), ("password", "wrong")])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("INVALID CREDENTIALS"));
    assert!(body.contains("kamala@example.in"));
}

#[tokio::test]
async fn test_dashboard_requests_carry_bearer_token() {
    let portal = TestPortal::start(FakeBackend::new()).await;
    let token = fresh_token();
    portal.backend.ok(Method::GET, "/api/bookings/my-requests", json!([])).await;
    portal.backend.ok(Method::GET, "/api/reviews/my-reviews", json!([])).await;

    portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &token)
        .await;
    let response = portal.get("/dashboard").await;

    assert_eq!(response.status(), StatusCode::OK);
    let expected = format!("Bearer {token}");
    for path in ["/api/bookings/my-requests", "/api/reviews/my-reviews"] {
        let sent = portal.backend.requests_to(Method::GET, path).await;
        assert_eq!(sent.len(), 1, "{path} fetched once");
        assert_eq!(sent[0].authorization.as_deref(), Some(expected.as_str()));
    }
}

// =============================================================================
// Session End
// =============================================================================

#[tokio::test]
async fn test_expired_token_signs_out_on_next_page() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    let response = portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &token_expiring_in(-60))
        .await;
    assert_eq!(location(&response), Some("/dashboard"));

    let response = portal.get("/dashboard").await;
    assert_eq!(location(&response), Some("/login"));
    assert!(
        portal
            .backend
            .requests_to(Method::GET, "/api/bookings/my-requests")
            .await
            .is_empty()
    );

    // The session is gone, not just rejected once
    let response = portal.get("/profile").await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_backend_unauthorized_ends_session() {
    let backend = FakeBackend::new();
    backend
        .answer(
            Method::GET,
            "/api/bookings/my-requests",
            StatusCode::UNAUTHORIZED,
            json!({"message": "Token is not valid"}),
        )
        .await;
    backend.ok(Method::GET, "/api/reviews/my-reviews", json!([])).await;
    let portal = TestPortal::start(backend).await;

    portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &fresh_token())
        .await;

    let response = portal.get("/dashboard").await;
    assert_eq!(location(&response), Some("/login"));

    let response = portal.get("/profile").await;
    assert_eq!(location(&response), Some("/login"));
    assert!(portal.backend.requests_to(Method::GET, "/api/auth/me").await.is_empty());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let portal = TestPortal::start(FakeBackend::new()).await;
    portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &fresh_token())
        .await;

    let response = portal.post_form("/logout", &[]).await;
    assert_eq!(location(&response), Some("/login"));

    let response = portal.get("/dashboard").await;
    assert_eq!(location(&response), Some("/login"));

    let body = portal.get("/").await.text().await.unwrap();
    assert!(body.contains("Join as Helper"));
    assert!(!body.contains("Terminate Session"));
}
