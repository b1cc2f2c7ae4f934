//! Integration tests for form guards and submissions.
//!
//! Guards run before anything is sent to the backend; a form that fails one
//! is shown again, or reopened, with the reason in the banner.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;
use silver_connect_integration_tests::{FakeBackend, TestPortal, fresh_token, location, member};

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_mismatch_keeps_typed_fields() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    let response = portal
        .post_form(
            "/register",
            &[
                ("name", "Kamala Devi"),
                ("email", "kamala@example.in"),
                ("password", "silver-123"),
                ("confirm_password", "silver-321"),
                ("agreed", "on"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("PASSWORDS DO NOT MATCH."));
    assert!(body.contains(r#"value="Kamala Devi""#));
    assert!(body.contains(r#"value="kamala@example.in""#));
    assert!(body.contains(" checked"));
    assert!(!body.contains("silver-123"));
    assert!(
        portal
            .backend
            .requests_to(Method::POST, "/api/auth/register")
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn test_register_success_sends_to_login_with_banner() {
    let backend = FakeBackend::new();
    backend
        .answer(
            Method::POST,
            "/api/auth/register",
            StatusCode::CREATED,
            json!({"message": "User registered"}),
        )
        .await;
    let portal = TestPortal::start(backend).await;

    let response = portal
        .post_form(
            "/register",
            &[
                ("name", " Kamala Devi "),
                ("email", "kamala@example.in"),
                ("password", "silver-123"),
                ("confirm_password", "silver-123"),
                ("agreed", "on"),
            ],
        )
        .await;
    assert_eq!(location(&response), Some("/login"));

    let sent = portal.backend.requests_to(Method::POST, "/api/auth/register").await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body["name"], "Kamala Devi");
    assert_eq!(sent[0].body["email"], "kamala@example.in");

    let body = portal.get("/login").await.text().await.unwrap();
    assert!(body.contains("IDENTITY CREATED. PLEASE LOGIN."));

    // The banner is shown once
    let body = portal.get("/login").await.text().await.unwrap();
    assert!(!body.contains("IDENTITY CREATED"));
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_out_of_range_rating_reopens_review_draft() {
    let portal = TestPortal::start(FakeBackend::new()).await;
    portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &fresh_token())
        .await;

    let response = portal
        .post_form(
            "/dashboard/reviews",
            &[
                ("booking", "b1"),
                ("helper", "h1"),
                ("rating", "9"),
                ("review_text", "Punctual and kind"),
            ],
        )
        .await;

    assert_eq!(
        location(&response),
        Some("/dashboard?tab=history&review=b1")
    );
    assert!(
        portal
            .backend
            .requests_to(Method::POST, "/api/reviews/add")
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn test_review_is_posted_with_bearer_token() {
    let portal = TestPortal::start(FakeBackend::new()).await;
    let token = fresh_token();
    portal
        .backend
        .answer(
            Method::POST,
            "/api/reviews/add",
            StatusCode::CREATED,
            json!({"message": "Review added"}),
        )
        .await;
    portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &token)
        .await;

    let response = portal
        .post_form(
            "/dashboard/reviews",
            &[
                ("booking", "b1"),
                ("helper", "h1"),
                ("rating", "4"),
                ("review_text", " Punctual and kind "),
            ],
        )
        .await;
    assert_eq!(location(&response), Some("/dashboard?tab=reviews"));

    let sent = portal.backend.requests_to(Method::POST, "/api/reviews/add").await;
    assert_eq!(sent.len(), 1);
    let expected = format!("Bearer {token}");
    assert_eq!(sent[0].authorization.as_deref(), Some(expected.as_str()));
    assert_eq!(
        sent[0].body,
        json!({
            "helper": "h1",
            "booking": "b1",
            "rating": 4,
            "reviewText": "Punctual and kind",
        })
    );
}

// =============================================================================
// Bookings
// =============================================================================

#[tokio::test]
async fn test_past_booking_date_is_refused_before_sending() {
    let portal = TestPortal::start(FakeBackend::new()).await;
    portal
        .backend
        .ok(
            Method::GET,
            "/api/helpers/profile/h1",
            json!({
                "success": true,
                "data": {
                    "_id": "h1",
                    "name": "Ravi Kumar",
                    "email": "ravi@example.in",
                    "role": "helper",
                    "isVerified": true,
                    "specialty": "Physical Therapy",
                }
            }),
        )
        .await;
    portal
        .sign_in(member("u1", "Kamala Devi", "user", false), &fresh_token())
        .await;

    let response = portal
        .post_form(
            "/helper/h1/book",
            &[
                ("date", "2020-01-01"),
                ("phone", "9876543210"),
                ("address", "Hazratganj"),
                ("notes", "Morning walk"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("ENGAGEMENT DATE CANNOT BE IN THE PAST."));
    assert!(body.contains("Ravi Kumar"));
    assert!(body.contains(r#"value="Hazratganj""#));
    assert!(
        portal
            .backend
            .requests_to(Method::POST, "/api/bookings/create")
            .await
            .is_empty()
    );
}

// =============================================================================
// Contact
// =============================================================================

#[tokio::test]
async fn test_contact_without_mailer_reports_unavailable() {
    let portal = TestPortal::start(FakeBackend::new()).await;

    let response = portal
        .post_form(
            "/contact",
            &[
                ("name", "Anil Verma"),
                ("email", "anil@example.in"),
                ("subject", "Wellness Checks"),
                ("message", "Weekly visits for my father"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("TRANSMISSION ERROR: CONTACT SERVICE UNAVAILABLE"));
    assert!(body.contains("Weekly visits for my father"));
    assert!(body.contains(r#"value="Wellness Checks" selected"#));
}
