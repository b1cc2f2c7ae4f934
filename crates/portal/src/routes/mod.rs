//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! # Public pages
//! GET  /                       - Home page
//! GET  /about                  - About page
//! GET  /services               - Service framework
//! GET  /how-it-works           - Matching process
//! GET  /contact                - Contact form
//! POST /contact                - Send contact form through EmailJS
//!
//! # Auth (POSTs are rate limited)
//! GET  /login                  - Login page (signed-in accounts go to their landing)
//! POST /login                  - Email/password login
//! GET  /register               - Registration page
//! POST /register               - Create a client account
//! POST /auth/google/login      - Google Identity sign-in callback
//! POST /auth/google/register   - Google Identity sign-up callback
//! GET  /forgot-password        - Recovery request page
//! POST /forgot-password        - Request a recovery link
//! GET  /reset-password/{token} - New password page
//! POST /reset-password/{token} - Set a new password
//! POST /logout                 - End the session
//!
//! # Registry
//! GET  /helpers                - Verified helper directory (?q=)
//! GET  /helper/{id}            - Helper dossier and booking form (requires session)
//! POST /helper/{id}/book       - Request a booking
//!
//! # Account (requires session)
//! GET  /profile                - Own dossier
//! POST /profile                - Update own dossier
//! GET  /register/helper        - Helper application form
//! POST /register/helper        - File a helper application
//!
//! # Dashboards (role guarded)
//! GET  /dashboard              - Client dashboard (?tab=active|history|reviews&review=)
//! POST /dashboard/reviews      - Submit a review
//! POST /dashboard/reviews/{id}/delete - Delete own review
//! GET  /helper                 - Helper terminal (?tab=incoming|history|reviews)
//! POST /helper/bookings/{id}/status   - Accept, reject, or complete a booking
//! GET  /admin                  - Admin terminal (?tab=users|pending|verified|bookings|messages&q=&audit=)
//! POST /admin/helpers/{id}/verify     - Approve or reject a pending helper
//! POST /admin/helpers/{id}/revoke     - Revoke a verified helper
//! ```

pub mod admin;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod helper;
pub mod pages;
pub mod profile;
pub mod registry;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::api::ApiError;
use crate::middleware::credentials_rate_limiter;
use crate::models::{Flash, PageContext, SessionUser};
use crate::state::AppState;

/// Page chrome for a render, consuming any queued banner.
pub(crate) async fn page_context(
    session: &Session,
    viewer: Option<&SessionUser>,
    path: &str,
) -> PageContext {
    PageContext::new(viewer, path, Flash::take(session).await)
}

/// Queue `flash` and redirect to `to` (post/redirect/get).
pub(crate) async fn redirect_with(session: &Session, flash: Flash, to: &str) -> Response {
    if let Err(e) = flash.push(session).await {
        tracing::error!("Failed to queue flash message: {}", e);
    }
    Redirect::to(to).into_response()
}

/// Response for a backend 401: the session is already cleared.
pub(crate) fn signed_out() -> Response {
    Redirect::to("/login").into_response()
}

/// A fetched list, or an empty one when the fetch failed.
///
/// Callers handle `Ok(None)` (signed out) before this.
pub(crate) fn loaded<T>(what: &str, result: Result<Option<Vec<T>>, ApiError>) -> Vec<T> {
    match result {
        Ok(items) => items.unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load {}", what);
            Vec::new()
        }
    }
}

/// Create the credential routes, behind the rate limiter.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/auth/google/login", post(auth::google_login))
        .route("/auth/google/register", post(auth::google_register))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password/{token}", post(auth::reset_password))
        .layer(credentials_rate_limiter())
}

/// Create the public page routes.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/services", get(pages::services))
        .route("/how-it-works", get(pages::how_it_works))
        .route("/contact", get(contact::show).post(contact::submit))
}

/// Create the auth page routes (form pages and logout).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/forgot-password", get(auth::forgot_password_page))
        .route("/reset-password/{token}", get(auth::reset_password_page))
        .route("/logout", post(auth::logout))
}

/// Create the registry and account routes.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/helpers", get(registry::index))
        .route("/helper/{id}", get(registry::show))
        .route("/helper/{id}/book", post(registry::book))
        .route("/profile", get(profile::show).post(profile::update))
        .route(
            "/register/helper",
            get(profile::application_page).post(profile::apply),
        )
}

/// Create the role dashboard routes.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::index))
        .route("/dashboard/reviews", post(dashboard::submit_review))
        .route(
            "/dashboard/reviews/{id}/delete",
            post(dashboard::delete_review),
        )
        .route("/helper", get(helper::index))
        .route("/helper/bookings/{id}/status", post(helper::update_status))
        .route("/admin", get(admin::index))
        .route("/admin/helpers/{id}/verify", post(admin::verify))
        .route("/admin/helpers/{id}/revoke", post(admin::revoke))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .merge(auth_routes())
        .merge(credential_routes())
        .merge(account_routes())
        .merge(dashboard_routes())
}
