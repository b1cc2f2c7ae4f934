//! Authentication route handlers.
//!
//! Handles email/password login and registration, Google Identity sign-in,
//! password recovery, and logout against the backend's `/api/auth` API.
//! Failed forms are rendered again straight away with what the visitor
//! typed (never passwords); successful submissions redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use silver_connect_core::{Email, Landing};
use tower_sessions::Session;
use tower_sessions::cookie::Cookie;
use tracing::instrument;

use super::{page_context, redirect_with};
use crate::api::ApiError;
use crate::api::auth::AuthResponse;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalSession;
use crate::models::session;
use crate::models::{Flash, PageContext};
use crate::state::AppState;

/// Name of the double-submit cookie and form field Google Identity sets.
pub const GOOGLE_CSRF_FIELD: &str = "g_csrf_token";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    /// Checkbox: present only when ticked.
    #[serde(default)]
    pub agreed: Option<String>,
}

impl RegisterForm {
    fn agreed(&self) -> bool {
        self.agreed.is_some()
    }

    /// Guards checked before anything is sent to the backend.
    fn check(&self) -> std::result::Result<Email, &'static str> {
        if self.name.trim().is_empty() {
            return Err("FULL NAME REQUIRED.");
        }
        let email = Email::parse(&self.email).map_err(|_| "INVALID EMAIL ADDRESS.")?;
        if self.password.is_empty() {
            return Err("PASSWORD REQUIRED.");
        }
        if self.password != self.confirm_password {
            return Err("PASSWORDS DO NOT MATCH.");
        }
        if !self.agreed() {
            return Err("PLEASE ACCEPT THE TERMS OF SERVICE.");
        }
        Ok(email)
    }
}

/// Google Identity callback form (`ux_mode: redirect`).
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackForm {
    #[serde(default)]
    pub credential: String,
    #[serde(default)]
    pub g_csrf_token: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Settings for the Google Identity button.
#[derive(Debug, Clone)]
pub struct GoogleButton {
    pub client_id: String,
    pub login_uri: String,
}

fn google_button(state: &AppState, path: &str) -> Option<GoogleButton> {
    let config = state.config();
    config.google_client_id.as_ref().map(|client_id| GoogleButton {
        client_id: client_id.clone(),
        login_uri: format!("{}{path}", config.base_url.trim_end_matches('/')),
    })
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub google: Option<GoogleButton>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub agreed: bool,
    pub google: Option<GoogleButton>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub page: PageContext,
    pub email: String,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub page: PageContext,
    pub token: String,
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page. Signed-in accounts go to their landing.
pub async fn login_page(
    State(state): State<AppState>,
    viewer: OptionalSession,
    session: Session,
) -> Response {
    if let Some(user) = viewer.user() {
        return Redirect::to(user.landing().path()).into_response();
    }

    LoginTemplate {
        page: page_context(&session, None, "/login").await,
        email: String::new(),
        google: google_button(&state, "/auth/google/login"),
    }
    .into_response()
}

async fn login_failed(state: &AppState, session: &Session, email: String, text: &str) -> Response {
    LoginTemplate {
        page: page_context(session, None, "/login")
            .await
            .with_flash(Flash::error(text)),
        email,
        google: google_button(state, "/auth/google/login"),
    }
    .into_response()
}

/// Store the signed-in account and send it to its landing.
async fn sign_in(session: &Session, auth: AuthResponse, to: Option<Landing>) -> Result<Response> {
    session::establish(session, &auth.user, &auth.token).await?;
    add_breadcrumb("auth", "Signed in", Some(&[("role", auth.user.role.as_str())]));
    let landing = to.unwrap_or_else(|| auth.user.landing());
    Ok(Redirect::to(landing.path()).into_response())
}

/// Handle email/password login.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(login_failed(&state, &session, form.email, "INVALID CIPHER.").await);
    };

    match state.api().login(&email, &form.password).await {
        Ok(auth) => sign_in(&session, auth, None).await,
        Err(e) => {
            tracing::warn!(email = %email, error = %e, "Login failed");
            let text = e.banner("INVALID CIPHER.", "ENCRYPTION HANDSHAKE FAILED.");
            Ok(login_failed(&state, &session, email.into_inner(), &text).await)
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page. Signed-in accounts go to the dashboard.
pub async fn register_page(
    State(state): State<AppState>,
    viewer: OptionalSession,
    session: Session,
) -> Response {
    if viewer.user().is_some() {
        return Redirect::to(Landing::ClientDashboard.path()).into_response();
    }

    RegisterTemplate {
        page: page_context(&session, None, "/register").await,
        name: String::new(),
        email: String::new(),
        agreed: false,
        google: google_button(&state, "/auth/google/register"),
    }
    .into_response()
}

/// Render the registration form again with the submitted fields.
async fn register_failed(
    state: &AppState,
    session: &Session,
    form: RegisterForm,
    text: &str,
) -> Response {
    let agreed = form.agreed();
    RegisterTemplate {
        page: page_context(session, None, "/register")
            .await
            .with_flash(Flash::error(text)),
        name: form.name,
        email: form.email,
        agreed,
        google: google_button(state, "/auth/google/register"),
    }
    .into_response()
}

/// Handle account registration.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = match form.check() {
        Ok(email) => email,
        Err(text) => return register_failed(&state, &session, form, text).await,
    };

    match state
        .api()
        .register(form.name.trim(), &email, &form.password)
        .await
    {
        Ok(()) => {
            tracing::info!(email = %email, "Account registered");
            redirect_with(&session, Flash::success("IDENTITY CREATED. PLEASE LOGIN."), "/login")
                .await
        }
        Err(e) if e.api_message().is_some_and(|m| m.contains("already")) => {
            redirect_with(
                &session,
                Flash::error("IDENTITY ALREADY REGISTERED. PLEASE LOGIN."),
                "/login",
            )
            .await
        }
        Err(e) => {
            tracing::warn!(email = %email, error = %e, "Registration failed");
            let text = e.banner("REGISTRATION DENIED.", "CONNECTION FAILURE.");
            register_failed(&state, &session, form, &text).await
        }
    }
}

// =============================================================================
// Google Identity
// =============================================================================

/// Whether the callback's CSRF field matches Google's double-submit cookie.
fn google_csrf_ok(headers: &HeaderMap, form_token: &str) -> bool {
    if form_token.is_empty() {
        return false;
    }
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .any(|c| c.name() == GOOGLE_CSRF_FIELD && c.value() == form_token)
}

/// Which Google page posted the credential.
#[derive(Debug, Clone, Copy)]
enum GoogleFlow {
    Login,
    Register,
}

impl GoogleFlow {
    const fn page(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
        }
    }

    const fn denied(self) -> &'static str {
        match self {
            Self::Login => "GOOGLE AUTH DENIED.",
            Self::Register => "AUTHENTICATION FAILED.",
        }
    }

    const fn offline(self) -> &'static str {
        match self {
            Self::Login => "CONNECTION INTERRUPTED.",
            Self::Register => "REGISTRY OFFLINE.",
        }
    }
}

async fn google_callback(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    form: GoogleCallbackForm,
    flow: GoogleFlow,
) -> Result<Response> {
    if form.credential.is_empty() || !google_csrf_ok(headers, &form.g_csrf_token) {
        tracing::warn!(?flow, "Google callback failed CSRF check");
        return Ok(redirect_with(session, Flash::error(flow.denied()), flow.page()).await);
    }

    let registering = matches!(flow, GoogleFlow::Register);
    match state.api().google_login(&form.credential, registering).await {
        Ok(auth) => {
            let to = registering.then_some(Landing::ClientDashboard);
            sign_in(session, auth, to).await
        }
        Err(e) => {
            tracing::warn!(?flow, error = %e, "Google sign-in failed");
            let text = match e {
                ApiError::Rejected { .. } => flow.denied(),
                _ => flow.offline(),
            };
            Ok(redirect_with(session, Flash::error(text), flow.page()).await)
        }
    }
}

/// Google Identity sign-in callback.
#[instrument(skip_all)]
pub async fn google_login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<GoogleCallbackForm>,
) -> Result<Response> {
    google_callback(&state, &session, &headers, form, GoogleFlow::Login).await
}

/// Google Identity sign-up callback. New accounts are clients.
#[instrument(skip_all)]
pub async fn google_register(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<GoogleCallbackForm>,
) -> Result<Response> {
    google_callback(&state, &session, &headers, form, GoogleFlow::Register).await
}

// =============================================================================
// Password Recovery
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(viewer: OptionalSession, session: Session) -> impl IntoResponse {
    ForgotPasswordTemplate {
        page: page_context(&session, viewer.user(), "/forgot-password").await,
        email: String::new(),
    }
}

/// Banner for a failed recovery request.
fn forgot_password_error(error: &ApiError) -> String {
    match error {
        ApiError::Rejected { .. } => error.banner("RECOVERY REQUEST DENIED.", ""),
        ApiError::Decode(_) => "REGISTRY ERROR: INVALID SERVER RESPONSE.".to_string(),
        ApiError::Http(_) | ApiError::Session(_) => {
            "REGISTRY OFFLINE. CHECK YOUR CONNECTION.".to_string()
        }
    }
}

/// Request a recovery link.
#[instrument(skip(state, viewer, session, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    viewer: OptionalSession,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let result = match Email::parse(&form.email) {
        Ok(email) => state.api().forgot_password(&email).await.map_err(|e| {
            tracing::warn!(email = %email, error = %e, "Recovery request failed");
            forgot_password_error(&e)
        }),
        Err(_) => Err("INVALID EMAIL ADDRESS.".to_string()),
    };

    match result {
        Ok(()) => {
            redirect_with(
                &session,
                Flash::success("RECOVERY LINK DISPATCHED. CHECK YOUR INBOX."),
                "/forgot-password",
            )
            .await
        }
        Err(text) => ForgotPasswordTemplate {
            page: page_context(&session, viewer.user(), "/forgot-password")
                .await
                .with_flash(Flash::error(text)),
            email: form.email,
        }
        .into_response(),
    }
}

/// Display the new password page for a recovery token.
pub async fn reset_password_page(
    viewer: OptionalSession,
    session: Session,
    Path(token): Path<String>,
) -> impl IntoResponse {
    ResetPasswordTemplate {
        page: page_context(&session, viewer.user(), "/reset-password").await,
        token,
    }
}

/// Set a new password.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    viewer: OptionalSession,
    session: Session,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let result = if form.password.is_empty() {
        Err("PASSWORD REQUIRED.".to_string())
    } else if form.password != form.confirm_password {
        Err("PASSWORDS DO NOT MATCH.".to_string())
    } else {
        state
            .api()
            .reset_password(&token, &form.password)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Password reset failed");
                match e {
                    ApiError::Rejected { .. } => "TOKEN EXPIRED OR INVALID.".to_string(),
                    _ => "SYSTEM ERROR.".to_string(),
                }
            })
    };

    match result {
        Ok(()) => {
            redirect_with(&session, Flash::success("✓ ACCESS RESTORED. PLEASE LOGIN."), "/login")
                .await
        }
        Err(text) => ResetPasswordTemplate {
            page: page_context(&session, viewer.user(), "/reset-password")
                .await
                .with_flash(Flash::error(text)),
            token,
        }
        .into_response(),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    session::end(&session).await?;
    session.flush().await?;
    tracing::info!("Signed out");
    Ok(Redirect::to("/login"))
}
