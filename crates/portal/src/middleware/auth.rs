//! Session extractors and the role guard.
//!
//! Every extractor restores the session through [`session::restore`], so an
//! expired token signs the visitor out on whichever page they open next.
//!
//! - [`OptionalSession`] for public pages that only adapt to the viewer.
//! - [`RequireSession`] for pages any signed-in account may use.
//! - [`RequireArea`] for the three dashboards. An account opening a
//!   dashboard that is not its own is sent to its landing page.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use silver_connect_core::Landing;
use tower_sessions::Session;

use crate::api::SecureFetch;
use crate::models::session::{self, ActiveSession, Restored, SessionUser};
use crate::state::AppState;

/// Why a request was turned away before reaching its handler.
#[derive(Debug)]
pub enum AuthRejection {
    /// No usable session. Send the browser to `/login`.
    RedirectToLogin,
    /// Signed in, but this page belongs to another role.
    Misrouted(Landing),
    /// The session layer is missing or its store failed.
    SessionUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Misrouted(landing) => Redirect::to(landing.path()).into_response(),
            Self::SessionUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
            }
        }
    }
}

fn session_from(parts: &Parts) -> Result<Session, AuthRejection> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::SessionUnavailable)
}

/// Restore the session for this request.
///
/// `Ok(None)` for anonymous visitors; an expired session is rejected.
async fn restore_from(parts: &Parts) -> Result<(Session, Option<ActiveSession>), AuthRejection> {
    let session = session_from(parts)?;

    match session::restore(&session, chrono::Utc::now()).await {
        Ok(Restored::Active(active)) => Ok((session, Some(active))),
        Ok(Restored::Anonymous) => Ok((session, None)),
        Ok(Restored::Expired) => Err(AuthRejection::RedirectToLogin),
        Err(e) => {
            tracing::error!("Failed to restore session: {}", e);
            Err(AuthRejection::SessionUnavailable)
        }
    }
}

/// Where `user` must be sent instead of `requested`, if anywhere.
#[must_use]
pub fn misrouted(user: &SessionUser, requested: Landing) -> Option<Landing> {
    let landing = user.landing();
    (landing != requested).then_some(landing)
}

/// Extractor for pages that adapt to, but do not require, a signed-in viewer.
///
/// # Example
///
/// ```rust,ignore
/// async fn about(OptionalSession(viewer): OptionalSession) -> impl IntoResponse {
///     viewer.map_or("guest".to_string(), |v| v.user.name)
/// }
/// ```
pub struct OptionalSession(pub Option<ActiveSession>);

impl OptionalSession {
    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        self.0.as_ref().map(|active| &active.user)
    }
}

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (_, active) = restore_from(parts).await?;
        Ok(Self(active))
    }
}

/// Extractor that requires a signed-in account of any role.
///
/// Yields the session user and a [`SecureFetch`] bound to its token.
pub struct RequireSession(pub SessionUser, pub SecureFetch);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (session, active) = restore_from(parts).await?;
        let ActiveSession { user, token } = active.ok_or(AuthRejection::RedirectToLogin)?;
        let fetch = SecureFetch::new(state.api().clone(), session, token);
        Ok(Self(user, fetch))
    }
}

/// A dashboard guarded by [`RequireArea`].
pub trait Area: Send + Sync {
    /// The landing this area serves.
    const LANDING: Landing;
}

/// `/dashboard`: clients and helpers awaiting verification.
pub struct ClientArea;

/// `/helper`: verified helpers.
pub struct HelperArea;

/// `/admin`: administrators.
pub struct AdminArea;

impl Area for ClientArea {
    const LANDING: Landing = Landing::ClientDashboard;
}

impl Area for HelperArea {
    const LANDING: Landing = Landing::HelperTerminal;
}

impl Area for AdminArea {
    const LANDING: Landing = Landing::AdminTerminal;
}

/// Extractor for the role dashboards.
///
/// Anonymous visitors go to `/login`; accounts whose landing is a different
/// dashboard go there instead.
pub struct RequireArea<A: Area> {
    pub user: SessionUser,
    pub fetch: SecureFetch,
    area: PhantomData<A>,
}

impl<A: Area> FromRequestParts<AppState> for RequireArea<A> {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireSession(user, fetch) = RequireSession::from_request_parts(parts, state).await?;

        if let Some(landing) = misrouted(&user, A::LANDING) {
            tracing::debug!(
                user_id = %user.id,
                requested = A::LANDING.path(),
                landing = landing.path(),
                "Redirecting to role landing"
            );
            return Err(AuthRejection::Misrouted(landing));
        }

        Ok(Self {
            user,
            fetch,
            area: PhantomData,
        })
    }
}
