//! Authenticated requests on behalf of the signed-in account.

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use silver_connect_core::BearerToken;
use tower_sessions::Session;

use super::{ApiClient, ApiError, read_response};
use crate::models::session;

/// Authenticated fetch helper.
///
/// Every request carries `Authorization: Bearer <token>` and
/// `Content-Type: application/json`. A 401 answer ends the session and
/// yields `Ok(None)`; the caller is expected to send the browser to
/// `/login`. Transport failures are returned as errors.
#[derive(Clone)]
pub struct SecureFetch {
    api: ApiClient,
    session: Session,
    token: BearerToken,
}

impl SecureFetch {
    #[must_use]
    pub const fn new(api: ApiClient, session: Session, token: BearerToken) -> Self {
        Self {
            api,
            session,
            token,
        }
    }

    /// The session this helper clears on 401.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The unauthenticated client behind this helper.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-401 rejection.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-401 rejection.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-401 rejection.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-401 rejection.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, Some(body)).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-401 rejection.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        self.send::<(), T>(Method::DELETE, path, None).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .api
            .request(method, path)
            .bearer_auth(self.token.expose())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "Backend rejected the session token, signing out");
            session::end(&self.session).await?;
            return Ok(None);
        }

        read_response(response).await.map(Some)
    }
}
