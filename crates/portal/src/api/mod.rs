//! Client for the Silver Connect backend REST API.
//!
//! Two entry points:
//!
//! - [`ApiClient`] for unauthenticated calls (login, registration, password
//!   recovery, the public registry). Registry reads are cached with `moka`
//!   (60-second TTL) and invalidated when an admin changes a verification.
//! - [`SecureFetch`] for calls made on behalf of a signed-in account. It adds
//!   the bearer token to every request and ends the session when the backend
//!   answers 401, returning `Ok(None)` instead of the response.

mod cache;
mod secure;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod registry;
pub mod reviews;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
pub use secure::SecureFetch;
pub use types::*;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The response body was not the JSON we expected.
    #[error("Parse error: {0}")]
    Decode(String),

    /// The session could not be cleared after a 401.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl ApiError {
    /// The backend's own `message` for a rejected request, if it sent one.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Banner text for this error.
    ///
    /// Rejections surface the backend message (or `rejected` when it sent
    /// none); anything that never got a usable answer shows `offline`.
    #[must_use]
    pub fn banner(&self, rejected: &str, offline: &str) -> String {
        match self {
            Self::Rejected { message, .. } => {
                message.clone().unwrap_or_else(|| rejected.to_string())
            }
            Self::Http(_) | Self::Decode(_) | Self::Session(_) => offline.to_string(),
        }
    }
}

/// Client for the backend REST API.
///
/// Cheap to clone; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(60))
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Absolute URL for an API path such as `/api/auth/login`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.inner.client.request(method, self.url(path))
    }

    /// Send a JSON body without credentials and decode the JSON answer.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, path).json(body).send().await?;
        read_response(response).await
    }

    /// `GET` without credentials and decode the JSON answer.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        read_response(response).await
    }

    /// Drop every cached registry read.
    pub async fn invalidate_registry(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

/// Error body shape shared by every backend endpoint.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Turn a backend response into `T` or an [`ApiError`].
pub(crate) async fn read_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        decode_body(&bytes)
    } else {
        Err(rejection(status, &bytes))
    }
}

/// Decode a success body. An empty body decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::deserialize(serde_json::Value::Null).map_err(|e| ApiError::Decode(e.to_string()));
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

fn rejection(status: StatusCode, bytes: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorBody>(bytes) {
        Ok(body) => ApiError::Rejected {
            status: status.as_u16(),
            message: body.message.filter(|m| !m.trim().is_empty()),
        },
        Err(_) => {
            tracing::warn!(status = %status, "Backend returned a non-JSON error body");
            ApiError::Decode(format!("non-JSON error response ({status})"))
        }
    }
}
