//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::PortalConfig;
use crate::services::{EmailJsClient, EmailJsError};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Api(#[from] ApiError),
    #[error("EmailJS client: {0}")]
    EmailJs(#[from] EmailJsError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the mail client, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    api: ApiClient,
    emailjs: Option<EmailJsClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: PortalConfig) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api)?;
        let emailjs = config
            .emailjs
            .as_ref()
            .map(EmailJsClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                emailjs,
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// The EmailJS client, when the contact form is configured.
    #[must_use]
    pub fn emailjs(&self) -> Option<&EmailJsClient> {
        self.inner.emailjs.as_ref()
    }
}
