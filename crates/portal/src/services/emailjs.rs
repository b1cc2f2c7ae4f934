//! EmailJS REST client for contact form dispatch.
//!
//! Sends a template email through `POST /api/v1.0/email/send`. The template
//! receives `name`, `email`, `subject`, and `message`.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::EmailJsConfig;

/// Errors that can occur when sending through EmailJS.
#[derive(Debug, Error)]
pub enum EmailJsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// EmailJS refused the send. `message` is its plain-text reason.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl EmailJsError {
    /// The reason shown to the visitor.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Http(_) => "Network unavailable".to_string(),
            Self::Api { message, .. } => message.clone(),
        }
    }
}

/// Subject used when the submitted one is not offered.
pub const DEFAULT_CONTACT_SUBJECT: &str = "General Inquiry";

/// Subjects offered on the contact form.
pub const CONTACT_SUBJECTS: &[&str] = &[
    DEFAULT_CONTACT_SUBJECT,
    "Assisted Living",
    "Wellness Checks",
    "Cognitive Care",
    "Nutritional Support",
    "Travel Escorts",
    "24/7 SOS Response",
    "Social Companion",
    "Physical Therapy",
    "Post-Surgical Support",
    "Join as Helper",
    "Other Category",
];

/// Template parameters for the contact email.
#[derive(Debug, Clone, Serialize)]
pub struct ContactEmail {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a ContactEmail,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
}

/// EmailJS API client.
#[derive(Clone)]
pub struct EmailJsClient {
    client: reqwest::Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
    private_key: Option<SecretString>,
}

impl EmailJsClient {
    /// Create a new EmailJS client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &EmailJsConfig) -> Result<Self, EmailJsError> {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            public_key: config.public_key.clone(),
            private_key: config.private_key.clone(),
        })
    }

    /// Send the contact email.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or EmailJS refuses it.
    #[instrument(skip(self, email), fields(subject = %email.subject))]
    pub async fn send(&self, email: &ContactEmail) -> Result<(), EmailJsError> {
        let body = SendRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: email,
            access_token: self.private_key.as_ref().map(ExposeSecret::expose_secret),
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailJsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_send_request_shape() {
        let email = ContactEmail {
            name: "Kamala".to_string(),
            email: "kamala@example.in".to_string(),
            subject: "Wellness Checks".to_string(),
            message: "Weekly visits for my mother".to_string(),
        };
        let body = serde_json::to_value(SendRequest {
            service_id: "service_care",
            template_id: "template_contact",
            user_id: "pk_public",
            template_params: &email,
            access_token: None,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "service_id": "service_care",
                "template_id": "template_contact",
                "user_id": "pk_public",
                "template_params": {
                    "name": "Kamala",
                    "email": "kamala@example.in",
                    "subject": "Wellness Checks",
                    "message": "Weekly visits for my mother"
                }
            })
        );
    }

    #[test]
    fn test_access_token_is_sent_when_configured() {
        let email = ContactEmail {
            name: "A".to_string(),
            email: "a@x.in".to_string(),
            subject: "General Inquiry".to_string(),
            message: "Hi".to_string(),
        };
        let body = serde_json::to_value(SendRequest {
            service_id: "s",
            template_id: "t",
            user_id: "u",
            template_params: &email,
            access_token: Some("private"),
        })
        .unwrap();
        assert_eq!(body["accessToken"], json!("private"));
    }

    #[test]
    fn test_error_text() {
        let err = EmailJsError::Api {
            status: 400,
            message: "The template ID is invalid".to_string(),
        };
        assert_eq!(err.text(), "The template ID is invalid");
    }
}
