//! Contact form route handlers.
//!
//! Messages are delivered through the EmailJS REST API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use silver_connect_core::Email;
use tower_sessions::Session;
use tracing::instrument;

use super::page_context;
use crate::filters;
use crate::middleware::OptionalSession;
use crate::models::{Flash, PageContext};
use crate::services::{CONTACT_SUBJECTS, ContactEmail, DEFAULT_CONTACT_SUBJECT};
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            subject: DEFAULT_CONTACT_SUBJECT.to_string(),
            message: String::new(),
        }
    }
}

impl ContactForm {
    /// Check the form and build the outgoing email.
    ///
    /// Unknown subjects fall back to the default subject.
    fn to_email(&self) -> Result<ContactEmail, &'static str> {
        let email = Email::parse(&self.email).map_err(|_| "Please enter a valid email address")?;
        if self.name.trim().is_empty() || self.message.trim().is_empty() {
            return Err("Name and message are required");
        }
        let subject = CONTACT_SUBJECTS
            .iter()
            .copied()
            .find(|s| *s == self.subject)
            .unwrap_or(DEFAULT_CONTACT_SUBJECT);

        Ok(ContactEmail {
            name: self.name.trim().to_string(),
            email: email.into_inner(),
            subject: subject.to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

/// Query parameters for the contact page.
#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    #[serde(default)]
    pub sent: Option<String>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
    pub form: ContactForm,
    pub subjects: &'static [&'static str],
    pub sent: bool,
}

/// Display the contact page.
pub async fn show(
    viewer: OptionalSession,
    session: Session,
    Query(query): Query<ContactQuery>,
) -> impl IntoResponse {
    ContactTemplate {
        page: page_context(&session, viewer.user(), "/contact").await,
        form: ContactForm::default(),
        subjects: CONTACT_SUBJECTS,
        sent: query.sent.is_some(),
    }
}

/// Send the contact form.
///
/// On failure the form is shown again with what the visitor typed.
#[instrument(skip(state, viewer, session, form), fields(subject = %form.subject))]
pub async fn submit(
    State(state): State<AppState>,
    viewer: OptionalSession,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Response {
    let result = match form.to_email() {
        Err(reason) => Err(reason.to_string()),
        Ok(email) => match state.emailjs() {
            None => {
                tracing::error!("EmailJS not configured");
                Err("Contact service unavailable".to_string())
            }
            Some(client) => client.send(&email).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to send contact message");
                e.text()
            }),
        },
    };

    match result {
        Ok(()) => {
            tracing::info!("Contact message sent");
            Redirect::to("/contact?sent=1").into_response()
        }
        Err(text) => {
            let flash = Flash::error(format!("Transmission Error: {text}"));
            ContactTemplate {
                page: page_context(&session, viewer.user(), "/contact")
                    .await
                    .with_flash(flash),
                form,
                subjects: CONTACT_SUBJECTS,
                sent: false,
            }
            .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, subject: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_valid_form_is_normalized() {
        let email = form(" Asha ", " Asha@Example.IN ", "Cognitive Care", "Need help")
            .to_email()
            .unwrap();
        assert_eq!(email.name, "Asha");
        assert_eq!(email.email, "asha@example.in");
        assert_eq!(email.subject, "Cognitive Care");
    }

    #[test]
    fn test_unknown_subject_falls_back() {
        let email = form("Asha", "asha@example.in", "Sales", "Hi").to_email().unwrap();
        assert_eq!(email.subject, "General Inquiry");
    }

    #[test]
    fn test_missing_fields_are_refused() {
        assert!(form("Asha", "not-an-email", "General Inquiry", "Hi").to_email().is_err());
        assert!(form("  ", "asha@example.in", "General Inquiry", "Hi").to_email().is_err());
        assert!(form("Asha", "asha@example.in", "General Inquiry", " ").to_email().is_err());
    }

    #[test]
    fn test_default_subject() {
        assert_eq!(ContactForm::default().subject, "General Inquiry");
    }
}
