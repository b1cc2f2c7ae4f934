//! Account route handlers: the member's own dossier and the helper
//! application.
//!
//! These routes require a session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use silver_connect_core::{ApplicationStatus, Role};
use tracing::instrument;

use super::{page_context, redirect_with, signed_out};
use crate::api::ApiError;
use crate::api::auth::{HelperApplication, ProfileUpdate};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireSession;
use crate::models::session;
use crate::models::{Flash, PageContext, SessionUser};

// =============================================================================
// Profile
// =============================================================================

/// Header facts shown beside the profile form.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub auth_protocol: &'static str,
    pub clearance: &'static str,
    pub registry_ref: String,
}

impl From<&SessionUser> for ProfileView {
    fn from(user: &SessionUser) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            auth_protocol: if user.google_id.is_some() {
                "Google Cloud"
            } else {
                "Standard JWT"
            },
            clearance: match user.role {
                Role::Admin => "Level 3 Access",
                _ if user.is_verified => "Vetted Specialist",
                _ => "Basic Member",
            },
            registry_ref: user.id.registry_ref(),
        }
    }
}

fn prefill(user: &SessionUser) -> ProfileUpdate {
    ProfileUpdate {
        name: user.name.clone(),
        phone: user.phone.clone().unwrap_or_default(),
        work_area: user.work_area.clone().unwrap_or_default(),
        summary: user.statement().unwrap_or_default().to_string(),
        specialty: user.specialty.clone().unwrap_or_default(),
        experience: user.experience.clone().unwrap_or_default(),
    }
}

/// The session user with the submitted edits applied.
fn merged(mut user: SessionUser, update: &ProfileUpdate) -> SessionUser {
    fn field(value: &str) -> Option<String> {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    if !update.name.trim().is_empty() {
        user.name = update.name.trim().to_string();
    }
    user.phone = field(&update.phone);
    user.work_area = field(&update.work_area);
    user.summary = field(&update.summary);
    user.specialty = field(&update.specialty);
    user.experience = field(&update.experience);
    user
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub profile: ProfileView,
    pub form: ProfileUpdate,
}

/// Display the member's own dossier.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(RequireSession(user, fetch): RequireSession) -> Response {
    let current = match fetch.me().await {
        Ok(Some(me)) => me,
        Ok(None) => return signed_out(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load profile, using session copy");
            user.clone()
        }
    };

    ProfileTemplate {
        page: page_context(fetch.session(), Some(&user), "/profile").await,
        profile: ProfileView::from(&current),
        form: prefill(&current),
    }
    .into_response()
}

/// Save profile edits and merge them into the session.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update(
    RequireSession(user, fetch): RequireSession,
    Form(form): Form<ProfileUpdate>,
) -> Result<Response> {
    let session = fetch.session().clone();

    match fetch.update_profile(&form).await {
        Ok(Some(())) => {
            session::update_user(&session, &merged(user, &form)).await?;
            tracing::info!("Profile updated");
            Ok(redirect_with(
                &session,
                Flash::success("✓ DOSSIER UPDATED SUCCESSFULLY."),
                "/profile",
            )
            .await)
        }
        Ok(None) => Ok(signed_out()),
        Err(e) => {
            tracing::warn!(error = %e, "Profile update failed");
            let text = match e {
                ApiError::Rejected { .. } => "TRANSMISSION FAILED.",
                _ => "SYSTEM ERROR.",
            };
            Ok(redirect_with(&session, Flash::error(text), "/profile").await)
        }
    }
}

// =============================================================================
// Helper Application
// =============================================================================

/// Why an account cannot apply, if it cannot.
#[must_use]
pub fn application_restriction(user: &SessionUser) -> Option<&'static str> {
    match user.role {
        Role::Admin => Some("Admins are not permitted to register as helpers."),
        Role::Helper => Some("You are already a verified specialist."),
        Role::User if user.application_status == Some(ApplicationStatus::Pending) => {
            Some("Your professional dossier is currently being vetted by the board.")
        }
        Role::User => None,
    }
}

/// Helper application form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub work_area: String,
    #[serde(default)]
    pub aadhar: String,
    #[serde(default)]
    pub resume_link: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub summary: String,
    /// Checkbox: present only when ticked.
    #[serde(default)]
    pub agreed: Option<String>,
}

impl ApplicationForm {
    fn agreed(&self) -> bool {
        self.agreed.is_some()
    }

    fn to_application(&self) -> std::result::Result<HelperApplication, &'static str> {
        if !self.agreed() {
            return Err("PLEASE CONFIRM YOUR DATA IS AUTHENTIC.");
        }
        let trimmed = |s: &str| s.trim().to_string();
        Ok(HelperApplication {
            email: trimmed(&self.email),
            phone: trimmed(&self.phone),
            specialty: trimmed(&self.specialty),
            experience: trimmed(&self.experience),
            work_area: trimmed(&self.work_area),
            aadhar: trimmed(&self.aadhar),
            resume_link: trimmed(&self.resume_link),
            linkedin: trimmed(&self.linkedin),
            summary: trimmed(&self.summary),
            agreed: true,
        })
    }
}

/// Helper application template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/apply.html")]
pub struct ApplicationTemplate {
    pub page: PageContext,
    pub name: String,
    pub restriction: Option<&'static str>,
    pub form: ApplicationForm,
}

/// Display the helper application form.
pub async fn application_page(RequireSession(user, fetch): RequireSession) -> impl IntoResponse {
    ApplicationTemplate {
        page: page_context(fetch.session(), Some(&user), "/register/helper").await,
        restriction: application_restriction(&user),
        form: ApplicationForm {
            email: user.email.clone(),
            ..ApplicationForm::default()
        },
        name: user.name,
    }
}

/// File a helper application.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn apply(
    RequireSession(user, fetch): RequireSession,
    Form(form): Form<ApplicationForm>,
) -> Result<Response> {
    let session = fetch.session().clone();

    if let Some(reason) = application_restriction(&user) {
        return Ok(redirect_with(&session, Flash::error(reason), "/register/helper").await);
    }

    let application = match form.to_application() {
        Ok(application) => application,
        Err(text) => {
            return Ok(ApplicationTemplate {
                page: page_context(&session, Some(&user), "/register/helper")
                    .await
                    .with_flash(Flash::error(text)),
                name: user.name,
                restriction: None,
                form,
            }
            .into_response());
        }
    };

    match fetch.upgrade_to_helper(&application).await {
        Ok(Some(())) => {
            let mut pending = user;
            pending.application_status = Some(ApplicationStatus::Pending);
            session::update_user(&session, &pending).await?;
            tracing::info!("Helper application filed");
            Ok(redirect_with(
                &session,
                Flash::success("✓ DOSSIER FILED. PENDING ADMIN AUDIT."),
                "/dashboard",
            )
            .await)
        }
        Ok(None) => Ok(signed_out()),
        Err(e) => {
            tracing::warn!(error = %e, "Helper application failed");
            let text = e.banner("APPLICATION DENIED.", "REGISTRY OFFLINE.");
            Ok(ApplicationTemplate {
                page: page_context(&session, Some(&user), "/register/helper")
                    .await
                    .with_flash(Flash::error(text)),
                name: user.name,
                restriction: None,
                form,
            }
            .into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user(value: serde_json::Value) -> SessionUser {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_profile_view_labels() {
        let client = user(json!({"_id": "65f0c1a2b3d4e5f6a7b8c9d0", "name": "Kamala", "role": "user"}));
        let view = ProfileView::from(&client);
        assert_eq!(view.auth_protocol, "Standard JWT");
        assert_eq!(view.clearance, "Basic Member");
        assert_eq!(view.registry_ref, "SC-B8C9D0");

        let helper = user(json!({"_id": "h1", "role": "helper", "isVerified": true, "googleId": "g-1"}));
        let view = ProfileView::from(&helper);
        assert_eq!(view.auth_protocol, "Google Cloud");
        assert_eq!(view.clearance, "Vetted Specialist");

        let admin = user(json!({"_id": "a1", "role": "admin"}));
        assert_eq!(ProfileView::from(&admin).clearance, "Level 3 Access");
    }

    #[test]
    fn test_merge_applies_submitted_fields_and_keeps_the_rest() {
        let before = user(json!({
            "_id": "u1", "name": "Kamala", "email": "k@x.in", "role": "user",
            "phone": "111", "createdAt": "2025-01-04"
        }));
        let after = merged(
            before,
            &ProfileUpdate {
                name: "Kamala Devi".to_string(),
                phone: String::new(),
                work_area: "Aliganj".to_string(),
                summary: "Retired nurse".to_string(),
                specialty: String::new(),
                experience: String::new(),
            },
        );

        assert_eq!(after.name, "Kamala Devi");
        assert_eq!(after.phone, None);
        assert_eq!(after.work_area.as_deref(), Some("Aliganj"));
        assert_eq!(after.statement(), Some("Retired nurse"));
        assert_eq!(after.email, "k@x.in");
        assert_eq!(after.extra.get("createdAt"), Some(&json!("2025-01-04")));
    }

    #[test]
    fn test_application_restrictions() {
        let admin = user(json!({"_id": "a1", "role": "admin"}));
        assert!(application_restriction(&admin).unwrap().starts_with("Admins"));

        let helper = user(json!({"_id": "h1", "role": "helper"}));
        assert!(application_restriction(&helper).unwrap().contains("already"));

        let pending = user(json!({"_id": "u1", "role": "user", "applicationStatus": "pending"}));
        assert!(application_restriction(&pending).unwrap().contains("vetted"));

        let client = user(json!({"_id": "u2", "role": "user"}));
        assert_eq!(application_restriction(&client), None);
    }

    #[test]
    fn test_application_requires_agreement() {
        let form = ApplicationForm {
            phone: " 98765 ".to_string(),
            ..ApplicationForm::default()
        };
        assert!(form.to_application().is_err());

        let agreed = ApplicationForm {
            agreed: Some("on".to_string()),
            ..form
        };
        let application = agreed.to_application().unwrap();
        assert!(application.agreed);
        assert_eq!(application.phone, "98765");
    }
}
