//! Registry route handlers: the verified helper directory, helper dossiers,
//! and booking requests.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use silver_connect_core::UserId;
use tracing::instrument;

use super::{page_context, redirect_with, signed_out};
use crate::api::bookings::NewBooking;
use crate::api::{ApiError, MemberProfile};
use crate::filters;
use crate::middleware::{OptionalSession, RequireSession};
use crate::models::{Flash, PageContext, SessionUser};
use crate::state::AppState;

const DIRECTORY_STATEMENT: &str =
    "Dedicated healthcare professional providing specialized elderly assistance and domestic support.";
const DOSSIER_STATEMENT: &str =
    "Verified specialist with a clean service history and certified identity.";

// =============================================================================
// Views
// =============================================================================

/// A directory card.
#[derive(Debug, Clone)]
pub struct HelperCard {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub work_area: String,
    pub experience: String,
    pub statement: String,
    /// The viewer's own registry entry.
    pub is_own: bool,
}

impl HelperCard {
    fn new(helper: &MemberProfile, viewer: Option<&SessionUser>) -> Self {
        Self {
            id: helper.id.to_string(),
            name: helper.name.clone(),
            specialty: helper
                .specialty
                .clone()
                .unwrap_or_else(|| "Care Specialist".to_string()),
            work_area: helper
                .work_area
                .clone()
                .unwrap_or_else(|| "Lucknow Region".to_string()),
            experience: helper.experience.clone().unwrap_or_else(|| "0".to_string()),
            statement: helper.statement().unwrap_or(DIRECTORY_STATEMENT).to_string(),
            is_own: viewer.is_some_and(|v| v.id == helper.id),
        }
    }
}

/// A helper's dossier on the booking page.
#[derive(Debug, Clone)]
pub struct HelperDossier {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub experience: String,
    pub work_area: String,
    pub statement: String,
}

impl From<&MemberProfile> for HelperDossier {
    fn from(helper: &MemberProfile) -> Self {
        Self {
            id: helper.id.to_string(),
            name: helper.name.clone(),
            email: helper.email.clone(),
            specialty: helper.specialty.clone().unwrap_or_default(),
            experience: helper.experience.clone().unwrap_or_default(),
            work_area: helper.work_area.clone().unwrap_or_default(),
            statement: helper.statement().unwrap_or(DOSSIER_STATEMENT).to_string(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Directory page template.
#[derive(Template, WebTemplate)]
#[template(path = "registry/index.html")]
pub struct RegistryTemplate {
    pub page: PageContext,
    pub query: String,
    pub helpers: Vec<HelperCard>,
    pub signed_in: bool,
}

/// Dossier and booking page template.
#[derive(Template, WebTemplate)]
#[template(path = "registry/show.html")]
pub struct HelperTemplate {
    pub page: PageContext,
    pub helper: Option<HelperDossier>,
    pub is_own: bool,
    pub today: String,
    pub form: BookingForm,
}

// =============================================================================
// Directory
// =============================================================================

/// Query parameters for the directory.
#[derive(Debug, Deserialize)]
pub struct RegistryQuery {
    #[serde(default)]
    pub q: String,
}

/// Display verified helpers, optionally filtered.
#[instrument(skip(state, viewer, session))]
pub async fn index(
    State(state): State<AppState>,
    viewer: OptionalSession,
    session: tower_sessions::Session,
    Query(query): Query<RegistryQuery>,
) -> Response {
    let mut page = page_context(&session, viewer.user(), "/helpers").await;

    let helpers = match state.api().verified_helpers().await {
        Ok(helpers) => helpers
            .iter()
            .filter(|h| h.matches_query(&query.q))
            .map(|h| HelperCard::new(h, viewer.user()))
            .collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load the registry");
            page = page.with_flash(Flash::error("REGISTRY SERVER OFFLINE."));
            Vec::new()
        }
    };

    RegistryTemplate {
        page,
        query: query.q,
        helpers,
        signed_in: viewer.user().is_some(),
    }
    .into_response()
}

// =============================================================================
// Dossier & Booking
// =============================================================================

/// Booking form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

impl BookingForm {
    /// Guards checked before the request is sent.
    fn check(&self, today: NaiveDate) -> Result<NaiveDate, &'static str> {
        if [&self.date, &self.phone, &self.address, &self.notes]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err("ALL ENGAGEMENT FIELDS ARE REQUIRED.");
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "INVALID ENGAGEMENT DATE.")?;
        if date < today {
            return Err("ENGAGEMENT DATE CANNOT BE IN THE PAST.");
        }
        Ok(date)
    }

    fn into_booking(self, helper: &MemberProfile, client: &SessionUser, date: NaiveDate) -> NewBooking {
        NewBooking {
            helper_id: helper.id.to_string(),
            helper_name: helper.name.clone(),
            helper_email: helper.email.clone(),
            senior_name: client.name.clone(),
            senior_email: client.email.clone(),
            date: date.format("%Y-%m-%d").to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            notes: self.notes.trim().to_string(),
        }
    }
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn helper_page(
    page: PageContext,
    helper: &MemberProfile,
    viewer: &SessionUser,
    form: BookingForm,
) -> HelperTemplate {
    HelperTemplate {
        page,
        is_own: viewer.id == helper.id,
        helper: Some(helper.into()),
        today: today().format("%Y-%m-%d").to_string(),
        form,
    }
}

fn missing_helper(page: PageContext, status: StatusCode, text: &str) -> Response {
    (
        status,
        HelperTemplate {
            page: page.with_flash(Flash::error(text)),
            helper: None,
            is_own: false,
            today: today().format("%Y-%m-%d").to_string(),
            form: BookingForm::default(),
        },
    )
        .into_response()
}

/// Display a helper's dossier and the booking form.
#[instrument(skip(state, user, fetch), fields(helper_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireSession(user, fetch): RequireSession,
    Path(id): Path<String>,
) -> Response {
    let path = format!("/helper/{id}");
    let page = page_context(fetch.session(), Some(&user), &path).await;

    match state.api().helper_profile(&UserId::new(id)).await {
        Ok(Some(helper)) => helper_page(page, &helper, &user, BookingForm::default()).into_response(),
        Ok(None) => missing_helper(page, StatusCode::NOT_FOUND, "SPECIALIST DATA NOT FOUND."),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load helper profile");
            missing_helper(page, StatusCode::BAD_GATEWAY, "REGISTRY SERVER OFFLINE.")
        }
    }
}

/// Request a booking with a helper.
#[instrument(skip(state, user, fetch, form), fields(helper_id = %id, user_id = %user.id))]
pub async fn book(
    State(state): State<AppState>,
    RequireSession(user, fetch): RequireSession,
    Path(id): Path<String>,
    Form(form): Form<BookingForm>,
) -> Response {
    let path = format!("/helper/{id}");
    let session = fetch.session().clone();

    let helper = match state.api().helper_profile(&UserId::new(id)).await {
        Ok(Some(helper)) => helper,
        Ok(None) => {
            return redirect_with(&session, Flash::error("SPECIALIST DATA NOT FOUND."), "/helpers")
                .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load helper profile");
            return redirect_with(&session, Flash::error("SERVER TIMEOUT."), &path).await;
        }
    };

    if helper.id == user.id {
        return redirect_with(&session, Flash::error("TERMINAL RESTRICTED."), &path).await;
    }

    let date = match form.check(today()) {
        Ok(date) => date,
        Err(text) => {
            let page = page_context(&session, Some(&user), &path)
                .await
                .with_flash(Flash::error(text));
            return helper_page(page, &helper, &user, form).into_response();
        }
    };

    let booking = form.clone().into_booking(&helper, &user, date);
    match fetch.create_booking(&booking).await {
        Ok(Some(())) => {
            tracing::info!(date = %booking.date, "Booking requested");
            redirect_with(
                &session,
                Flash::success("✓ DISPATCH AUTHORIZED. SPECIALIST NOTIFIED."),
                "/dashboard",
            )
            .await
        }
        Ok(None) => signed_out(),
        Err(e) => {
            tracing::warn!(error = %e, "Booking request failed");
            let text = match &e {
                ApiError::Rejected { .. } => e.banner("TRANSMISSION FAILED.", "SERVER TIMEOUT."),
                _ => "SERVER TIMEOUT.".to_string(),
            };
            let page = page_context(&session, Some(&user), &path)
                .await
                .with_flash(Flash::error(text));
            helper_page(page, &helper, &user, form).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form(date: &str) -> BookingForm {
        BookingForm {
            date: date.to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 Hazratganj, Lucknow".to_string(),
            notes: "Morning walk and medication".to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_booking_date_must_not_be_past() {
        let today = day("2026-10-14");
        assert_eq!(form("2026-10-14").check(today).unwrap(), today);
        assert!(form("2026-11-02").check(today).is_ok());
        assert_eq!(
            form("2026-10-13").check(today).unwrap_err(),
            "ENGAGEMENT DATE CANNOT BE IN THE PAST."
        );
    }

    #[test]
    fn test_booking_fields_are_required() {
        let mut incomplete = form("2026-11-02");
        incomplete.notes = "  ".to_string();
        assert_eq!(
            incomplete.check(day("2026-10-14")).unwrap_err(),
            "ALL ENGAGEMENT FIELDS ARE REQUIRED."
        );
    }

    #[test]
    fn test_directory_card_fallbacks() {
        let helper: MemberProfile =
            serde_json::from_value(json!({"_id": "h1", "name": "Ravi", "role": "helper"})).unwrap();
        let card = HelperCard::new(&helper, None);
        assert_eq!(card.specialty, "Care Specialist");
        assert_eq!(card.work_area, "Lucknow Region");
        assert_eq!(card.experience, "0");
        assert_eq!(card.statement, DIRECTORY_STATEMENT);
        assert!(!card.is_own);
    }

    #[test]
    fn test_directory_marks_own_entry() {
        let helper: MemberProfile =
            serde_json::from_value(json!({"_id": "h1", "name": "Ravi", "bio": "Nurse"})).unwrap();
        let viewer: SessionUser =
            serde_json::from_value(json!({"_id": "h1", "name": "Ravi", "role": "helper"})).unwrap();
        let card = HelperCard::new(&helper, Some(&viewer));
        assert!(card.is_own);
        assert_eq!(card.statement, "Nurse");
    }
}
