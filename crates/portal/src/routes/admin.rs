//! Admin terminal route handlers.
//!
//! One page with five tabs over data fetched concurrently on every view:
//! members, pending helper applications, verified helpers, all bookings,
//! and contact messages. A fetch that fails leaves its tab empty.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use silver_connect_core::{BookingStatus, Role, UserId, VerificationDecision};
use tracing::instrument;

use super::{loaded, page_context, redirect_with, signed_out};
use crate::api::{Booking, ContactMessage, MemberProfile};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{AdminArea, RequireArea};
use crate::models::{Flash, PageContext};
use crate::services::DEFAULT_CONTACT_SUBJECT;

/// Shown for an empty audit field.
const NOT_RECORDED: &str = "NOT RECORDED";

fn recorded(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_RECORDED)
        .to_string()
}

// =============================================================================
// Tabs
// =============================================================================

/// Admin terminal tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Users,
    Pending,
    Verified,
    Bookings,
    Messages,
}

impl AdminTab {
    pub const ALL: [Self; 5] = [
        Self::Users,
        Self::Pending,
        Self::Verified,
        Self::Bookings,
        Self::Messages,
    ];

    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("pending") => Self::Pending,
            Some("verified") => Self::Verified,
            Some("bookings") => Self::Bookings,
            Some("messages") => Self::Messages,
            _ => Self::Users,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Bookings => "bookings",
            Self::Messages => "messages",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Pending => "Pending Helpers",
            Self::Verified => "Active Helpers",
            Self::Bookings => "Bookings",
            Self::Messages => "Messages",
        }
    }
}

/// A sidebar entry with its item count.
#[derive(Debug, Clone)]
pub struct TabLink {
    pub tab: AdminTab,
    pub count: usize,
}

// =============================================================================
// Views
// =============================================================================

/// A row in the member list.
#[derive(Debug, Clone)]
pub struct MemberRow {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
}

impl From<&MemberProfile> for MemberRow {
    fn from(member: &MemberProfile) -> Self {
        Self {
            name: member.name.clone(),
            email: member.email.clone(),
            role: member.role,
            is_verified: member.is_verified,
        }
    }
}

/// A pending helper application.
#[derive(Debug, Clone)]
pub struct ApplicationCard {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub experience: String,
    pub phone: String,
    pub email: String,
    pub work_area: String,
    pub aadhar: String,
    pub statement: String,
    pub resume_link: Option<String>,
}

impl From<&MemberProfile> for ApplicationCard {
    fn from(app: &MemberProfile) -> Self {
        Self {
            id: app.id.to_string(),
            name: app.name.clone(),
            specialty: app.specialty.clone().unwrap_or_default(),
            experience: app.experience.clone().unwrap_or_default(),
            phone: recorded(app.phone.as_deref()),
            email: recorded(Some(&app.email)),
            work_area: recorded(app.work_area.as_deref()),
            aadhar: app.aadhar.clone().unwrap_or_else(|| "Not Provided".to_string()),
            statement: app
                .statement()
                .unwrap_or("No statement provided.")
                .to_string(),
            resume_link: app
                .resume_link
                .clone()
                .filter(|link| link.starts_with("https://") || link.starts_with("http://")),
        }
    }
}

/// A verified helper that can be revoked.
#[derive(Debug, Clone)]
pub struct SpecialistCard {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub phone: String,
    pub email: String,
    pub work_area: String,
    pub statement: String,
}

impl From<&MemberProfile> for SpecialistCard {
    fn from(helper: &MemberProfile) -> Self {
        Self {
            id: helper.id.to_string(),
            name: helper.name.clone(),
            specialty: recorded(helper.specialty.as_deref()),
            phone: recorded(helper.phone.as_deref()),
            email: recorded(Some(&helper.email)),
            work_area: recorded(helper.work_area.as_deref()),
            statement: helper
                .statement()
                .unwrap_or("Verified professional specialized in healthcare assistance.")
                .to_string(),
        }
    }
}

/// A row in the booking ledger.
#[derive(Debug, Clone)]
pub struct BookingRow {
    pub id: String,
    pub signal_ref: String,
    pub requester: String,
    pub helper_name: String,
    pub status: BookingStatus,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            signal_ref: booking.id.short_ref(),
            requester: booking
                .user
                .as_ref()
                .and_then(|u| u.name())
                .unwrap_or("Member")
                .to_string(),
            helper_name: booking.helper_name.clone(),
            status: booking.status,
        }
    }
}

/// The booking audit dossier.
#[derive(Debug, Clone)]
pub struct BookingAudit {
    pub client_name: String,
    pub client_email: String,
    pub helper_name: String,
    pub helper_email: String,
    pub address: String,
    pub date: String,
    pub notes: String,
}

impl From<&Booking> for BookingAudit {
    fn from(booking: &Booking) -> Self {
        let client = booking.user.as_ref();
        Self {
            client_name: recorded(client.and_then(|u| u.name()).or(booking.senior_name.as_deref())),
            client_email: recorded(
                client
                    .and_then(|u| u.email())
                    .or(booking.senior_email.as_deref()),
            ),
            helper_name: recorded(Some(&booking.helper_name)),
            helper_email: recorded(Some(&booking.helper_email)),
            address: recorded(Some(&booking.address)),
            date: booking.date.clone(),
            notes: booking
                .notes
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Standard operational guidelines observed.".to_string()),
        }
    }
}

/// A contact form message.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub date: String,
}

impl From<&ContactMessage> for MessageRow {
    fn from(message: &ContactMessage) -> Self {
        Self {
            name: message.name.clone(),
            email: message.email.clone(),
            subject: message
                .subject
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTACT_SUBJECT.to_string()),
            message: message.message.clone(),
            date: message.created_at.clone().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Admin terminal template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub page: PageContext,
    pub tab: AdminTab,
    pub tabs: Vec<TabLink>,
    pub query: String,
    pub users: Vec<MemberRow>,
    pub pending: Vec<ApplicationCard>,
    pub verified: Vec<SpecialistCard>,
    pub bookings: Vec<BookingRow>,
    pub messages: Vec<MessageRow>,
    pub audit: Option<BookingAudit>,
}

/// Query parameters for the admin terminal.
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub tab: Option<String>,
    /// Member name filter.
    #[serde(default)]
    pub q: String,
    /// Booking id whose audit dossier is open.
    pub audit: Option<String>,
}

/// Whether `member`'s name contains `query`, ignoring case.
fn name_matches(member: &MemberProfile, query: &str) -> bool {
    member
        .name
        .to_lowercase()
        .contains(&query.trim().to_lowercase())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the admin terminal.
#[instrument(skip(area), fields(user_id = %area.user.id))]
pub async fn index(area: RequireArea<AdminArea>, Query(query): Query<AdminQuery>) -> Response {
    let RequireArea { user, fetch, .. } = area;

    let (users, pending, verified, messages, bookings) = tokio::join!(
        fetch.all_users(),
        fetch.pending_helpers(),
        fetch.verified_helpers_fresh(),
        fetch.contact_messages(),
        fetch.all_bookings(),
    );

    if [
        users.as_ref().is_ok_and(Option::is_none),
        pending.as_ref().is_ok_and(Option::is_none),
        verified.as_ref().is_ok_and(Option::is_none),
        messages.as_ref().is_ok_and(Option::is_none),
        bookings.as_ref().is_ok_and(Option::is_none),
    ]
    .contains(&true)
    {
        return signed_out();
    }

    let users = loaded("members", users);
    let pending = loaded("pending helpers", pending);
    let verified = loaded("verified helpers", verified);
    let messages = loaded("contact messages", messages);
    let bookings = loaded("bookings", bookings);

    let tab = AdminTab::parse(query.tab.as_deref());
    let counts = [
        users.len(),
        pending.len(),
        verified.len(),
        bookings.len(),
        messages.len(),
    ];
    let audit = query
        .audit
        .as_deref()
        .and_then(|id| bookings.iter().find(|b| b.id.as_str() == id))
        .map(BookingAudit::from);

    AdminTemplate {
        page: page_context(fetch.session(), Some(&user), "/admin").await,
        tab,
        tabs: AdminTab::ALL
            .into_iter()
            .zip(counts)
            .map(|(tab, count)| TabLink { tab, count })
            .collect(),
        users: users
            .iter()
            .filter(|u| name_matches(u, &query.q))
            .map(MemberRow::from)
            .collect(),
        query: query.q,
        pending: pending.iter().map(ApplicationCard::from).collect(),
        verified: verified.iter().map(SpecialistCard::from).collect(),
        bookings: bookings.iter().map(BookingRow::from).collect(),
        messages: messages.iter().map(MessageRow::from).collect(),
        audit,
    }
    .into_response()
}

/// Verification form data.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    #[serde(default)]
    pub decision: String,
}

async fn decide(
    area: RequireArea<AdminArea>,
    id: String,
    decision: VerificationDecision,
    success: &str,
    back_to: &str,
) -> Response {
    let session = area.fetch.session().clone();

    match area.fetch.verify_helper(&UserId::new(id.as_str()), decision).await {
        Ok(Some(())) => {
            add_breadcrumb(
                "admin",
                "Helper verification",
                Some(&[("decision", decision.as_str())]),
            );
            tracing::info!(helper_id = %id, decision = decision.as_str(), "Helper verification recorded");
            redirect_with(&session, Flash::success(success), back_to).await
        }
        Ok(None) => signed_out(),
        Err(e) => {
            tracing::warn!(helper_id = %id, error = %e, "Helper verification failed");
            let text = e.banner("VERIFICATION DENIED.", "REGISTRY OFFLINE.");
            redirect_with(&session, Flash::error(text), back_to).await
        }
    }
}

/// Approve or reject a pending helper.
#[instrument(skip(area, form), fields(user_id = %area.user.id, helper_id = %id))]
pub async fn verify(
    area: RequireArea<AdminArea>,
    Path(id): Path<String>,
    Form(form): Form<VerifyForm>,
) -> Response {
    let Ok(decision) = form.decision.parse::<VerificationDecision>() else {
        let session = area.fetch.session().clone();
        return redirect_with(&session, Flash::error("UNKNOWN DECISION."), "/admin?tab=pending")
            .await;
    };

    let success = match decision {
        VerificationDecision::Approved => "✓ CLEARANCE GRANTED",
        VerificationDecision::Rejected => "✓ APPLICATION DENIED",
    };
    decide(area, id, decision, success, "/admin?tab=pending").await
}

/// Revoke a verified helper's clearance.
#[instrument(skip(area), fields(user_id = %area.user.id, helper_id = %id))]
pub async fn revoke(area: RequireArea<AdminArea>, Path(id): Path<String>) -> Response {
    decide(
        area,
        id,
        VerificationDecision::Rejected,
        "✓ CLEARANCE TERMINATED",
        "/admin?tab=verified",
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn member(value: serde_json::Value) -> MemberProfile {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_member_filter_is_case_insensitive_name_only() {
        let asha = member(json!({"_id": "u1", "name": "Asha Verma", "workArea": "Aliganj"}));
        assert!(name_matches(&asha, "asha"));
        assert!(name_matches(&asha, "VERMA"));
        assert!(name_matches(&asha, ""));
        assert!(!name_matches(&asha, "aliganj"));
    }

    #[test]
    fn test_application_fallbacks() {
        let card = ApplicationCard::from(&member(json!({"_id": "u1", "name": "Meera"})));
        assert_eq!(card.aadhar, "Not Provided");
        assert_eq!(card.statement, "No statement provided.");
        assert_eq!(card.phone, NOT_RECORDED);
        assert!(card.resume_link.is_none());
    }

    #[test]
    fn test_resume_link_must_be_web_url() {
        let linked = ApplicationCard::from(&member(
            json!({"_id": "u1", "name": "Meera", "resumeLink": "https://drive.example/cv.pdf"}),
        ));
        assert_eq!(linked.resume_link.as_deref(), Some("https://drive.example/cv.pdf"));

        let scripted = ApplicationCard::from(&member(
            json!({"_id": "u2", "name": "Meera", "resumeLink": "javascript:alert(1)"}),
        ));
        assert!(scripted.resume_link.is_none());
    }

    #[test]
    fn test_specialist_statement_prefers_summary() {
        let card = SpecialistCard::from(&member(
            json!({"_id": "h1", "name": "Ravi", "summary": "Geriatric nurse", "bio": "Old bio"}),
        ));
        assert_eq!(card.statement, "Geriatric nurse");
    }

    #[test]
    fn test_booking_audit_falls_back_to_senior_fields() {
        let booking: Booking = serde_json::from_value(json!({
            "_id": "b1",
            "user": "u1",
            "seniorName": "Kamala",
            "seniorEmail": "kamala@x.in",
            "helperName": "Ravi",
            "helperEmail": "",
            "address": "Hazratganj",
            "status": "accepted"
        }))
        .unwrap();

        let audit = BookingAudit::from(&booking);
        assert_eq!(audit.client_name, "Kamala");
        assert_eq!(audit.client_email, "kamala@x.in");
        assert_eq!(audit.helper_email, NOT_RECORDED);
        assert_eq!(audit.notes, "Standard operational guidelines observed.");
        assert_eq!(BookingRow::from(&booking).requester, "Member");
    }

    #[test]
    fn test_tab_parse_defaults_to_users() {
        assert_eq!(AdminTab::parse(Some("messages")), AdminTab::Messages);
        assert_eq!(AdminTab::parse(Some("nope")), AdminTab::Users);
        assert_eq!(AdminTab::parse(None), AdminTab::Users);
    }
}
