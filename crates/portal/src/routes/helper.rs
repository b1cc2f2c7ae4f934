//! Helper terminal route handlers.
//!
//! Verified helpers see the bookings assigned to them, move them through
//! accept/reject/complete, and read the reviews clients left.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use silver_connect_core::rating::average_label;
use silver_connect_core::{BookingId, BookingStatus, HelperAction};
use tracing::instrument;

use super::dashboard::stars;
use super::{page_context, redirect_with, signed_out};
use crate::api::{Booking, Review};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{HelperArea, RequireArea};
use crate::models::{Flash, PageContext};

/// Terminal tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalTab {
    #[default]
    Incoming,
    History,
    Reviews,
}

impl TerminalTab {
    pub const ALL: [Self; 3] = [Self::Incoming, Self::History, Self::Reviews];

    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("history") => Self::History,
            Some("reviews") => Self::Reviews,
            _ => Self::Incoming,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::History => "history",
            Self::Reviews => "reviews",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Incoming => "Active Signals",
            Self::History => "Registry History",
            Self::Reviews => "Performance Audits",
        }
    }

    /// Whether a booking in `status` is listed under this tab.
    #[must_use]
    pub const fn lists(self, status: BookingStatus) -> bool {
        match self {
            Self::Incoming => status.is_incoming_for_helper(),
            Self::History => !status.is_incoming_for_helper(),
            Self::Reviews => false,
        }
    }
}

/// A status button on a task card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    /// Target status submitted with the form.
    pub status: &'static str,
    pub label: &'static str,
    pub primary: bool,
}

impl From<HelperAction> for ActionButton {
    fn from(action: HelperAction) -> Self {
        let (label, primary) = match action {
            HelperAction::Accept => ("Accept Task", true),
            HelperAction::Reject => ("Deny", false),
            HelperAction::Complete => ("Mark Completed", true),
        };
        Self {
            status: action.target_status().as_str(),
            label,
            primary,
        }
    }
}

/// A booking as shown to its helper.
#[derive(Debug, Clone)]
pub struct TaskCard {
    pub id: String,
    pub signal_ref: String,
    pub client_name: String,
    pub status: BookingStatus,
    pub date: String,
    pub address: String,
    pub phone: String,
    pub notes: String,
    pub actions: Vec<ActionButton>,
}

impl From<&Booking> for TaskCard {
    fn from(booking: &Booking) -> Self {
        let client_name = booking
            .user
            .as_ref()
            .and_then(|u| u.name())
            .or(booking.senior_name.as_deref())
            .unwrap_or_default()
            .to_string();

        Self {
            id: booking.id.to_string(),
            signal_ref: booking.id.short_ref(),
            client_name,
            status: booking.status,
            date: booking.date.clone(),
            address: booking.address.clone(),
            phone: booking.phone.clone(),
            notes: booking
                .notes
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Standard care directives logged.".to_string()),
            actions: booking
                .status
                .helper_actions()
                .iter()
                .copied()
                .map(ActionButton::from)
                .collect(),
        }
    }
}

/// A review of this helper.
#[derive(Debug, Clone)]
pub struct AuditCard {
    pub client_name: String,
    pub client_email: String,
    pub stars: String,
    pub date: String,
    pub text: String,
}

impl From<&Review> for AuditCard {
    fn from(review: &Review) -> Self {
        // Only a populated reference carries the client's details
        let client = review.user.as_ref().filter(|u| u.name().is_some() || u.email().is_some());
        Self {
            client_name: client
                .and_then(|u| u.name())
                .unwrap_or("Verified Client")
                .to_string(),
            client_email: client.and_then(|u| u.email()).unwrap_or("N/A").to_string(),
            stars: stars(review.rating),
            date: review.created_at.clone().unwrap_or_default(),
            text: review.review_text.clone(),
        }
    }
}

/// Helper terminal template.
#[derive(Template, WebTemplate)]
#[template(path = "helper/index.html")]
pub struct TerminalTemplate {
    pub page: PageContext,
    pub name: String,
    pub experience: String,
    pub rating: String,
    pub tab: TerminalTab,
    pub tabs: [TerminalTab; 3],
    pub tasks: Vec<TaskCard>,
    pub audits: Vec<AuditCard>,
}

/// Query parameters for the terminal.
#[derive(Debug, Deserialize)]
pub struct TerminalQuery {
    pub tab: Option<String>,
}

/// Display the helper terminal.
#[instrument(skip(area), fields(user_id = %area.user.id))]
pub async fn index(area: RequireArea<HelperArea>, Query(query): Query<TerminalQuery>) -> Response {
    let RequireArea { user, fetch, .. } = area;

    // Reviews are only requested once the task list has loaded
    let (tasks, reviews) = match fetch.helper_tasks().await {
        Ok(Some(tasks)) => match fetch.helper_reviews(&user.id).await {
            Ok(Some(reviews)) => (tasks, reviews),
            Ok(None) => return signed_out(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load helper reviews");
                (tasks, Vec::new())
            }
        },
        Ok(None) => return signed_out(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load helper tasks");
            (Vec::new(), Vec::new())
        }
    };

    let tab = TerminalTab::parse(query.tab.as_deref());

    TerminalTemplate {
        page: page_context(fetch.session(), Some(&user), "/helper").await,
        experience: user.experience.clone().unwrap_or_else(|| "0".to_string()),
        rating: average_label(reviews.iter().map(|r| r.rating)),
        name: user.name,
        tab,
        tabs: TerminalTab::ALL,
        tasks: tasks
            .iter()
            .filter(|b| tab.lists(b.status))
            .map(TaskCard::from)
            .collect(),
        audits: reviews.iter().map(AuditCard::from).collect(),
    }
    .into_response()
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

/// Accept, reject, or complete a booking.
#[instrument(skip(area, form), fields(user_id = %area.user.id, status = %form.status))]
pub async fn update_status(
    area: RequireArea<HelperArea>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    let session = area.fetch.session().clone();

    let Ok(action) = form.status.parse::<HelperAction>() else {
        return redirect_with(&session, Flash::error("ACTION FAILED."), "/helper").await;
    };
    let status = action.target_status();

    match area
        .fetch
        .update_booking_status(&BookingId::new(id.as_str()), status)
        .await
    {
        Ok(Some(())) => {
            add_breadcrumb("booking", "Status changed", Some(&[("status", status.as_str())]));
            tracing::info!(booking_id = %id, status = %status, "Booking status updated");
            Redirect::to("/helper").into_response()
        }
        Ok(None) => signed_out(),
        Err(e) => {
            tracing::warn!(booking_id = %id, error = %e, "Booking status update failed");
            let text = e.banner("ACTION FAILED.", "ACTION FAILED.");
            redirect_with(&session, Flash::error(text), "/helper").await
        }
    }
}
