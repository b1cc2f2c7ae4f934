//! Client dashboard route handlers.
//!
//! Lists the client's bookings (active and history) and their reviews, and
//! collects a review for each completed booking.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use silver_connect_core::{BookingId, BookingStatus, Rating, ReviewId};
use tracing::instrument;

use super::{loaded, page_context, redirect_with, signed_out};
use crate::api::reviews::NewReview;
use crate::api::{Booking, Review};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{ClientArea, RequireArea};
use crate::models::{Flash, PageContext};

// =============================================================================
// Tabs & Views
// =============================================================================

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Active,
    History,
    Reviews,
}

impl DashboardTab {
    pub const ALL: [Self; 3] = [Self::Active, Self::History, Self::Reviews];

    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("history") => Self::History,
            Some("reviews") => Self::Reviews,
            _ => Self::Active,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::History => "history",
            Self::Reviews => "reviews",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active Requests",
            Self::History => "Engagement History",
            Self::Reviews => "My Audits",
        }
    }

    /// Whether a booking in `status` is listed under this tab.
    #[must_use]
    pub const fn lists(self, status: BookingStatus) -> bool {
        match self {
            Self::Active => status.is_active_for_client(),
            Self::History => !status.is_active_for_client(),
            Self::Reviews => false,
        }
    }
}

/// What a booking card offers at its foot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardFooter {
    /// Completed, not yet reviewed. Carries the helper id for the form.
    Review { helper: String },
    /// Completed and reviewed.
    AuditCompleted,
    /// Accepted by the helper.
    Deployed,
    None,
}

impl CardFooter {
    fn for_booking(booking: &Booking, reviews: &[Review]) -> Self {
        match booking.status {
            BookingStatus::Completed if reviews.iter().any(|r| r.is_for_booking(&booking.id)) => {
                Self::AuditCompleted
            }
            BookingStatus::Completed => booking
                .helper_ref_id()
                .map_or(Self::None, |helper| Self::Review {
                    helper: helper.to_string(),
                }),
            BookingStatus::Accepted => Self::Deployed,
            _ => Self::None,
        }
    }
}

/// A booking card.
#[derive(Debug, Clone)]
pub struct BookingCard {
    pub id: String,
    pub signal_ref: String,
    pub helper_name: String,
    pub status: BookingStatus,
    pub date: String,
    pub footer: CardFooter,
}

impl BookingCard {
    fn new(booking: &Booking, reviews: &[Review]) -> Self {
        Self {
            id: booking.id.to_string(),
            signal_ref: format!("LKO-{}", booking.id.short_ref()),
            helper_name: booking.helper_name.clone(),
            status: booking.status,
            date: booking.date.clone(),
            footer: CardFooter::for_booking(booking, reviews),
        }
    }
}

/// One of the client's own reviews.
#[derive(Debug, Clone)]
pub struct ReviewCard {
    pub id: String,
    pub helper_name: String,
    pub helper_email: String,
    pub stars: String,
    pub text: String,
}

impl From<&Review> for ReviewCard {
    fn from(review: &Review) -> Self {
        let helper = review.helper.as_ref();
        Self {
            id: review.id.to_string(),
            helper_name: helper
                .and_then(|h| h.name())
                .unwrap_or("Registry Specialist")
                .to_string(),
            helper_email: helper.and_then(|h| h.email()).unwrap_or_default().to_string(),
            stars: stars(review.rating),
            text: review.review_text.clone(),
        }
    }
}

/// Five stars, filled up to `rating`.
#[must_use]
pub fn stars(rating: Rating) -> String {
    (Rating::MIN..=Rating::MAX)
        .map(|i| if i <= rating.get() { '★' } else { '☆' })
        .collect()
}

/// The open review form.
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub booking: String,
    pub helper: String,
    pub helper_name: String,
    pub rating: u8,
}

impl ReviewDraft {
    /// Rating choices, highest first, with the preselected one flagged.
    #[must_use]
    pub fn choices(&self) -> Vec<RatingChoice> {
        (Rating::MIN..=Rating::MAX)
            .rev()
            .map(|value| RatingChoice {
                value,
                selected: value == self.rating,
            })
            .collect()
    }
}

/// An option of the rating select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChoice {
    pub value: u8,
    pub selected: bool,
}

// =============================================================================
// Templates
// =============================================================================

/// Client dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub tab: DashboardTab,
    pub tabs: [DashboardTab; 3],
    pub bookings: Vec<BookingCard>,
    pub reviews: Vec<ReviewCard>,
    pub draft: Option<ReviewDraft>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Query parameters for the dashboard.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
    /// Booking id whose review form is open.
    pub review: Option<String>,
}

/// Display the client dashboard.
#[instrument(skip(area), fields(user_id = %area.user.id))]
pub async fn index(area: RequireArea<ClientArea>, Query(query): Query<DashboardQuery>) -> Response {
    let RequireArea { user, fetch, .. } = area;

    let (bookings, reviews) = tokio::join!(fetch.my_requests(), fetch.my_reviews());
    let (bookings, reviews) = match (bookings, reviews) {
        (Ok(None), _) | (_, Ok(None)) => return signed_out(),
        (bookings, reviews) => (loaded("bookings", bookings), loaded("reviews", reviews)),
    };

    let tab = DashboardTab::parse(query.tab.as_deref());
    let cards: Vec<BookingCard> = bookings
        .iter()
        .filter(|b| tab.lists(b.status))
        .map(|b| BookingCard::new(b, &reviews))
        .collect();

    let draft = query.review.as_deref().and_then(|id| {
        bookings
            .iter()
            .find(|b| b.id.as_str() == id)
            .and_then(|b| match CardFooter::for_booking(b, &reviews) {
                CardFooter::Review { helper } => Some(ReviewDraft {
                    booking: b.id.to_string(),
                    helper,
                    helper_name: b.helper_name.clone(),
                    rating: Rating::default().get(),
                }),
                _ => None,
            })
    });

    DashboardTemplate {
        page: page_context(fetch.session(), Some(&user), "/dashboard").await,
        name: user.name,
        email: user.email,
        tab,
        tabs: DashboardTab::ALL,
        bookings: cards,
        reviews: reviews.iter().map(ReviewCard::from).collect(),
        draft,
    }
    .into_response()
}

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub booking: String,
    #[serde(default)]
    pub helper: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review_text: String,
}

impl ReviewForm {
    /// Guards checked before the review is sent.
    fn validate(&self) -> Result<NewReview, &'static str> {
        if self.booking.trim().is_empty() || self.helper.trim().is_empty() {
            return Err("NO ENGAGEMENT SELECTED.");
        }
        let rating = self
            .rating
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|r| Rating::new(r).ok())
            .ok_or("RATING MUST BE BETWEEN 1 AND 5.")?;
        let text = self.review_text.trim();
        if text.is_empty() {
            return Err("STATEMENT OF SERVICE REQUIRED.");
        }

        Ok(NewReview {
            helper: self.helper.trim().to_string(),
            booking: BookingId::new(self.booking.trim()),
            rating,
            review_text: text.to_string(),
        })
    }
}

/// Submit a review for a completed booking.
#[instrument(skip(area, form), fields(user_id = %area.user.id, booking = %form.booking))]
pub async fn submit_review(area: RequireArea<ClientArea>, Form(form): Form<ReviewForm>) -> Response {
    let session = area.fetch.session().clone();
    let reopen = format!(
        "/dashboard?tab=history&review={}",
        urlencoding::encode(form.booking.trim())
    );

    let review = match form.validate() {
        Ok(review) => review,
        Err(text) => return redirect_with(&session, Flash::error(text), &reopen).await,
    };

    match area.fetch.add_review(&review).await {
        Ok(Some(())) => {
            add_breadcrumb("review", "Review submitted", Some(&[("booking", review.booking.as_str())]));
            redirect_with(
                &session,
                Flash::success("✓ PERFORMANCE AUDIT LOGGED."),
                "/dashboard?tab=reviews",
            )
            .await
        }
        Ok(None) => signed_out(),
        Err(e) => {
            tracing::warn!(error = %e, "Review submission failed");
            let text = e.banner("AUDIT REJECTED.", "NETWORK ERROR.");
            redirect_with(&session, Flash::error(text), &reopen).await
        }
    }
}

/// Delete one of the client's reviews.
#[instrument(skip(area), fields(user_id = %area.user.id))]
pub async fn delete_review(area: RequireArea<ClientArea>, Path(id): Path<String>) -> Response {
    let session = area.fetch.session().clone();

    match area.fetch.delete_review(&ReviewId::new(id)).await {
        Ok(Some(())) => {
            redirect_with(
                &session,
                Flash::success("✓ REGISTRY UPDATED: REVIEW REMOVED."),
                "/dashboard?tab=reviews",
            )
            .await
        }
        Ok(None) => signed_out(),
        Err(e) => {
            tracing::warn!(error = %e, "Review deletion failed");
            let text = e.banner("DELETION DENIED.", "NETWORK ERROR.");
            redirect_with(&session, Flash::error(text), "/dashboard?tab=reviews").await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn booking(id: &str, status: &str) -> Booking {
        serde_json::from_value(json!({
            "_id": id,
            "helper": {"_id": "h1", "name": "Ravi"},
            "helperName": "Ravi",
            "date": "2026-11-02",
            "status": status
        }))
        .unwrap()
    }

    fn review_for(booking: &str) -> Review {
        serde_json::from_value(json!({
            "_id": "r1", "booking": booking, "rating": 4, "reviewText": "Kind"
        }))
        .unwrap()
    }

    fn form(rating: &str, text: &str) -> ReviewForm {
        ReviewForm {
            booking: "b1".to_string(),
            helper: "h1".to_string(),
            rating: rating.to_string(),
            review_text: text.to_string(),
        }
    }

    #[test]
    fn test_tabs_split_bookings() {
        assert!(DashboardTab::Active.lists(BookingStatus::Pending));
        assert!(DashboardTab::Active.lists(BookingStatus::Rejected));
        assert!(!DashboardTab::Active.lists(BookingStatus::Completed));
        assert!(DashboardTab::History.lists(BookingStatus::Cancelled));
        assert!(DashboardTab::History.lists(BookingStatus::Completed));
        assert_eq!(DashboardTab::parse(Some("bogus")), DashboardTab::Active);
    }

    #[test]
    fn test_completed_booking_offers_review_until_reviewed() {
        let done = booking("b1", "completed");
        assert_eq!(
            CardFooter::for_booking(&done, &[]),
            CardFooter::Review {
                helper: "h1".to_string()
            }
        );
        assert_eq!(
            CardFooter::for_booking(&done, &[review_for("b1")]),
            CardFooter::AuditCompleted
        );
        assert_eq!(
            CardFooter::for_booking(&booking("b2", "accepted"), &[]),
            CardFooter::Deployed
        );
        assert_eq!(CardFooter::for_booking(&booking("b3", "pending"), &[]), CardFooter::None);
    }

    #[test]
    fn test_booking_card_signal_ref() {
        let card = BookingCard::new(&booking("65f0c1a2b3d4e5f6a7b8c9d0", "pending"), &[]);
        assert_eq!(card.signal_ref, "LKO-B8C9D0");
    }

    #[test]
    fn test_review_requires_comment_and_rating_in_range() {
        assert!(form("4", "Punctual and kind").validate().is_ok());
        assert_eq!(form("4", "   ").validate().unwrap_err(), "STATEMENT OF SERVICE REQUIRED.");
        assert_eq!(form("0", "Fine").validate().unwrap_err(), "RATING MUST BE BETWEEN 1 AND 5.");
        assert_eq!(form("6", "Fine").validate().unwrap_err(), "RATING MUST BE BETWEEN 1 AND 5.");
        assert_eq!(form("", "Fine").validate().unwrap_err(), "RATING MUST BE BETWEEN 1 AND 5.");
    }

    #[test]
    fn test_review_card_fallback_name_and_stars() {
        let card = ReviewCard::from(&review_for("b1"));
        assert_eq!(card.helper_name, "Registry Specialist");
        assert_eq!(card.stars, "★★★★☆");
    }

    #[test]
    fn test_review_draft_preselects_rating() {
        let draft = ReviewDraft {
            booking: "b1".to_string(),
            helper: "h1".to_string(),
            helper_name: "Ravi".to_string(),
            rating: Rating::default().get(),
        };
        let choices = draft.choices();
        assert_eq!(choices.iter().map(|c| c.value).collect::<Vec<_>>(), [5, 4, 3, 2, 1]);
        assert_eq!(choices.iter().filter(|c| c.selected).count(), 1);
        assert!(choices[0].selected);
    }
}
