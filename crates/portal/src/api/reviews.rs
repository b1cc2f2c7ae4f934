//! `/api/reviews/*` endpoints.

use serde::Serialize;
use serde::de::IgnoredAny;
use serde_json::Value;
use silver_connect_core::{BookingId, Rating, ReviewId, UserId};

use super::types::{Review, list_from_value};
use super::{ApiError, SecureFetch};

/// A review as submitted by a client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// Helper id taken from the booking.
    pub helper: String,
    pub booking: BookingId,
    pub rating: Rating,
    pub review_text: String,
}

impl SecureFetch {
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn add_review(&self, review: &NewReview) -> Result<Option<()>, ApiError> {
        let answer: Option<IgnoredAny> = self.post("/api/reviews/add", review).await?;
        Ok(answer.map(|_| ()))
    }

    /// Reviews written by the signed-in client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn my_reviews(&self) -> Result<Option<Vec<Review>>, ApiError> {
        let body: Option<Value> = self.get("/api/reviews/my-reviews").await?;
        Ok(body.map(list_from_value))
    }

    /// Reviews written about a helper.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn helper_reviews(&self, helper: &UserId) -> Result<Option<Vec<Review>>, ApiError> {
        let path = format!("/api/reviews/helper/{}", urlencoding::encode(helper.as_str()));
        let body: Option<Value> = self.get(&path).await?;
        Ok(body.map(list_from_value))
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn delete_review(&self, id: &ReviewId) -> Result<Option<()>, ApiError> {
        let path = format!("/api/reviews/{}", urlencoding::encode(id.as_str()));
        let answer: Option<IgnoredAny> = self.delete(&path).await?;
        Ok(answer.map(|_| ()))
    }
}
