//! `/api/bookings/*` endpoints.

use serde::Serialize;
use serde::de::IgnoredAny;
use serde_json::Value;
use silver_connect_core::{BookingId, BookingStatus};

use super::types::{Booking, list_from_value};
use super::{ApiError, SecureFetch};

/// A booking request as submitted by a client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub helper_id: String,
    pub helper_name: String,
    pub helper_email: String,
    pub senior_name: String,
    pub senior_email: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub phone: String,
    pub address: String,
    pub notes: String,
}

#[derive(Serialize)]
struct StatusUpdate {
    status: BookingStatus,
}

impl SecureFetch {
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Option<()>, ApiError> {
        let answer: Option<IgnoredAny> = self.post("/api/bookings/create", booking).await?;
        Ok(answer.map(|_| ()))
    }

    /// Bookings the signed-in client has requested.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn my_requests(&self) -> Result<Option<Vec<Booking>>, ApiError> {
        let body: Option<Value> = self.get("/api/bookings/my-requests").await?;
        Ok(body.map(list_from_value))
    }

    /// Bookings assigned to the signed-in helper.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn helper_tasks(&self) -> Result<Option<Vec<Booking>>, ApiError> {
        let body: Option<Value> = self.get("/api/bookings/helper-tasks").await?;
        Ok(body.map(list_from_value))
    }

    /// Move a booking to `status`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn update_booking_status(
        &self,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<Option<()>, ApiError> {
        let path = format!("/api/bookings/{}/status", urlencoding::encode(id.as_str()));
        let answer: Option<IgnoredAny> = self.patch(&path, &StatusUpdate { status }).await?;
        Ok(answer.map(|_| ()))
    }
}
