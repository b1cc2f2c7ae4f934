//! Admin endpoints: member lists, helper verification, all bookings, inbox.

use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use silver_connect_core::{UserId, VerificationDecision};

use super::types::{Booking, ContactMessage, MemberProfile, list_from_value};
use super::{ApiError, SecureFetch};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyHelper<'a> {
    user_id: &'a UserId,
    status: VerificationDecision,
}

impl SecureFetch {
    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Option<Vec<T>>, ApiError> {
        let body: Option<Value> = self.get(path).await?;
        Ok(body.map(list_from_value))
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn all_users(&self) -> Result<Option<Vec<MemberProfile>>, ApiError> {
        self.list("/api/auth/admin/users").await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn pending_helpers(&self) -> Result<Option<Vec<MemberProfile>>, ApiError> {
        self.list("/api/auth/admin/pending-helpers").await
    }

    /// Verified helpers, fetched fresh rather than from the registry cache.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn verified_helpers_fresh(&self) -> Result<Option<Vec<MemberProfile>>, ApiError> {
        self.list("/api/auth/verified-helpers").await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn contact_messages(&self) -> Result<Option<Vec<ContactMessage>>, ApiError> {
        self.list("/api/contact").await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn all_bookings(&self) -> Result<Option<Vec<Booking>>, ApiError> {
        self.list("/api/admin/all-bookings").await
    }

    /// Approve or reject a helper. Revoking a verified helper is a rejection.
    ///
    /// Clears the registry cache on success.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn verify_helper(
        &self,
        user_id: &UserId,
        status: VerificationDecision,
    ) -> Result<Option<()>, ApiError> {
        let answer: Option<IgnoredAny> = self
            .post(
                "/api/auth/admin/verify-helper",
                &VerifyHelper { user_id, status },
            )
            .await?;

        if answer.is_some() {
            self.api().invalidate_registry().await;
        }
        Ok(answer.map(|_| ()))
    }
}
