//! Public registry reads: verified helpers and helper profiles.

use std::sync::Arc;

use serde_json::Value;
use silver_connect_core::UserId;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{MemberProfile, ProfileEnvelope, list_from_value};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// All verified helpers, cached for a minute.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend cannot be reached or refuses.
    #[instrument(skip(self))]
    pub async fn verified_helpers(&self) -> Result<Arc<Vec<MemberProfile>>, ApiError> {
        if let Some(CacheValue::Helpers(helpers)) =
            self.inner.cache.get(&CacheKey::VerifiedHelpers).await
        {
            debug!("Cache hit for verified helpers");
            return Ok(helpers);
        }

        let body: Value = self.get_json("/api/auth/verified-helpers").await?;
        let helpers = Arc::new(list_from_value::<MemberProfile>(body));

        self.inner
            .cache
            .insert(CacheKey::VerifiedHelpers, CacheValue::Helpers(Arc::clone(&helpers)))
            .await;

        Ok(helpers)
    }

    /// A helper's full profile. `Ok(None)` when the backend reports no such
    /// specialist.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend cannot be reached or answers with
    /// something other than the profile envelope.
    #[instrument(skip(self), fields(helper_id = %id))]
    pub async fn helper_profile(&self, id: &UserId) -> Result<Option<MemberProfile>, ApiError> {
        let key = CacheKey::HelperProfile(id.clone());
        if let Some(CacheValue::Profile(profile)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for helper profile");
            return Ok(Some(*profile));
        }

        let path = format!("/api/helpers/profile/{}", urlencoding::encode(id.as_str()));
        let envelope: ProfileEnvelope = match self.get_json(&path).await {
            Ok(envelope) => envelope,
            Err(ApiError::Rejected { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let Some(profile) = envelope.data.filter(|_| envelope.success) else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(key, CacheValue::Profile(Box::new(profile.clone())))
            .await;

        Ok(Some(profile))
    }
}
