//! Records returned by the backend.
//!
//! The backend is loose about shapes: references may arrive as a bare id or
//! as a populated object, numeric fields sometimes arrive as strings, and
//! list endpoints answer either `[...]` or `{ "data": [...] }`. The types
//! here absorb those differences so handlers see one shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use silver_connect_core::{
    ApplicationStatus, BookingId, BookingStatus, MessageId, Rating, ReviewId, Role, UserId,
};

// =============================================================================
// References
// =============================================================================

/// The populated form of a referenced user, helper, or booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A reference that is either an id string or a populated object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref {
    Id(String),
    Populated(Party),
}

impl Ref {
    /// The referenced id, whichever form the backend used.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Populated(party) => party.id.as_deref(),
        }
    }

    /// Display name, only available when populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated(party) => party.name.as_deref(),
        }
    }

    /// Email, only available when populated.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated(party) => party.email.as_deref(),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// A service request from a client to a helper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: BookingId,
    #[serde(default)]
    pub user: Option<Ref>,
    #[serde(default)]
    pub helper: Option<Ref>,
    #[serde(default)]
    pub helper_id: Option<String>,
    #[serde(default)]
    pub helper_name: String,
    #[serde(default)]
    pub helper_email: String,
    #[serde(default)]
    pub senior_name: Option<String>,
    #[serde(default)]
    pub senior_email: Option<String>,
    /// ISO date or timestamp as sent by the backend.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
}

impl Booking {
    /// Id of the helper this booking is for.
    ///
    /// Prefers the `helper` reference and falls back to `helperId`.
    #[must_use]
    pub fn helper_ref_id(&self) -> Option<&str> {
        self.helper
            .as_ref()
            .and_then(Ref::id)
            .or(self.helper_id.as_deref())
    }
}

/// A client's review of a completed booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    #[serde(default)]
    pub user: Option<Ref>,
    #[serde(default)]
    pub helper: Option<Ref>,
    #[serde(default)]
    pub booking: Option<Ref>,
    pub rating: Rating,
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Review {
    /// Whether this review was written for `booking`.
    #[must_use]
    pub fn is_for_booking(&self, booking: &BookingId) -> bool {
        self.booking.as_ref().and_then(Ref::id) == Some(booking.as_str())
    }
}

/// A member record: registry entries, admin user rows, pending applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specialty: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub work_area: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub aadhar: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub resume_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub application_status: Option<ApplicationStatus>,
}

impl MemberProfile {
    /// Professional statement, preferring `summary` over the older `bio`.
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        self.summary.as_deref().or(self.bio.as_deref())
    }

    /// Case-insensitive match on name, specialty, or work area.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            Some(self.name.as_str()),
            self.specialty.as_deref(),
            self.work_area.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// A message left through the contact form, as listed for admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(rename = "_id")]
    pub id: MessageId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Envelope used by `/api/helpers/profile/{id}`.
#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<MemberProfile>,
}

// =============================================================================
// Lenient decoding
// =============================================================================

/// Decode a list endpoint's body.
///
/// Accepts `[...]` or `{ "data": [...] }`; anything else yields an empty
/// list. Items are decoded one at a time and an item that does not decode
/// is skipped, so the rest of the list still renders.
#[must_use]
pub fn list_from_value<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .map_err(|e| tracing::warn!(error = %e, "Skipping undecodable list item"))
                .ok()
        })
        .collect()
}

/// Accept a string or a number, normalising blanks to `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept any application status string, mapping unknown values to `None`.
pub(crate) fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ApplicationStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_ref_accepts_id_or_populated() {
        let id: Ref = serde_json::from_value(json!("65f0")).unwrap();
        assert_eq!(id.id(), Some("65f0"));
        assert_eq!(id.name(), None);

        let populated: Ref =
            serde_json::from_value(json!({"_id": "65f1", "name": "Asha", "email": "a@x.in"}))
                .unwrap();
        assert_eq!(populated.id(), Some("65f1"));
        assert_eq!(populated.name(), Some("Asha"));
    }

    #[test]
    fn test_review_matches_booking_by_either_form() {
        let booking = BookingId::new("b1");
        let bare: Review = serde_json::from_value(
            json!({"_id": "r1", "booking": "b1", "rating": 4, "reviewText": "Kind"}),
        )
        .unwrap();
        let populated: Review = serde_json::from_value(
            json!({"_id": "r2", "booking": {"_id": "b1"}, "rating": 5, "reviewText": "Great"}),
        )
        .unwrap();
        let other: Review = serde_json::from_value(
            json!({"_id": "r3", "booking": "b2", "rating": 5, "reviewText": "Ok"}),
        )
        .unwrap();

        assert!(bare.is_for_booking(&booking));
        assert!(populated.is_for_booking(&booking));
        assert!(!other.is_for_booking(&booking));
    }

    #[test]
    fn test_booking_helper_id_prefers_reference() {
        let booking: Booking = serde_json::from_value(json!({
            "_id": "b1",
            "helper": {"_id": "h1", "name": "Ravi"},
            "helperId": "h-legacy",
            "helperName": "Ravi",
            "status": "completed"
        }))
        .unwrap();
        assert_eq!(booking.helper_ref_id(), Some("h1"));

        let bare: Booking =
            serde_json::from_value(json!({"_id": "b2", "helper": "h2", "status": "pending"}))
                .unwrap();
        assert_eq!(bare.helper_ref_id(), Some("h2"));
    }

    #[test]
    fn test_list_envelope_tolerance() {
        let bare: Vec<MemberProfile> =
            list_from_value(json!([{"_id": "u1", "name": "Asha", "email": "a@x.in"}]));
        assert_eq!(bare.len(), 1);

        let wrapped: Vec<MemberProfile> =
            list_from_value(json!({"data": [{"_id": "u1"}, {"_id": "u2"}]}));
        assert_eq!(wrapped.len(), 2);

        let odd: Vec<MemberProfile> = list_from_value(json!({"data": "nope"}));
        assert!(odd.is_empty());

        let scalar: Vec<MemberProfile> = list_from_value(json!("nothing"));
        assert!(scalar.is_empty());
    }

    #[test]
    fn test_list_keeps_items_that_decode() {
        let reviews: Vec<Review> = list_from_value(json!([
            {"_id": "r1", "booking": "b1", "rating": 5, "reviewText": "Kind"},
            {"_id": "r2", "booking": "b2", "rating": "4", "reviewText": "Punctual"},
            {"_id": "r3", "booking": "b3", "rating": "often", "reviewText": "?"},
        ]));
        let ratings: Vec<u8> = reviews.iter().map(|r| r.rating.get()).collect();
        assert_eq!(ratings, vec![5, 4]);
        assert!(reviews[1].is_for_booking(&BookingId::new("b2")));

        let bookings: Vec<Booking> = list_from_value(json!({"data": [
            {"_id": "b1", "status": "pending"},
            {"_id": "b2", "status": "in-progress"},
        ]}));
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id, BookingId::new("b1"));
    }

    #[test]
    fn test_member_profile_lenient_fields() {
        let profile: MemberProfile = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Meera",
            "role": "helper",
            "experience": 7,
            "phone": "",
            "applicationStatus": "none"
        }))
        .unwrap();
        assert_eq!(profile.experience.as_deref(), Some("7"));
        assert_eq!(profile.phone, None);
        assert_eq!(profile.application_status, None);
    }

    #[test]
    fn test_registry_query_matches_name_specialty_or_area() {
        let profile: MemberProfile = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Meera Joshi",
            "specialty": "Physiotherapist",
            "workArea": "Gomti Nagar"
        }))
        .unwrap();

        assert!(profile.matches_query("meera"));
        assert!(profile.matches_query("PHYSIO"));
        assert!(profile.matches_query("gomti"));
        assert!(profile.matches_query("   "));
        assert!(!profile.matches_query("cardiology"));
    }
}
