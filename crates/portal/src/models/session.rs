//! Session-held authentication state.
//!
//! The portal keeps exactly two authentication keys in the session, `user`
//! (the account JSON the backend returned) and `token` (its bearer JWT).
//! Every request restores them through [`restore`], which ends the session
//! as soon as the token's `exp` claim has passed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use silver_connect_core::{ApplicationStatus, BearerToken, Landing, Role, UserId};
use tower_sessions::Session;

use crate::api::types::{lenient_status, lenient_string};
use crate::error::{clear_sentry_user, set_sentry_user};

/// Session keys for authentication data.
pub mod keys {
    /// Account JSON as returned by the backend.
    pub const USER: &str = "user";

    /// Bearer JWT issued by the backend.
    pub const TOKEN: &str = "token";

    /// One-shot banner message.
    pub const FLASH: &str = "flash";
}

/// The signed-in account.
///
/// Fields the portal does not model are kept in `extra` so that merging a
/// profile update never drops data the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
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
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub experience: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub specialty: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_area: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bio: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub google_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub application_status: Option<ApplicationStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    /// Where this account belongs after sign-in.
    #[must_use]
    pub const fn landing(&self) -> Landing {
        Landing::for_account(self.role, self.is_verified)
    }

    /// Professional statement, preferring `summary` over the older `bio`.
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        self.summary.as_deref().or(self.bio.as_deref())
    }
}

/// An authenticated session restored from storage.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub user: SessionUser,
    pub token: BearerToken,
}

/// Result of restoring the session at the start of a request.
#[derive(Debug)]
pub enum Restored {
    /// A live user/token pair.
    Active(ActiveSession),
    /// Nothing stored (or only half of the pair).
    Anonymous,
    /// A stored pair whose token has expired or cannot be read. The session
    /// has already been cleared.
    Expired,
}

/// Store a freshly issued user/token pair.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn establish(
    session: &Session,
    user: &SessionUser,
    token: &BearerToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::USER, user).await?;
    session.insert(keys::TOKEN, token).await?;
    set_sentry_user(&user.id, Some(&user.email));
    tracing::info!(user_id = %user.id, role = %user.role, "Session established");
    Ok(())
}

/// Replace the stored user, keeping the token.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn update_user(
    session: &Session,
    user: &SessionUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::USER, user).await
}

/// Restore the user/token pair, ending the session if the token expired.
///
/// A stored user that no longer decodes is treated like an expired token.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn restore(
    session: &Session,
    now: DateTime<Utc>,
) -> Result<Restored, tower_sessions::session::Error> {
    let token: Option<BearerToken> = session.get(keys::TOKEN).await?;
    let raw_user: Option<Value> = session.get(keys::USER).await?;

    let (Some(token), Some(raw_user)) = (token, raw_user) else {
        return Ok(Restored::Anonymous);
    };

    let user = match serde_json::from_value::<SessionUser>(raw_user) {
        Ok(user) if !token.is_expired_at(now) => user,
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Session token expired, signing out");
            end(session).await?;
            return Ok(Restored::Expired);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stored user is unreadable, signing out");
            end(session).await?;
            return Ok(Restored::Expired);
        }
    };

    Ok(Restored::Active(ActiveSession { user, token }))
}

/// Clear the stored user/token pair.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn end(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(keys::USER).await?;
    session.remove_value(keys::TOKEN).await?;
    clear_sentry_user();
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::Duration;
    use serde_json::json;
    use tower_sessions::MemoryStore;

    use super::*;

    fn memory_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn jwt_expiring(at: DateTime<Utc>) -> BearerToken {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        let body = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"u1","exp":{}}}"#, at.timestamp()));
        BearerToken::new(format!("{header}.{body}.sig"))
    }

    fn client_user() -> SessionUser {
        serde_json::from_value(json!({
            "_id": "65f0c1a2b3d4e5f6a7b8c9d0",
            "name": "Kamala Devi",
            "email": "kamala@example.in",
            "role": "user",
            "isVerified": false,
            "createdAt": "2025-01-04T10:00:00.000Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_session_user_keeps_unknown_fields() {
        let user = client_user();
        assert_eq!(user.extra.get("createdAt"), Some(&json!("2025-01-04T10:00:00.000Z")));

        let round_trip = serde_json::to_value(&user).unwrap();
        assert_eq!(round_trip["createdAt"], json!("2025-01-04T10:00:00.000Z"));
        assert_eq!(round_trip["isVerified"], json!(false));
        assert!(round_trip.get("phone").is_none());
    }

    #[test]
    fn test_session_user_landing() {
        let mut user = client_user();
        assert_eq!(user.landing(), Landing::ClientDashboard);

        user.role = Role::Helper;
        assert_eq!(user.landing(), Landing::ClientDashboard);
        user.is_verified = true;
        assert_eq!(user.landing(), Landing::HelperTerminal);

        user.role = Role::Admin;
        assert_eq!(user.landing(), Landing::AdminTerminal);
    }

    #[tokio::test]
    async fn test_restore_live_session() {
        let session = memory_session();
        let now = Utc::now();
        establish(&session, &client_user(), &jwt_expiring(now + Duration::hours(2)))
            .await
            .unwrap();

        let restored = restore(&session, now).await.unwrap();
        let Restored::Active(active) = restored else {
            panic!("expected an active session, got {restored:?}");
        };
        assert_eq!(active.user.name, "Kamala Devi");
    }

    #[tokio::test]
    async fn test_restore_expired_token_clears_session() {
        let session = memory_session();
        let now = Utc::now();
        establish(&session, &client_user(), &jwt_expiring(now - Duration::minutes(1)))
            .await
            .unwrap();

        assert!(matches!(restore(&session, now).await.unwrap(), Restored::Expired));
        assert!(session.get::<Value>(keys::USER).await.unwrap().is_none());
        assert!(session.get::<Value>(keys::TOKEN).await.unwrap().is_none());
        assert!(matches!(restore(&session, now).await.unwrap(), Restored::Anonymous));
    }

    #[tokio::test]
    async fn test_restore_undecodable_token_clears_session() {
        let session = memory_session();
        establish(&session, &client_user(), &BearerToken::new("garbage"))
            .await
            .unwrap();

        assert!(matches!(restore(&session, Utc::now()).await.unwrap(), Restored::Expired));
        assert!(session.get::<Value>(keys::USER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_requires_both_keys() {
        let session = memory_session();
        session.insert(keys::USER, client_user()).await.unwrap();
        assert!(matches!(restore(&session, Utc::now()).await.unwrap(), Restored::Anonymous));
    }

    #[tokio::test]
    async fn test_end_clears_pair_but_keeps_session_usable() {
        let session = memory_session();
        establish(&session, &client_user(), &jwt_expiring(Utc::now() + Duration::hours(1)))
            .await
            .unwrap();

        end(&session).await.unwrap();
        session.insert(keys::FLASH, "bye").await.unwrap();

        assert!(session.get::<Value>(keys::TOKEN).await.unwrap().is_none());
        assert_eq!(session.get::<String>(keys::FLASH).await.unwrap().as_deref(), Some("bye"));
    }
}
