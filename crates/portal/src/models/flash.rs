//! One-shot banner messages carried across a redirect.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session::keys;

/// Banner tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A banner shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

impl Flash {
    /// A success banner, shown as given.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            text: text.into(),
        }
    }

    /// An error banner. Error text is always shown uppercased.
    #[must_use]
    pub fn error(text: impl AsRef<str>) -> Self {
        Self {
            kind: FlashKind::Error,
            text: text.as_ref().to_uppercase(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == FlashKind::Success
    }

    /// Queue this banner for the next page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn push(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::FLASH, self).await
    }

    /// Remove and return the queued banner, if any.
    ///
    /// A banner that cannot be read is dropped.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove(keys::FLASH).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable flash message");
            None
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[test]
    fn test_error_text_is_uppercased() {
        let flash = Flash::error("Invalid credentials");
        assert_eq!(flash.text, "INVALID CREDENTIALS");
        assert!(!flash.is_success());
    }

    #[test]
    fn test_success_text_is_kept() {
        let flash = Flash::success("Message received.");
        assert_eq!(flash.text, "Message received.");
        assert!(flash.is_success());
    }

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        Flash::success("ACCESS RESTORED").push(&session).await.unwrap();

        assert_eq!(
            Flash::take(&session).await,
            Some(Flash::success("ACCESS RESTORED"))
        );
        assert_eq!(Flash::take(&session).await, None);
    }
}
