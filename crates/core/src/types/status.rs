//! Status enums for bookings and helper applications.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a status string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Lifecycle of a booking request.
///
/// ```text
/// pending ──accept──▶ accepted ──complete──▶ completed
///    │
///    └──reject──▶ rejected          (cancelled is set by the backend)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a client still sees this booking under "active".
    ///
    /// Rejected requests stay active for the client; only completed and
    /// cancelled bookings move to history.
    #[must_use]
    pub const fn is_active_for_client(self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a helper still sees this booking under "incoming".
    #[must_use]
    pub const fn is_incoming_for_helper(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Actions a helper may take on a booking in this status.
    #[must_use]
    pub const fn helper_actions(self) -> &'static [HelperAction] {
        match self {
            Self::Pending => &[HelperAction::Accept, HelperAction::Reject],
            Self::Accepted => &[HelperAction::Complete],
            Self::Rejected | Self::Completed | Self::Cancelled => &[],
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError::new("booking status", s)),
        }
    }
}

/// A status transition a helper can request on one of their bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperAction {
    Accept,
    Reject,
    Complete,
}

impl HelperAction {
    /// The status the booking moves to.
    #[must_use]
    pub const fn target_status(self) -> BookingStatus {
        match self {
            Self::Accept => BookingStatus::Accepted,
            Self::Reject => BookingStatus::Rejected,
            Self::Complete => BookingStatus::Completed,
        }
    }
}

impl std::str::FromStr for HelperAction {
    type Err = ParseStatusError;

    /// Parses the target status name submitted by the helper terminal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Self::Accept),
            "rejected" => Ok(Self::Reject),
            "completed" => Ok(Self::Complete),
            _ => Err(ParseStatusError::new("helper action", s)),
        }
    }
}

/// State of a client's application to become a helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::str::FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseStatusError::new("application status", s)),
        }
    }
}

/// Admin decision on a helper's verification.
///
/// Revoking a verified helper is sent as `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationDecision {
    Approved,
    Rejected,
}

impl VerificationDecision {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for VerificationDecision {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseStatusError::new("verification decision", s)),
        }
    }
}
