//! Registration records: the authoritative link between users and events.

use crate::model::event::EventSummary;
use crate::model::user::UserSummary;
use crate::types::{EventId, RegistrationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a registration.
///
/// Registrations are created `Confirmed`; the other variants exist for wire
/// compatibility with clients of the original API. Cancellation is a hard
/// delete, not a transition to `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Awaiting confirmation (not produced by this implementation).
    Pending,
    /// Holding a capacity slot.
    Confirmed,
    /// Cancelled (not produced by this implementation).
    Cancelled,
}

impl RegistrationStatus {
    /// Canonical lowercase name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a status from its canonical lowercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registration record: one user attending one event.
///
/// At most one live record exists per (user, event) pair; the store layer
/// enforces this with a uniqueness constraint, not just a read-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Registration identifier.
    pub id: RegistrationId,
    /// The attending user.
    pub user_id: UserId,
    /// The attended event.
    pub event_id: EventId,
    /// Lifecycle status; `Confirmed` at creation.
    pub status: RegistrationStatus,
    /// When the user registered.
    pub registration_date: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Read model for a registration, joined with its user and event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDetail {
    /// Registration identifier.
    pub id: RegistrationId,
    /// Lifecycle status.
    pub status: RegistrationStatus,
    /// When the user registered.
    pub registration_date: DateTime<Utc>,
    /// The attending user (name/email only).
    pub user: UserSummary,
    /// The attended event.
    pub event: EventSummary,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_canonical_name() {
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::Confirmed,
            RegistrationStatus::Cancelled,
        ] {
            assert_eq!(RegistrationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RegistrationStatus::parse("waitlisted"), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&RegistrationStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
    }
}
