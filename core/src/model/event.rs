//! Events, their creation input and partial updates.

use crate::error::{Error, Result};
use crate::model::user::UserSummary;
use crate::types::{EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event as persisted.
///
/// There is no stored attendee list: attendance is derived from the
/// confirmed registration records, so the capacity invariant has a single
/// source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Where the event takes place.
    pub location: String,
    /// Maximum simultaneous confirmed registrations. Always >= 1.
    pub capacity: i32,
    /// The admin who created the event.
    pub organizer_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Where the event takes place.
    pub location: String,
    /// Maximum simultaneous confirmed registrations.
    pub capacity: i32,
    /// The admin creating the event.
    pub organizer_id: UserId,
}

impl NewEvent {
    /// Validate the event fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a textual field is blank or the
    /// capacity is below 1.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.location.trim().is_empty()
        {
            return Err(Error::validation("Please fill all required fields"));
        }
        if self.capacity < 1 {
            return Err(Error::validation("Capacity must be at least 1"));
        }
        Ok(())
    }
}

/// Partial update for an event.
///
/// A field absent from the request payload stays `None` and is left
/// unchanged; a field that is present is applied, including empty strings.
/// Absent and empty are distinct on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    /// New title, if provided.
    pub title: Option<String>,
    /// New description, if provided.
    pub description: Option<String>,
    /// New date, if provided.
    pub date: Option<DateTime<Utc>>,
    /// New location, if provided.
    pub location: Option<String>,
    /// New capacity, if provided.
    pub capacity: Option<i32>,
}

impl EventPatch {
    /// Validate the provided fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a capacity below 1 is provided.
    pub fn validate(&self) -> Result<()> {
        if matches!(self.capacity, Some(capacity) if capacity < 1) {
            return Err(Error::validation("Capacity must be at least 1"));
        }
        Ok(())
    }

    /// Apply the provided fields to an event in place.
    pub fn apply(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
    }
}

/// Read model for an event: the entity plus its organizer identity and the
/// derived attendee count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    /// Event identifier.
    pub id: EventId,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Where the event takes place.
    pub location: String,
    /// Maximum simultaneous confirmed registrations.
    pub capacity: i32,
    /// Organizer identity (name/email only).
    pub organizer: UserSummary,
    /// Number of confirmed registrations, derived by query.
    pub registered: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Event fields embedded in a registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Event identifier.
    pub id: EventId,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Where the event takes place.
    pub location: String,
    /// Maximum simultaneous confirmed registrations.
    pub capacity: i32,
}
