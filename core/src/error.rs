//! Error taxonomy for domain operations.

use std::fmt;
use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every business-rule violation the API can surface.
///
/// The HTTP layer maps these onto status codes: the 400 family
/// (`Validation`, `DuplicateEmail`, `AlreadyRegistered`, `CapacityReached`),
/// 401 (`Unauthorized`), 403 (`Forbidden`), 404 (`NotFound`) and 500
/// (`Database`). None of these are transient; there are no retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// A user with this email already exists.
    #[error("User already exists")]
    DuplicateEmail,

    /// The named resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Resource kind, e.g. "Event" or "Registration"
        resource: &'static str,
    },

    /// The (user, event) pair already holds a live registration.
    #[error("You are already registered for this event")]
    AlreadyRegistered,

    /// The event's confirmed registrations are at capacity.
    #[error("Event capacity reached")]
    CapacityReached,

    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed to do this.
    #[error("{0}")]
    Forbidden(String),

    /// The backing store failed. Surfaced to clients as a generic 500.
    #[error("database error: {0}")]
    Database(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for the given resource kind.
    #[must_use]
    pub const fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a database error.
    pub fn database(message: impl fmt::Display) -> Self {
        Self::Database(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_messages() {
        assert_eq!(Error::DuplicateEmail.to_string(), "User already exists");
        assert_eq!(
            Error::AlreadyRegistered.to_string(),
            "You are already registered for this event"
        );
        assert_eq!(Error::CapacityReached.to_string(), "Event capacity reached");
        assert_eq!(Error::not_found("Event").to_string(), "Event not found");
    }
}
