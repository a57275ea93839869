//! User accounts and roles.

use crate::error::{Error, Result};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access role for a user account.
///
/// Roles are a closed two-variant enum; the role check happens once at the
/// authentication boundary, never by string comparison in handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular attendee. Can register for events and cancel their own
    /// registrations.
    User,
    /// Administrator. Can additionally manage events, list every
    /// registration and cancel anyone's registration.
    Admin,
}

impl Role {
    /// Whether this role carries administrative privileges.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Canonical lowercase name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse a role from its canonical lowercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account, as exposed to the rest of the system.
///
/// The password hash is deliberately absent: everything outside the login
/// flow works with this projection. Identity is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique across all accounts.
    pub email: String,
    /// Access role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name/email projection used when embedding a user in another payload.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// A user together with their password hash.
///
/// Only the login flow sees this; it never crosses the HTTP boundary.
#[derive(Debug, Clone)]
pub struct StoredUser {
    /// The account projection.
    pub user: User,
    /// Salted one-way hash of the password. Never the raw password.
    pub password_hash: String,
}

/// Input for creating a user account.
///
/// Carries the already-computed password hash; raw passwords never reach
/// the store layer.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address; must be unique.
    pub email: String,
    /// Salted one-way hash of the password.
    pub password_hash: String,
    /// Access role.
    pub role: Role,
}

impl NewUser {
    /// Validate the account fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is blank or the email is
    /// not a plausible address.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Please fill all required fields"));
        }
        if !is_valid_email(&self.email) {
            return Err(Error::validation("Invalid email address"));
        }
        Ok(())
    }
}

/// Identity reference embedded in event and registration payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Validate an email address format.
///
/// Basic structural validation: exactly one `@`, non-empty local and domain
/// parts, a dotted domain, and a sane overall length.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return false;
    }

    let local_ok = local
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'));
    let domain_ok = domain
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-'));

    local_ok && domain_ok && domain.split('.').all(|part| !part.is_empty())
}
