//! Store traits: the seams between the domain and the backing database.
//!
//! Implementations carry the serialization obligations spelled out on each
//! method. The application holds no locks of its own; a naive
//! read-then-write implementation of [`RegistrationStore::create_confirmed`]
//! is a correctness bug, not a simplification.

use crate::error::Result;
use crate::model::{
    EventDetail, EventPatch, NewEvent, NewUser, Registration, RegistrationDetail, StoredUser,
    User, UserSummary,
};
use crate::types::{EventId, RegistrationId, UserId};
use async_trait::async_trait;

/// Persistent storage for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEmail`](crate::Error::DuplicateEmail) if
    /// the email is already taken — enforced by a uniqueness constraint,
    /// not a read-check.
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Look up a user by email, including the password hash.
    ///
    /// Only the login flow should call this.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>>;

    /// Look up a user by id, without the password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;
}

/// Persistent storage for events.
///
/// All read methods return [`EventDetail`]: the event joined with its
/// organizer identity and the derived confirmed-registration count.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Create an event. The caller validates the input first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn create(&self, new_event: NewEvent) -> Result<EventDetail>;

    /// Fetch one event, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn get(&self, id: EventId) -> Result<Option<EventDetail>>;

    /// List all events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn list(&self) -> Result<Vec<EventDetail>>;

    /// Apply a partial update. Returns `None` if the id is unknown.
    ///
    /// Only fields present in the patch are touched. A capacity change is
    /// checked against the current confirmed count under the same
    /// serialization as
    /// [`RegistrationStore::create_confirmed`], so the ceiling can never
    /// drop below live attendance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if the
    /// patched capacity is below the event's confirmed registrations.
    async fn update(&self, id: EventId, patch: EventPatch) -> Result<Option<EventDetail>>;

    /// Hard-delete an event and, cascading, its registrations.
    ///
    /// Returns `false` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn delete(&self, id: EventId) -> Result<bool>;
}

/// Persistent storage for registration records.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Atomically create a confirmed registration.
    ///
    /// The duplicate check, the capacity check and the insert are one
    /// serialized unit: two concurrent calls for the same (user, event)
    /// cannot both succeed, and two concurrent calls for the last slot of
    /// an event cannot both succeed.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`](crate::Error::NotFound) if the event does not
    ///   exist.
    /// - [`Error::AlreadyRegistered`](crate::Error::AlreadyRegistered) if
    ///   the pair already holds a live registration.
    /// - [`Error::CapacityReached`](crate::Error::CapacityReached) if the
    ///   event's confirmed registrations are at capacity.
    async fn create_confirmed(&self, user_id: UserId, event_id: EventId) -> Result<Registration>;

    /// Fetch one registration, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn find(&self, id: RegistrationId) -> Result<Option<Registration>>;

    /// All registrations held by a user, joined with user and event,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn for_user(&self, user_id: UserId) -> Result<Vec<RegistrationDetail>>;

    /// Every registration in the system, joined with user and event,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn all(&self) -> Result<Vec<RegistrationDetail>>;

    /// Hard-delete a registration, freeing its capacity slot immediately.
    ///
    /// Returns `false` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn delete(&self, id: RegistrationId) -> Result<bool>;

    /// The attendee projection for an event: users holding a confirmed
    /// registration, in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn attendees(&self, event_id: EventId) -> Result<Vec<UserSummary>>;
}
