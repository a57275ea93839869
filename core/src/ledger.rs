//! The registration ledger: domain operations over registration records.
//!
//! The ledger owns the authorization rule for cancellation and delegates
//! the capacity and duplicate invariants to the store, where they can be
//! enforced under a real serialization boundary.

use crate::error::{Error, Result};
use crate::model::{Registration, RegistrationDetail, User};
use crate::store::{EventStore, RegistrationStore};
use crate::types::{EventId, RegistrationId, UserId};
use std::sync::Arc;

/// Domain service for registering users to events and cancelling those
/// registrations.
#[derive(Clone)]
pub struct RegistrationLedger {
    events: Arc<dyn EventStore>,
    registrations: Arc<dyn RegistrationStore>,
}

impl RegistrationLedger {
    /// Build a ledger over the given stores.
    #[must_use]
    pub fn new(events: Arc<dyn EventStore>, registrations: Arc<dyn RegistrationStore>) -> Self {
        Self {
            events,
            registrations,
        }
    }

    /// Register a user for an event, creating a confirmed registration.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the event does not exist.
    /// - [`Error::AlreadyRegistered`] if the user already holds a live
    ///   registration for this event.
    /// - [`Error::CapacityReached`] if the event is full.
    pub async fn register(&self, user_id: UserId, event_id: EventId) -> Result<Registration> {
        // The store re-checks existence inside its transaction; this read
        // only produces the 404 before any write is attempted.
        if self.events.get(event_id).await?.is_none() {
            return Err(Error::not_found("Event"));
        }
        let registration = self.registrations.create_confirmed(user_id, event_id).await?;
        tracing::info!(
            registration_id = %registration.id,
            user_id = %user_id,
            event_id = %event_id,
            "registration created"
        );
        Ok(registration)
    }

    /// The registrations held by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn my_registrations(&self, user_id: UserId) -> Result<Vec<RegistrationDetail>> {
        self.registrations.for_user(user_id).await
    }

    /// Every registration in the system, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_all(&self) -> Result<Vec<RegistrationDetail>> {
        self.registrations.all().await
    }

    /// Cancel a registration, freeing its capacity slot immediately.
    ///
    /// The requester must own the registration or be an admin.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the registration does not exist.
    /// - [`Error::Forbidden`] if the requester neither owns the
    ///   registration nor is an admin.
    pub async fn cancel(&self, id: RegistrationId, requester: &User) -> Result<()> {
        let Some(registration) = self.registrations.find(id).await? else {
            return Err(Error::not_found("Registration"));
        };

        if registration.user_id != requester.id && !requester.role.is_admin() {
            return Err(Error::forbidden(
                "Not authorized to cancel this registration",
            ));
        }

        if !self.registrations.delete(id).await? {
            return Err(Error::not_found("Registration"));
        }
        tracing::info!(
            registration_id = %id,
            cancelled_by = %requester.id,
            "registration cancelled"
        );
        Ok(())
    }
}
