//! Shared application state.

use gatherly_auth::TokenService;
use gatherly_core::store::{EventStore, RegistrationStore, UserStore};
use gatherly_core::RegistrationLedger;
use std::sync::Arc;

/// Everything the handlers need, cloned per request.
///
/// Stores are trait objects so the router can run over PostgreSQL in
/// production and over the in-memory store in tests, with no handler
/// changes.
#[derive(Clone)]
pub struct AppState {
    /// User account store.
    pub users: Arc<dyn UserStore>,
    /// Event store.
    pub events: Arc<dyn EventStore>,
    /// Registration store.
    pub registrations: Arc<dyn RegistrationStore>,
    /// Registration domain service.
    pub ledger: RegistrationLedger,
    /// Token issuance and verification.
    pub tokens: TokenService,
}

impl AppState {
    /// Assemble state over a set of stores.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        registrations: Arc<dyn RegistrationStore>,
        tokens: TokenService,
    ) -> Self {
        let ledger = RegistrationLedger::new(events.clone(), registrations.clone());
        Self {
            users,
            events,
            registrations,
            ledger,
            tokens,
        }
    }
}
