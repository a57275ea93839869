//! Domain model and registration consistency core for Gatherly.
//!
//! This crate holds everything the HTTP and storage layers agree on:
//!
//! - **Domain types** ([`model`]): users, events, registrations and their
//!   read models.
//! - **Error taxonomy** ([`error`]): every business-rule violation the API
//!   can surface.
//! - **Store traits** ([`store`]): the seams between the domain and the
//!   backing database. Implementations must provide serializable uniqueness
//!   and capacity enforcement; see the trait docs for the exact contracts.
//! - **Registration Ledger** ([`ledger`]): the consistency core. It keeps
//!   at-most-one live registration per (user, event) and never lets an
//!   event's confirmed attendance exceed its capacity. Attendance is a
//!   projection derived from registration records, so there is no second
//!   writable attendee list to drift out of sync.
//! - **In-memory stores** ([`memory`], behind the default `test-utils`
//!   feature): a single-mutex implementation of all three store traits,
//!   used by unit and router-level tests.

pub mod error;
pub mod ledger;
pub mod model;
pub mod store;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod memory;

pub use error::{Error, Result};
pub use ledger::RegistrationLedger;
pub use types::{EventId, RegistrationId, UserId};
