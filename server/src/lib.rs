//! HTTP API server for Gatherly.
//!
//! Route handlers stay thin: they parse input, call into the domain and
//! map [`gatherly_core::Error`] values onto HTTP responses. Authentication
//! is an extractor, authorization for event management is a second
//! extractor layered on top, and the registration rules live in the
//! [`RegistrationLedger`](gatherly_core::RegistrationLedger).

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use routes::router;
pub use state::AppState;
