//! Authentication error types.

use thiserror::Error;

/// Failures from password hashing and token handling.
///
/// Token failures deliberately carry no detail beyond expired/invalid; the
/// HTTP layer collapses both onto the same 401 response so a caller cannot
/// probe which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token's expiry is in the past.
    #[error("token expired")]
    TokenExpired,

    /// The token is malformed or its signature does not verify.
    #[error("token invalid")]
    TokenInvalid,

    /// Password hashing failed. Not a wrong-password condition; that is a
    /// clean `Ok(false)` from verification.
    #[error("password hashing failed: {0}")]
    Hash(String),
}
