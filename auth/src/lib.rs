//! Authentication primitives for Gatherly.
//!
//! Two independent concerns live here:
//!
//! - **Password hashing** ([`password`]): Argon2id with a per-password
//!   random salt, verified in constant time. Raw passwords never leave
//!   this module's call frames.
//! - **Bearer tokens** ([`token`]): stateless HS256 JWTs carrying the user
//!   id, issued with a configurable expiry. Verification checks signature
//!   and expiry only; the HTTP layer resolves the subject against the user
//!   store afterwards, so deleted accounts fail closed.

pub mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use token::TokenService;
