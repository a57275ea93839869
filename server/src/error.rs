//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gatherly_auth::AuthError;
use gatherly_core::Error;
use serde_json::json;

/// An error response: a status code and a client-facing message.
///
/// Every error body has the same shape, `{"message": "..."}`. Internal
/// failures are logged with their detail but surfaced as a generic 500;
/// the database error text never reaches a client.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    /// Build an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401 with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 403 with the given message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// 404 with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Generic 500. The detail goes to the log, not the client.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match &err {
            Error::Validation(_)
            | Error::DuplicateEmail
            | Error::AlreadyRegistered
            | Error::CapacityReached => Self::bad_request(err.to_string()),
            Error::NotFound { .. } => Self::not_found(err.to_string()),
            Error::Unauthorized(_) => Self::unauthorized(err.to_string()),
            Error::Forbidden(_) => Self::forbidden(err.to_string()),
            Error::Database(detail) => Self::internal(detail),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired | AuthError::TokenInvalid => {
                Self::unauthorized("Not authorized, token failed")
            }
            AuthError::Hash(detail) => Self::internal(detail),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (Error::validation("bad"), StatusCode::BAD_REQUEST),
            (Error::DuplicateEmail, StatusCode::BAD_REQUEST),
            (Error::AlreadyRegistered, StatusCode::BAD_REQUEST),
            (Error::CapacityReached, StatusCode::BAD_REQUEST),
            (Error::not_found("Event"), StatusCode::NOT_FOUND),
            (
                Error::Unauthorized("nope".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (Error::forbidden("nope"), StatusCode::FORBIDDEN),
            (
                Error::database("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn token_failures_are_unauthorized() {
        assert_eq!(
            AppError::from(AuthError::TokenExpired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::TokenInvalid).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
