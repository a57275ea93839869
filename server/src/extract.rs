//! Authentication extractors.
//!
//! `CurrentUser` resolves the bearer token to a live account; `RequireAdmin`
//! layers the role check on top. Because the admin check only runs after
//! authentication succeeds, a missing or bad token is always a 401, never
//! a 403.

use crate::error::AppError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use gatherly_core::model::User;

/// The authenticated caller, resolved from the `Authorization` header.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let Some(token) = header.and_then(|header| header.strip_prefix("Bearer ")) else {
            return Err(AppError::unauthorized("Not authorized, no token"));
        };

        let user_id = state.tokens.verify(token)?;

        // Tokens are stateless; re-resolving the subject here makes
        // deleted accounts fail closed.
        let Some(user) = state.users.find_by_id(user_id).await.map_err(AppError::from)? else {
            return Err(AppError::unauthorized("Not authorized, user not found"));
        };
        Ok(Self(user))
    }
}

/// An authenticated caller holding the admin role.
pub struct RequireAdmin(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(AppError::forbidden("Not authorized as an admin"));
        }
        Ok(Self(user))
    }
}
