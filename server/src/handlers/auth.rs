//! Registration and login.
//!
//! Request fields are `Option` so a missing field is a clean 400 with the
//! canonical message instead of a framework-shaped deserialization error.

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gatherly_auth::{hash_password, verify_password};
use gatherly_core::model::{NewUser, Role};
use gatherly_core::UserId;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<Role>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// The authenticated-user payload: the account plus a fresh token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    id: UserId,
    name: String,
    email: String,
    role: Role,
    token: String,
}

/// `POST /api/auth/register`
///
/// # Errors
///
/// 400 for missing or invalid fields and duplicate emails.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let (Some(name), Some(email), Some(password)) = (body.name, body.email, body.password) else {
        return Err(AppError::bad_request("Please fill all required fields"));
    };
    if password.is_empty() {
        return Err(AppError::bad_request("Please fill all required fields"));
    }

    let new_user = NewUser {
        name,
        email,
        password_hash: hash_password(&password)?,
        role: body.role.unwrap_or_default(),
    };
    new_user.validate()?;

    let user = state.users.create(new_user).await?;
    let token = state.tokens.issue(user.id)?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
        }),
    ))
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// 400 for missing fields; 401 for an unknown email or wrong password,
/// with an identical message for both so accounts cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::bad_request("Please fill all required fields"));
    };

    let Some(stored) = state.users.find_by_email(&email).await? else {
        return Err(AppError::unauthorized("Invalid email or password"));
    };
    if !verify_password(&password, &stored.password_hash)? {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let user = stored.user;
    let token = state.tokens.issue(user.id)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        token,
    }))
}
