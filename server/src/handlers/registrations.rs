//! Registration endpoints, backed by the registration ledger.

use crate::error::AppError;
use crate::extract::{CurrentUser, RequireAdmin};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gatherly_core::model::{Registration, RegistrationDetail};
use gatherly_core::{EventId, RegistrationId};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForEventRequest {
    event_id: Option<EventId>,
}

/// `POST /api/registrations`
///
/// # Errors
///
/// 400 for a missing event id, a duplicate registration or a full event;
/// 404 for an unknown event.
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<RegisterForEventRequest>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let Some(event_id) = body.event_id else {
        return Err(AppError::bad_request("Event ID is required"));
    };
    let registration = state.ledger.register(user.id, event_id).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// `GET /api/registrations/myregistrations`
///
/// # Errors
///
/// 500 if the store fails.
pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<RegistrationDetail>>, AppError> {
    Ok(Json(state.ledger.my_registrations(user.id).await?))
}

/// `GET /api/registrations/all` (admin)
///
/// # Errors
///
/// 500 if the store fails.
pub async fn all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<RegistrationDetail>>, AppError> {
    Ok(Json(state.ledger.list_all().await?))
}

/// `DELETE /api/registrations/:id`
///
/// Owners cancel their own registrations; admins can cancel anyone's.
/// Cancellation frees the capacity slot immediately.
///
/// # Errors
///
/// 403 when the caller neither owns the registration nor is an admin;
/// 404 for an unknown registration.
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<RegistrationId>,
) -> Result<Json<Value>, AppError> {
    state.ledger.cancel(id, &user).await?;
    Ok(Json(json!({ "message": "Registration cancelled successfully" })))
}
