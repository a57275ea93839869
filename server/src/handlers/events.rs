//! Event management and browsing.
//!
//! Reads are public; writes require the admin role via [`RequireAdmin`].

use crate::error::AppError;
use crate::extract::RequireAdmin;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use gatherly_core::model::{EventDetail, EventPatch, NewEvent, UserSummary};
use gatherly_core::{Error, EventId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    title: Option<String>,
    description: Option<String>,
    date: Option<DateTime<Utc>>,
    location: Option<String>,
    capacity: Option<i32>,
}

/// A single event with its attendee list.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(flatten)]
    detail: EventDetail,
    attendees: Vec<UserSummary>,
}

/// `POST /api/events` (admin)
///
/// # Errors
///
/// 400 for missing or invalid fields.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDetail>), AppError> {
    let (Some(title), Some(description), Some(date), Some(location), Some(capacity)) = (
        body.title,
        body.description,
        body.date,
        body.location,
        body.capacity,
    ) else {
        return Err(AppError::bad_request("Please fill all required fields"));
    };

    let new_event = NewEvent {
        title,
        description,
        date,
        location,
        capacity,
        organizer_id: admin.id,
    };
    new_event.validate()?;

    let detail = state.events.create(new_event).await?;
    tracing::info!(event_id = %detail.id, organizer_id = %admin.id, "event created");
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /api/events`
///
/// # Errors
///
/// 500 if the store fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<EventDetail>>, AppError> {
    Ok(Json(state.events.list().await?))
}

/// `GET /api/events/:id`
///
/// # Errors
///
/// 404 for an unknown event.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<EventResponse>, AppError> {
    let Some(detail) = state.events.get(id).await? else {
        return Err(Error::not_found("Event").into());
    };
    let attendees = state.registrations.attendees(id).await?;
    Ok(Json(EventResponse { detail, attendees }))
}

/// `PUT /api/events/:id` (admin)
///
/// Partial update: only fields present in the body change. An explicitly
/// empty string is applied; an absent field is not.
///
/// # Errors
///
/// 400 for an invalid capacity; 404 for an unknown event.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<EventId>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<EventDetail>, AppError> {
    patch.validate()?;
    let Some(detail) = state.events.update(id, patch).await? else {
        return Err(Error::not_found("Event").into());
    };
    tracing::info!(event_id = %id, "event updated");
    Ok(Json(detail))
}

/// `DELETE /api/events/:id` (admin)
///
/// Removes the event and, with it, every registration in its ledger.
///
/// # Errors
///
/// 404 for an unknown event.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<EventId>,
) -> Result<Json<Value>, AppError> {
    if !state.events.delete(id).await? {
        return Err(Error::not_found("Event").into());
    }
    tracing::info!(event_id = %id, "event removed");
    Ok(Json(json!({ "message": "Event removed" })))
}
