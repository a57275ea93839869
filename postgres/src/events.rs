//! Event persistence and the derived attendance projection.

use crate::{map_sqlx, PgStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherly_core::error::{Error, Result};
use gatherly_core::model::{EventDetail, EventPatch, NewEvent, UserSummary};
use gatherly_core::store::EventStore;
use gatherly_core::{EventId, UserId};
use sqlx::FromRow;
use uuid::Uuid;

// The detail projection: the event, its organizer and the live count of
// confirmed registrations. `registered` is computed per read; there is no
// stored counter to drift.
const DETAIL_SELECT: &str = "\
    SELECT e.id, e.title, e.description, e.date, e.location, e.capacity, \
           e.organizer_id, u.name AS organizer_name, u.email AS organizer_email, \
           (SELECT COUNT(*) FROM registrations r \
             WHERE r.event_id = e.id AND r.status = 'confirmed') AS registered, \
           e.created_at, e.updated_at \
    FROM events e \
    JOIN users u ON u.id = e.organizer_id";

#[derive(FromRow)]
struct EventDetailRow {
    id: Uuid,
    title: String,
    description: String,
    date: DateTime<Utc>,
    location: String,
    capacity: i32,
    organizer_id: Uuid,
    organizer_name: String,
    organizer_email: String,
    registered: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventDetailRow> for EventDetail {
    fn from(row: EventDetailRow) -> Self {
        Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            date: row.date,
            location: row.location,
            capacity: row.capacity,
            organizer: UserSummary {
                id: UserId::from_uuid(row.organizer_id),
                name: row.organizer_name,
                email: row.organizer_email,
            },
            registered: row.registered,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn create(&self, new_event: NewEvent) -> Result<EventDetail> {
        let id = EventId::new();
        sqlx::query(
            "INSERT INTO events (id, title, description, date, location, capacity, organizer_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id.0)
        .bind(&new_event.title)
        .bind(&new_event.description)
        .bind(new_event.date)
        .bind(&new_event.location)
        .bind(new_event.capacity)
        .bind(new_event.organizer_id.0)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let row: EventDetailRow = sqlx::query_as(&format!("{DETAIL_SELECT} WHERE e.id = $1"))
            .bind(id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(row.into())
    }

    async fn get(&self, id: EventId) -> Result<Option<EventDetail>> {
        let row: Option<EventDetailRow> =
            sqlx::query_as(&format!("{DETAIL_SELECT} WHERE e.id = $1"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        Ok(row.map(EventDetail::from))
    }

    async fn list(&self) -> Result<Vec<EventDetail>> {
        let rows: Vec<EventDetailRow> =
            sqlx::query_as(&format!("{DETAIL_SELECT} ORDER BY e.created_at DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(EventDetail::from).collect())
    }

    async fn update(&self, id: EventId, patch: EventPatch) -> Result<Option<EventDetail>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // Same lock as registration takes, so a capacity shrink cannot
        // race a concurrent registration past the new ceiling.
        let locked: Option<(i32,)> =
            sqlx::query_as("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(id.0)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        if locked.is_none() {
            return Ok(None);
        }

        if let Some(capacity) = patch.capacity {
            let (confirmed,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM registrations
                 WHERE event_id = $1 AND status = 'confirmed'",
            )
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx)?;
            if i64::from(capacity) < confirmed {
                return Err(Error::validation(
                    "Capacity cannot be below the number of confirmed registrations",
                ));
            }
        }

        // NULL binds leave a column untouched; an explicit empty string
        // overwrites. Absent and empty stay distinct all the way down.
        sqlx::query(
            "UPDATE events SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 date = COALESCE($4, date),
                 location = COALESCE($5, location),
                 capacity = COALESCE($6, capacity),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id.0)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.date)
        .bind(patch.location)
        .bind(patch.capacity)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;
        self.get(id).await
    }

    async fn delete(&self, id: EventId) -> Result<bool> {
        // Registrations go with the event via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}
