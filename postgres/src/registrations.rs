//! Registration persistence.
//!
//! [`create_confirmed`](gatherly_core::store::RegistrationStore::create_confirmed)
//! is where the ledger's two invariants are enforced under a real
//! serialization boundary: the transaction takes a `FOR UPDATE` lock on the
//! event row before counting confirmed registrations, and the unique index
//! on (user_id, event_id) backstops the duplicate check.

use crate::{is_unique_violation, map_sqlx, PgStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherly_core::error::{Error, Result};
use gatherly_core::model::{
    EventSummary, Registration, RegistrationDetail, RegistrationStatus, UserSummary,
};
use gatherly_core::store::RegistrationStore;
use gatherly_core::{EventId, RegistrationId, UserId};
use sqlx::FromRow;
use uuid::Uuid;

const DETAIL_SELECT: &str = "\
    SELECT r.id, r.status, r.registration_date, r.created_at, r.updated_at, \
           u.id AS user_id, u.name AS user_name, u.email AS user_email, \
           e.id AS event_id, e.title AS event_title, \
           e.description AS event_description, e.date AS event_date, \
           e.location AS event_location, e.capacity AS event_capacity \
    FROM registrations r \
    JOIN users u ON u.id = r.user_id \
    JOIN events e ON e.id = r.event_id";

#[derive(FromRow)]
struct RegistrationRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    status: String,
    registration_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RegistrationRow {
    fn into_registration(self) -> Result<Registration> {
        Ok(Registration {
            id: RegistrationId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            event_id: EventId::from_uuid(self.event_id),
            status: parse_status(&self.status)?,
            registration_date: self.registration_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct RegistrationDetailRow {
    id: Uuid,
    status: String,
    registration_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: Uuid,
    user_name: String,
    user_email: String,
    event_id: Uuid,
    event_title: String,
    event_description: String,
    event_date: DateTime<Utc>,
    event_location: String,
    event_capacity: i32,
}

impl RegistrationDetailRow {
    fn into_detail(self) -> Result<RegistrationDetail> {
        Ok(RegistrationDetail {
            id: RegistrationId::from_uuid(self.id),
            status: parse_status(&self.status)?,
            registration_date: self.registration_date,
            user: UserSummary {
                id: UserId::from_uuid(self.user_id),
                name: self.user_name,
                email: self.user_email,
            },
            event: EventSummary {
                id: EventId::from_uuid(self.event_id),
                title: self.event_title,
                description: self.event_description,
                date: self.event_date,
                location: self.event_location,
                capacity: self.event_capacity,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_status(status: &str) -> Result<RegistrationStatus> {
    RegistrationStatus::parse(status)
        .ok_or_else(|| Error::database(format!("unknown registration status '{status}'")))
}

#[async_trait]
impl RegistrationStore for PgStore {
    async fn create_confirmed(&self, user_id: UserId, event_id: EventId) -> Result<Registration> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // Lock the event row for the duration of the transaction so the
        // confirmed count cannot change under us.
        let capacity: Option<(i32,)> =
            sqlx::query_as("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id.0)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        let Some((capacity,)) = capacity else {
            return Err(Error::not_found("Event"));
        };

        let duplicate: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM registrations WHERE user_id = $1 AND event_id = $2",
        )
        .bind(user_id.0)
        .bind(event_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx)?;
        if duplicate.is_some() {
            return Err(Error::AlreadyRegistered);
        }

        let (confirmed,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations
             WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(event_id.0)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx)?;
        if confirmed >= i64::from(capacity) {
            return Err(Error::CapacityReached);
        }

        let id = RegistrationId::new();
        let row: RegistrationRow = sqlx::query_as(
            "INSERT INTO registrations (id, user_id, event_id, status)
             VALUES ($1, $2, $3, 'confirmed')
             RETURNING id, user_id, event_id, status,
                       registration_date, created_at, updated_at",
        )
        .bind(id.0)
        .bind(user_id.0)
        .bind(event_id.0)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                Error::AlreadyRegistered
            } else {
                map_sqlx(err)
            }
        })?;

        tx.commit().await.map_err(map_sqlx)?;
        row.into_registration()
    }

    async fn find(&self, id: RegistrationId) -> Result<Option<Registration>> {
        let row: Option<RegistrationRow> = sqlx::query_as(
            "SELECT id, user_id, event_id, status,
                    registration_date, created_at, updated_at
             FROM registrations WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        row.map(RegistrationRow::into_registration).transpose()
    }

    async fn for_user(&self, user_id: UserId) -> Result<Vec<RegistrationDetail>> {
        let rows: Vec<RegistrationDetailRow> = sqlx::query_as(&format!(
            "{DETAIL_SELECT} WHERE r.user_id = $1 ORDER BY r.created_at DESC"
        ))
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.into_iter()
            .map(RegistrationDetailRow::into_detail)
            .collect()
    }

    async fn all(&self) -> Result<Vec<RegistrationDetail>> {
        let rows: Vec<RegistrationDetailRow> =
            sqlx::query_as(&format!("{DETAIL_SELECT} ORDER BY r.created_at DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;
        rows.into_iter()
            .map(RegistrationDetailRow::into_detail)
            .collect()
    }

    async fn delete(&self, id: RegistrationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn attendees(&self, event_id: EventId) -> Result<Vec<UserSummary>> {
        #[derive(FromRow)]
        struct AttendeeRow {
            id: Uuid,
            name: String,
            email: String,
        }

        let rows: Vec<AttendeeRow> = sqlx::query_as(
            "SELECT u.id, u.name, u.email
             FROM registrations r
             JOIN users u ON u.id = r.user_id
             WHERE r.event_id = $1 AND r.status = 'confirmed'
             ORDER BY r.created_at ASC",
        )
        .bind(event_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(rows
            .into_iter()
            .map(|row| UserSummary {
                id: UserId::from_uuid(row.id),
                name: row.name,
                email: row.email,
            })
            .collect())
    }
}
