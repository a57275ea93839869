//! User account persistence.

use crate::{is_unique_violation, map_sqlx, PgStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherly_core::error::{Error, Result};
use gatherly_core::model::{NewUser, Role, StoredUser, User};
use gatherly_core::store::UserStore;
use gatherly_core::UserId;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_stored(self) -> Result<StoredUser> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| Error::database(format!("unknown role '{}'", self.role)))?;
        Ok(StoredUser {
            user: User {
                id: UserId::from_uuid(self.id),
                name: self.name,
                email: self.email,
                role,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            password_hash: self.password_hash,
        })
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let id = UserId::new();
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (id, name, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, email, password_hash, role, created_at, updated_at",
        )
        .bind(id.0)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                Error::DuplicateEmail
            } else {
                map_sqlx(err)
            }
        })?;
        Ok(row.into_stored()?.user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, role, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        row.map(UserRow::into_stored).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, role, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(row
            .map(UserRow::into_stored)
            .transpose()?
            .map(|stored| stored.user))
    }
}
