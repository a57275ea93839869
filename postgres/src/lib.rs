//! PostgreSQL implementations of the Gatherly store traits.
//!
//! One [`PgStore`] owns the connection pool and implements all three
//! traits. The registration ledger's invariants are enforced where they
//! belong, in the database:
//!
//! - duplicate registrations hit `UNIQUE (user_id, event_id)`;
//! - the capacity ceiling is checked inside a transaction holding a
//!   `FOR UPDATE` lock on the event row, so concurrent registrations for
//!   the last slot serialize instead of both succeeding.

use gatherly_core::error::Error;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod events;
mod registrations;
mod users;

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an already-connected pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Connect a pool to the given database URL.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run the embedded schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn map_sqlx(err: sqlx::Error) -> Error {
    Error::database(err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}
