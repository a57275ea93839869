//! Gatherly API server binary.

use anyhow::Context;
use gatherly_auth::TokenService;
use gatherly_postgres::PgStore;
use gatherly_server::{router, AppState, Config};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatherly_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let pool = gatherly_postgres::connect(&config.database_url, config.database_max_connections)
        .await
        .context("connecting to the database")?;
    gatherly_postgres::migrate(&pool)
        .await
        .context("running migrations")?;

    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(
        store.clone(),
        store.clone(),
        store,
        TokenService::new(&config.jwt_secret, config.token_ttl),
    );

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
