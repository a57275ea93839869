//! Router assembly.

use crate::handlers::{auth, events, health, registrations};
use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router over the given state.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/:id",
            get(events::get).put(events::update).delete(events::remove),
        )
        .route("/registrations", post(registrations::register))
        .route("/registrations/myregistrations", get(registrations::mine))
        .route("/registrations/all", get(registrations::all))
        .route("/registrations/:id", delete(registrations::cancel));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
