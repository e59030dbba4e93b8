pub mod analytics;
pub mod auth;
pub mod error;
pub mod session;
pub mod sprints;
pub mod tickets;
pub mod users;

use crate::state::SharedState;
use axum::{routing::get, Router};
use serde::Serialize;
use uuid::Uuid;

/// Mutations answer with the id they touched.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: Uuid,
}

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router(state.clone()))
        .nest("/users", users::router(state.clone()))
        .nest("/sprints", sprints::router(state.clone()))
        .nest("/tickets", tickets::router(state.clone()))
        .nest("/analytics", analytics::router(state))
}
