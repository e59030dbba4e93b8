use crate::analytics::report::{self, SprintAnalytics};
use crate::analytics::trends::{self, SprintVelocity, TicketTimingAnalytics, WeekPattern};
use crate::db;
use crate::state::SharedState;
use crate::web::error::ApiError;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/sprint/:sprint_id", get(sprint_analytics))
        .route("/velocity", get(velocity_trends))
        .route("/weekly-patterns", get(weekly_patterns))
        .route("/timing/:sprint_id", get(ticket_timing))
        .with_state(state)
}

async fn sprint_analytics(
    State(state): State<SharedState>,
    Path(sprint_id): Path<Uuid>,
) -> Result<Json<SprintAnalytics>, ApiError> {
    let tickets = db::list_tickets_by_sprint(&state.pool, sprint_id).await?;
    Ok(Json(report::sprint_analytics(&tickets)))
}

async fn velocity_trends(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SprintVelocity>>, ApiError> {
    let sprints = db::list_sprints(&state.pool).await?;
    let tickets = db::list_tickets(&state.pool).await?;
    Ok(Json(trends::velocity_trends(&sprints, &tickets)))
}

async fn weekly_patterns(
    State(state): State<SharedState>,
) -> Result<Json<Vec<WeekPattern>>, ApiError> {
    let tickets = db::list_tickets(&state.pool).await?;
    Ok(Json(trends::weekly_completion_patterns(&tickets)))
}

async fn ticket_timing(
    State(state): State<SharedState>,
    Path(sprint_id): Path<Uuid>,
) -> Result<Json<TicketTimingAnalytics>, ApiError> {
    let tickets = db::list_tickets_by_sprint(&state.pool, sprint_id).await?;
    Ok(Json(trends::ticket_timing_analytics(&tickets)))
}
