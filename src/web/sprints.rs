use crate::db;
use crate::domain::models::{Sprint, SprintPatch, SprintStatus};
use crate::state::SharedState;
use crate::web::error::ApiError;
use crate::web::IdResponse;
use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSprint {
    pub id: Uuid,
    pub name: String,
    pub status: SprintStatus,
    /// Unix milliseconds.
    pub start: i64,
    /// Unix milliseconds.
    pub end: i64,
    pub sprint_week: Option<i32>,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl From<Sprint> for ApiSprint {
    fn from(sprint: Sprint) -> Self {
        Self {
            id: sprint.id,
            name: sprint.name,
            status: sprint.status,
            start: sprint.start_at.timestamp_millis(),
            end: sprint.end_at.timestamp_millis(),
            sprint_week: sprint.sprint_week,
            created_at: sprint.created_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSprintRequest {
    pub name: String,
    pub status: SprintStatus,
    /// Unix milliseconds.
    pub start: i64,
    /// Unix milliseconds.
    pub end: i64,
    pub sprint_week: Option<i32>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(create_sprint))
        .route("/", get(list_sprints))
        .route("/active", get(active_sprint))
        .route("/status/:status", get(list_by_status))
        .route("/:id", get(get_sprint))
        .route("/:id", patch(update_sprint))
        .route("/:id", delete(delete_sprint))
        .with_state(state)
}

fn timestamp_from_millis(millis: i64, field: &str) -> Result<DateTime<Utc>, ApiError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ApiError::validation(format!("{field} is not a valid timestamp")))
}

async fn create_sprint(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSprintRequest>,
) -> Result<Json<IdResponse>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Sprint name is required"));
    }
    if payload.end <= payload.start {
        return Err(ApiError::validation("Sprint end must be after its start"));
    }

    let start_at = timestamp_from_millis(payload.start, "start")?;
    let end_at = timestamp_from_millis(payload.end, "end")?;

    let id = db::insert_sprint(
        &state.pool,
        name,
        payload.status,
        start_at,
        end_at,
        payload.sprint_week,
    )
    .await?;

    Ok(Json(IdResponse { id }))
}

async fn list_sprints(State(state): State<SharedState>) -> Result<Json<Vec<ApiSprint>>, ApiError> {
    let sprints = db::list_sprints(&state.pool).await?;
    Ok(Json(sprints.into_iter().map(ApiSprint::from).collect()))
}

async fn get_sprint(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<ApiSprint>>, ApiError> {
    let sprint = db::find_sprint_by_id(&state.pool, id).await?;
    Ok(Json(sprint.map(ApiSprint::from)))
}

async fn list_by_status(
    State(state): State<SharedState>,
    Path(status): Path<SprintStatus>,
) -> Result<Json<Vec<ApiSprint>>, ApiError> {
    let sprints = db::list_sprints_by_status(&state.pool, status).await?;
    Ok(Json(sprints.into_iter().map(ApiSprint::from).collect()))
}

async fn active_sprint(
    State(state): State<SharedState>,
) -> Result<Json<Option<ApiSprint>>, ApiError> {
    let sprint = db::find_active_sprint(&state.pool).await?;
    Ok(Json(sprint.map(ApiSprint::from)))
}

async fn update_sprint(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SprintPatch>,
) -> Result<Json<IdResponse>, ApiError> {
    let current = db::find_sprint_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let start_at = match patch.start {
        Some(millis) => timestamp_from_millis(millis, "start")?,
        None => current.start_at,
    };
    let end_at = match patch.end {
        Some(millis) => timestamp_from_millis(millis, "end")?,
        None => current.end_at,
    };
    if end_at <= start_at {
        return Err(ApiError::validation("Sprint end must be after its start"));
    }

    let name = match patch.name {
        Some(ref name) if name.trim().is_empty() => {
            return Err(ApiError::validation("Sprint name is required"))
        }
        Some(name) => name,
        None => current.name,
    };

    let merged = Sprint {
        id: current.id,
        name,
        status: patch.status.unwrap_or(current.status),
        start_at,
        end_at,
        sprint_week: patch.sprint_week.resolve(current.sprint_week),
        created_at: current.created_at,
    };

    let affected = db::update_sprint(&state.pool, &merged).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(Json(IdResponse { id }))
}

async fn delete_sprint(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdResponse>, ApiError> {
    // No cascade: tickets keep their sprint_id and dangle, matching the
    // source behavior.
    let affected = db::delete_sprint(&state.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(Json(IdResponse { id }))
}
