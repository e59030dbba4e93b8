use crate::analytics::report::{self, SprintSummary};
use crate::db;
use crate::domain::models::{completion_stamp, Ticket, TicketPatch, TicketStatus};
use crate::state::SharedState;
use crate::web::error::ApiError;
use crate::web::IdResponse;
use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTicket {
    pub id: Uuid,
    pub card_id: String,
    pub title: String,
    pub story_points: i32,
    pub estimated_days: f64,
    pub status: TicketStatus,
    pub sprint_week: i32,
    #[serde(rename = "sprintID")]
    pub sprint_id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds, present iff status is done.
    pub completed_at: Option<i64>,
}

impl From<Ticket> for ApiTicket {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            card_id: ticket.card_id,
            title: ticket.title,
            story_points: ticket.story_points,
            estimated_days: ticket.estimated_days,
            status: ticket.status,
            sprint_week: ticket.sprint_week,
            sprint_id: ticket.sprint_id,
            user_id: ticket.user_id,
            created_at: ticket.created_at.timestamp_millis(),
            completed_at: ticket.completed_at.map(|t| t.timestamp_millis()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub card_id: String,
    pub title: String,
    pub story_points: i32,
    pub estimated_days: f64,
    pub status: TicketStatus,
    pub sprint_week: i32,
    #[serde(rename = "sprintID")]
    pub sprint_id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: TicketStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignPayload {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MovePayload {
    #[serde(rename = "sprintID")]
    pub sprint_id: Uuid,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(create_ticket))
        .route("/", get(list_tickets))
        .route("/sprint/:sprint_id", get(list_by_sprint))
        .route("/sprint/:sprint_id/summary", get(sprint_summary))
        .route("/sprint/:sprint_id/status/:status", get(list_by_sprint_and_status))
        .route("/user/:user_id", get(list_by_user))
        .route("/status/:status", get(list_by_status))
        .route("/:id", get(get_ticket))
        .route("/:id", patch(update_ticket))
        .route("/:id", delete(delete_ticket))
        .route("/:id/status", post(update_status))
        .route("/:id/assign", post(assign_to_user))
        .route("/:id/sprint", post(move_to_sprint))
        .with_state(state)
}

async fn create_ticket(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<Json<IdResponse>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Ticket title is required"));
    }
    if payload.card_id.trim().is_empty() {
        return Err(ApiError::validation("Card id is required"));
    }

    // Shape-level checks only: the referenced sprint and user are weak
    // references and are not resolved at write time.
    let completed_at = completion_stamp(payload.status, Utc::now());
    let id = db::insert_ticket(
        &state.pool,
        payload.card_id.trim(),
        payload.title.trim(),
        payload.story_points,
        payload.estimated_days,
        payload.status,
        payload.sprint_week,
        payload.sprint_id,
        payload.user_id,
        completed_at,
    )
    .await?;

    Ok(Json(IdResponse { id }))
}

async fn list_tickets(State(state): State<SharedState>) -> Result<Json<Vec<ApiTicket>>, ApiError> {
    let tickets = db::list_tickets(&state.pool).await?;
    Ok(Json(tickets.into_iter().map(ApiTicket::from).collect()))
}

async fn get_ticket(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<ApiTicket>>, ApiError> {
    let ticket = db::find_ticket_by_id(&state.pool, id).await?;
    Ok(Json(ticket.map(ApiTicket::from)))
}

async fn list_by_sprint(
    State(state): State<SharedState>,
    Path(sprint_id): Path<Uuid>,
) -> Result<Json<Vec<ApiTicket>>, ApiError> {
    let tickets = db::list_tickets_by_sprint(&state.pool, sprint_id).await?;
    Ok(Json(tickets.into_iter().map(ApiTicket::from).collect()))
}

async fn list_by_user(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ApiTicket>>, ApiError> {
    let tickets = db::list_tickets_by_user(&state.pool, user_id).await?;
    Ok(Json(tickets.into_iter().map(ApiTicket::from).collect()))
}

async fn list_by_status(
    State(state): State<SharedState>,
    Path(status): Path<TicketStatus>,
) -> Result<Json<Vec<ApiTicket>>, ApiError> {
    let tickets = db::list_tickets_by_status(&state.pool, status).await?;
    Ok(Json(tickets.into_iter().map(ApiTicket::from).collect()))
}

async fn list_by_sprint_and_status(
    State(state): State<SharedState>,
    Path((sprint_id, status)): Path<(Uuid, TicketStatus)>,
) -> Result<Json<Vec<ApiTicket>>, ApiError> {
    let tickets = db::list_tickets_by_sprint_and_status(&state.pool, sprint_id, status).await?;
    Ok(Json(tickets.into_iter().map(ApiTicket::from).collect()))
}

async fn update_ticket(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TicketPatch>,
) -> Result<Json<IdResponse>, ApiError> {
    apply_patch(&state, id, &patch).await?;
    Ok(Json(IdResponse { id }))
}

/// High-frequency path used by board drag-and-drop.
async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<IdResponse>, ApiError> {
    let patch = TicketPatch {
        status: Some(payload.status),
        ..Default::default()
    };
    apply_patch(&state, id, &patch).await?;
    Ok(Json(IdResponse { id }))
}

async fn assign_to_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<IdResponse>, ApiError> {
    let patch = TicketPatch {
        user_id: Some(payload.user_id),
        ..Default::default()
    };
    apply_patch(&state, id, &patch).await?;
    Ok(Json(IdResponse { id }))
}

async fn move_to_sprint(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovePayload>,
) -> Result<Json<IdResponse>, ApiError> {
    let patch = TicketPatch {
        sprint_id: Some(payload.sprint_id),
        ..Default::default()
    };
    apply_patch(&state, id, &patch).await?;
    Ok(Json(IdResponse { id }))
}

/// Read-before-write: the merge needs the prior row so untouched fields
/// survive and the completion rule is applied against the new status.
async fn apply_patch(state: &SharedState, id: Uuid, patch: &TicketPatch) -> Result<(), ApiError> {
    let current = db::find_ticket_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let merged = patch.apply(&current, Utc::now());

    let affected = db::update_ticket(&state.pool, &merged).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(())
}

async fn delete_ticket(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdResponse>, ApiError> {
    let affected = db::delete_ticket(&state.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(Json(IdResponse { id }))
}

async fn sprint_summary(
    State(state): State<SharedState>,
    Path(sprint_id): Path<Uuid>,
) -> Result<Json<SprintSummary>, ApiError> {
    let tickets = db::list_tickets_by_sprint(&state.pool, sprint_id).await?;
    Ok(Json(report::sprint_summary(&tickets)))
}
