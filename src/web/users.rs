use crate::db;
use crate::domain::models::{User, UserRole};
use crate::state::SharedState;
use crate::web::error::ApiError;
use crate::web::session::{self, UserSession};
use crate::web::IdResponse;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire shape of a user; the password hash never leaves the service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub role: Option<UserRole>,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl From<User> for ApiUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            image: user.image,
            role: user.role,
            created_at: user.created_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRolePayload {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct InitializeRolePayload {
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamMemberPayload {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberResponse {
    pub user_id: Uuid,
    pub message: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(current_user))
        .route("/initialize-role", post(initialize_role))
        .route("/team-members", post(create_team_member))
        .route("/role/:role", get(list_by_role))
        .route("/:id", get(get_user))
        .route("/:id/role", post(update_role))
        .with_state(state)
}

/// Identity of the calling session; null when unauthenticated.
async fn current_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Option<ApiUser>>, ApiError> {
    let Some(user_id) = session::session_user_id(&headers, &state.session_key) else {
        return Ok(Json(None));
    };
    let user = db::find_user_by_id(&state.pool, user_id).await?;
    Ok(Json(user.map(ApiUser::from)))
}

async fn list_users(State(state): State<SharedState>) -> Result<Json<Vec<ApiUser>>, ApiError> {
    let users = db::list_users(&state.pool).await?;
    Ok(Json(users.into_iter().map(ApiUser::from).collect()))
}

async fn list_by_role(
    State(state): State<SharedState>,
    Path(role): Path<UserRole>,
) -> Result<Json<Vec<ApiUser>>, ApiError> {
    let users = db::list_users_by_role(&state.pool, role).await?;
    Ok(Json(users.into_iter().map(ApiUser::from).collect()))
}

async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<ApiUser>>, ApiError> {
    let user = db::find_user_by_id(&state.pool, id).await?;
    Ok(Json(user.map(ApiUser::from)))
}

async fn update_role(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<Json<IdResponse>, ApiError> {
    let affected = db::set_user_role(&state.pool, id, payload.role).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(Json(IdResponse { id }))
}

/// Set the calling user's role after signup; defaults to User.
async fn initialize_role(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<InitializeRolePayload>,
) -> Result<Json<IdResponse>, ApiError> {
    let role = payload.role.unwrap_or(UserRole::User);
    let affected = db::set_user_role(&state.pool, user_id, role).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(Json(IdResponse { id: user_id }))
}

async fn create_team_member(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTeamMemberPayload>,
) -> Result<Json<CreateTeamMemberResponse>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Name is required"));
    }

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::validation("Please enter a valid email address"));
    }

    let password = payload.password.trim();
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    if password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters long",
        ));
    }

    if db::find_user_by_email(&state.pool, &email).await?.is_some() {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?
        .to_string();

    let user_id =
        db::insert_user(&state.pool, &email, &hash, Some(name), Some(payload.role)).await?;

    tracing::info!("Provisioned team member {} ({})", email, user_id);

    Ok(Json(CreateTeamMemberResponse {
        user_id,
        message: format!("Team member {name} added successfully"),
    }))
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
