use crate::db;
use crate::domain::models::UserRole;
use crate::state::SharedState;
use crate::web::error::ApiError;
use crate::web::session;
use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub role: Option<UserRole>,
    pub name: Option<String>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(state)
}

async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ip = addr.ip().to_string();
    if !state.login_limiter.check(&ip).await {
        tracing::warn!("Login rate limit exceeded for IP: {}", ip);
        return Err(ApiError::RateLimited);
    }

    let email = payload.email.trim().to_lowercase();
    let user = db::find_user_by_email(&state.pool, &email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.hash).map_err(|_| ApiError::Unauthorized)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let token = session::sign_session(user.id, user.role, &state.session_key)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to sign session: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::SET_COOKIE,
        format!("session={token}; HttpOnly; SameSite=Lax; Path=/")
            .parse()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("Invalid cookie header")))?,
    );

    tracing::info!("User {} logged in", user.id);

    Ok((
        headers,
        Json(LoginResponse {
            user_id: user.id,
            role: user.role,
            name: user.name,
        }),
    ))
}
