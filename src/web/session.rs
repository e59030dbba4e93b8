use crate::db;
use crate::domain::models::UserRole;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub role: Option<UserRole>,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token format")]
    Invalid,
    #[error("signature mismatch")]
    Signature,
    #[error("expired")]
    Expired,
    #[error("bad role")]
    Role,
}

pub fn sign_session(
    user_id: Uuid,
    role: Option<UserRole>,
    key: &[u8],
) -> Result<String, SessionError> {
    let exp = Utc::now() + Duration::hours(24);
    let payload = format!("{}|{}|{}", user_id, role_string(role), exp.timestamp());
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(payload.as_bytes());
    let sig = mac.finalize().into_bytes();
    let token = format!(
        "{}.{}",
        general_purpose::STANDARD.encode(payload.as_bytes()),
        general_purpose::STANDARD.encode(sig)
    );
    Ok(token)
}

pub fn verify_session(token: &str, key: &[u8]) -> Result<SessionClaims, SessionError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(SessionError::Invalid);
    }
    let payload_bytes = general_purpose::STANDARD
        .decode(parts[0])
        .map_err(|_| SessionError::Invalid)?;
    let sig_bytes = general_purpose::STANDARD
        .decode(parts[1])
        .map_err(|_| SessionError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(&payload_bytes);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| SessionError::Signature)?;

    let payload = String::from_utf8(payload_bytes).map_err(|_| SessionError::Invalid)?;
    let pieces: Vec<&str> = payload.split('|').collect();
    if pieces.len() != 3 {
        return Err(SessionError::Invalid);
    }
    let user_id = Uuid::parse_str(pieces[0]).map_err(|_| SessionError::Invalid)?;
    let role = parse_role(pieces[1])?;
    let exp: i64 = pieces[2].parse().map_err(|_| SessionError::Invalid)?;
    if Utc::now().timestamp() > exp {
        return Err(SessionError::Expired);
    }
    Ok(SessionClaims { user_id, role, exp })
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(val) = auth.to_str() {
            if let Some(bearer) = val.strip_prefix("Bearer ") {
                return Some(bearer.trim().to_string());
            }
        }
    }
    if let Some(cookie) = headers.get(axum::http::header::COOKIE) {
        if let Ok(val) = cookie.to_str() {
            for pair in val.split(';') {
                let trimmed = pair.trim();
                if let Some(rest) = trimmed.strip_prefix("session=") {
                    return Some(rest.to_string());
                }
            }
        }
    }
    None
}

/// The authenticated user id from the request headers, or None when there is
/// no valid session. Current-user lookup treats that as "null", not an error.
pub fn session_user_id(headers: &HeaderMap, key: &[u8]) -> Option<Uuid> {
    let token = extract_token(headers)?;
    verify_session(&token, key).ok().map(|claims| claims.user_id)
}

// Role can be unset until the initialization call runs, so the token carries
// a placeholder for it.
fn role_string(role: Option<UserRole>) -> &'static str {
    match role {
        Some(UserRole::User) => "USER",
        Some(UserRole::Pm) => "PM",
        None => "NONE",
    }
}

fn parse_role(raw: &str) -> Result<Option<UserRole>, SessionError> {
    match raw {
        "USER" => Ok(Some(UserRole::User)),
        "PM" => Ok(Some(UserRole::Pm)),
        "NONE" => Ok(None),
        _ => Err(SessionError::Role),
    }
}

/// Axum extractor that validates the session and yields the user id.
/// Rejects with 401 when the token is missing, invalid, or its user is gone.
pub struct UserSession(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    S: Send + Sync,
    crate::state::SharedState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shared_state = crate::state::SharedState::from_ref(state);

        let token = extract_token(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)?;

        let claims = verify_session(&token, &shared_state.session_key).map_err(|e| {
            tracing::warn!("Session verification failed: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

        let user = db::find_user_by_id(&shared_state.pool, claims.user_id)
            .await
            .map_err(|e| {
                tracing::warn!("User lookup failed for session: {}", e);
                StatusCode::UNAUTHORIZED
            })?;

        if user.is_none() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(UserSession(claims.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let key = b"test-session-key";
        let user_id = Uuid::new_v4();
        let token = sign_session(user_id, Some(UserRole::Pm), key).unwrap();
        let claims = verify_session(&token, key).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, Some(UserRole::Pm));
    }

    #[test]
    fn roleless_session_roundtrips() {
        let key = b"test-session-key";
        let token = sign_session(Uuid::new_v4(), None, key).unwrap();
        let claims = verify_session(&token, key).unwrap();
        assert_eq!(claims.role, None);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = sign_session(Uuid::new_v4(), Some(UserRole::User), b"key-a").unwrap();
        assert!(matches!(
            verify_session(&token, b"key-b"),
            Err(SessionError::Signature)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_session("not-a-token", b"key"),
            Err(SessionError::Invalid)
        ));
    }

    #[test]
    fn cookie_and_bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "other=1; session=abc.def".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers), Some("abc.def".to_string()));

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer xyz.123".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers), Some("xyz.123".to_string()));
    }
}
