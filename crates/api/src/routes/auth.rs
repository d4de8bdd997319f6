//! Admin login, logout and password change.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use domain::errors::WeakPasswordError;
use persistence::repositories::AdminRepository;
use serde::{Deserialize, Serialize};
use shared::crypto::{generate_session_token, is_session_token_format, sha256_hex};
use shared::password::{hash_password, verify_password};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AdminSession;
use crate::services::cookies::{extract_cookie, SessionCookie, SESSION_COOKIE};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    pub new_password: String,
}

fn session_cookie(state: &AppState) -> SessionCookie {
    SessionCookie::new(state.config.auth.cookie_secure, state.config.auth.session_ttl_secs)
}

async fn current_hash(state: &AppState, repo: &AdminRepository) -> Result<String, ApiError> {
    Ok(repo
        .get_or_init_password_hash(&state.config.auth.admin_password_hash)
        .await?)
}

fn check_password(password: &str, hash: &str) -> Result<(), ApiError> {
    match verify_password(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ApiError::Unauthorized("Falsches Passwort.".to_string())),
        Err(e) => Err(ApiError::Internal(format!("Stored admin hash unusable: {}", e))),
    }
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let repo = AdminRepository::new(state.pool.clone());
    let hash = current_hash(&state, &repo).await?;
    if let Err(e) = check_password(&request.password, &hash) {
        tracing::warn!("Admin login failed");
        return Err(e);
    }

    let purged = repo.delete_expired_sessions().await?;
    if purged > 0 {
        tracing::debug!(purged, "Removed expired admin sessions");
    }

    let token = generate_session_token();
    let expires_at = Utc::now() + Duration::seconds(state.config.auth.session_ttl_secs);
    let session = repo.create_session(&sha256_hex(&token), expires_at).await?;
    tracing::info!(session_id = session.id, "Admin logged in");

    let mut headers = HeaderMap::new();
    SessionCookie::append_to(&mut headers, &session_cookie(&state).issue(&token));
    Ok((headers, Json(LoginResponse { expires_at })))
}

/// POST /api/v1/auth/logout
///
/// Always clears the cookie, even without a valid session.
pub async fn logout(
    State(state): State<AppState>,
    request_headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_cookie(&request_headers, SESSION_COOKIE) {
        if is_session_token_format(token) {
            let repo = AdminRepository::new(state.pool.clone());
            if repo.delete_session(&sha256_hex(token)).await? {
                tracing::info!("Admin logged out");
            }
        }
    }

    let mut headers = HeaderMap::new();
    SessionCookie::append_to(&mut headers, &session_cookie(&state).clear());
    Ok((StatusCode::NO_CONTENT, headers))
}

/// PUT /api/v1/admin/password
///
/// Other sessions are revoked; the calling session stays valid.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    let repo = AdminRepository::new(state.pool.clone());
    let hash = current_hash(&state, &repo).await?;
    check_password(&request.current_password, &hash)?;
    WeakPasswordError::check(&request.new_password)?;

    let new_hash = hash_password(&request.new_password)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;
    repo.set_password_hash(&new_hash).await?;
    let revoked = repo.delete_other_sessions(&session.token_hash).await?;

    tracing::info!(revoked_sessions = revoked, "Admin password changed");
    Ok(StatusCode::NO_CONTENT)
}
