//! Admin session middleware.
//!
//! The raw token lives only in the `ts_session` cookie; the database stores
//! its SHA-256 hash.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use persistence::repositories::AdminRepository;
use shared::crypto::{is_session_token_format, sha256_hex};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::cookies::{extract_cookie, SESSION_COOKIE};

/// The authenticated admin session, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: i64,
    pub token_hash: String,
}

/// Rejects requests without a valid, unexpired session cookie.
pub async fn require_admin_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match extract_cookie(req.headers(), SESSION_COOKIE) {
        Some(token) if is_session_token_format(token) => token,
        Some(_) => {
            tracing::debug!("Malformed session cookie");
            return unauthorized();
        }
        None => return unauthorized(),
    };
    let token_hash = sha256_hex(token);

    let repo = AdminRepository::new(state.pool.clone());
    match repo.touch_valid_session(&token_hash).await {
        Ok(Some(session)) => {
            req.extensions_mut().insert(AdminSession {
                session_id: session.id,
                token_hash,
            });
            next.run(req).await
        }
        Ok(None) => {
            tracing::debug!("Unknown or expired admin session");
            unauthorized()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

fn unauthorized() -> Response {
    ApiError::Unauthorized("Bitte melden Sie sich an.".to_string()).into_response()
}
