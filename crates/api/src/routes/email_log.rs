//! Email log browsing with cursor pagination.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{EmailLogPage, EmailLogQuery, EmailSent};
use persistence::repositories::{EmailLogFilter, EmailSentRepository};
use shared::pagination::{clamp_page_limit, decode_cursor, encode_cursor};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/admin/emails
///
/// Newest first. `next_cursor` is set when `has_more` is true.
pub async fn list_emails(
    State(state): State<AppState>,
    Query(query): Query<EmailLogQuery>,
) -> Result<Json<EmailLogPage>, ApiError> {
    let filter = build_filter(query)?;

    let repo = EmailSentRepository::new(state.pool.clone());
    let (rows, has_more) = repo.list(&filter).await?;

    let next_cursor = if has_more {
        rows.last().map(|last| encode_cursor(last.sent_at, last.id))
    } else {
        None
    };

    Ok(Json(EmailLogPage {
        data: rows.into_iter().map(EmailSent::from).collect(),
        next_cursor,
        has_more,
    }))
}

fn build_filter(query: EmailLogQuery) -> Result<EmailLogFilter, ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::Validation(
                "'from' must not be after 'to'".to_string(),
            ));
        }
    }

    let cursor = query
        .cursor
        .as_deref()
        .map(decode_cursor)
        .transpose()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    Ok(EmailLogFilter {
        status_pattern: query.status.map(|s| s.like_pattern().to_string()),
        ticket_id: non_empty(query.ticket_id),
        username: non_empty(query.username),
        from: query.from,
        to: query.to,
        cursor_sent_at: cursor.map(|(sent_at, _)| sent_at),
        cursor_id: cursor.map(|(_, id)| id),
        limit: clamp_page_limit(query.limit),
    })
}
