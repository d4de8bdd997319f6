//! User registry administration.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateUserRequest, EmailAddress, ListUsersQuery, NewUser, UpdateUserRequest, User, Username,
};
use domain::services::{UserImportReport, UserImportService};
use persistence::repositories::{UserChanges, UserRepository};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CsvUpload;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub data: Vec<User>,
    pub total: usize,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let data: Vec<User> = repo
        .list(query.search.as_deref())
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(Json(UserListResponse {
        total: data.len(),
        data,
    }))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    request.validate()?;

    let new_user = NewUser {
        username: Username::new(&request.username)?,
        email: EmailAddress::new(&request.email)?,
        first_name: blank_to_none(request.first_name),
        last_name: blank_to_none(request.last_name),
        excluded_from_surveys: request.excluded_from_surveys,
    };

    let repo = UserRepository::new(state.pool.clone());
    let created = repo.create(&new_user).await.map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict(format!(
            "Benutzer '{}' existiert bereits.",
            new_user.username
        )),
        other => other,
    })?;

    tracing::info!(user_id = %created.id, username = %created.username, "User created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/v1/admin/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

/// PUT /api/v1/admin/users/:id
///
/// Absent fields stay unchanged. The username is immutable.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    let changes = UserChanges {
        email: request
            .email
            .as_deref()
            .map(EmailAddress::new)
            .transpose()?
            .map(String::from),
        first_name: request.first_name.map(|v| v.trim().to_string()),
        last_name: request.last_name.map(|v| v.trim().to_string()),
        excluded_from_surveys: request.excluded_from_surveys,
    };

    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .update(id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %id, "User updated");
    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/:id
///
/// The email log keeps its entries; it stores usernames, not user IDs.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    if !repo.delete(id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/import
pub async fn import_users(
    State(state): State<AppState>,
    upload: CsvUpload,
) -> Result<Json<UserImportReport>, ApiError> {
    let service = UserImportService::new(
        Arc::new(UserRepository::new(state.pool.clone())),
        state.events.clone(),
    )
    .with_max_rows(state.config.limits.max_csv_rows);

    Ok(Json(service.import(&upload.file).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(None), None);
        assert_eq!(blank_to_none(Some("  ".to_string())), None);
        assert_eq!(blank_to_none(Some(" Anna ".to_string())), Some("Anna".to_string()));
    }
}
