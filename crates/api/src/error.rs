use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::errors::{
    CsvProcessingError, EmailSendingError, ErrorKind, ProcessingError, RepositoryError,
    UserFacingError, ValidationError, ValueObjectError, WeakPasswordError,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed for {} field(s)", .0.len())]
    InvalidFields(Vec<ValidationDetail>),

    /// A domain error carrying its kind code, user message and context.
    #[error("{kind}: {debug}")]
    Domain {
        status: StatusCode,
        kind: ErrorKind,
        message: String,
        context: Value,
        debug: String,
    },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl ApiError {
    fn domain<E: UserFacingError>(status: StatusCode, err: &E) -> Self {
        ApiError::Domain {
            status,
            kind: err.kind(),
            message: err.user_message(),
            context: err.context().into_value(),
            debug: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, plain("unauthorized", msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, plain("not_found", msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, plain("conflict", msg)),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, plain("validation_error", msg))
            }
            ApiError::InvalidFields(details) => {
                let message = if details.len() == 1 {
                    details[0].message.clone()
                } else {
                    format!("{} validation errors", details.len())
                };
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: "validation_error".into(),
                        message,
                        details: Some(details),
                        context: None,
                    },
                )
            }
            ApiError::Domain {
                status,
                kind,
                message,
                context,
                debug: debug_detail,
            } => {
                if status.is_server_error() {
                    tracing::error!(error_kind = %kind, error = %debug_detail, "Request failed");
                } else {
                    tracing::debug!(error_kind = %kind, error = %debug_detail, "Request rejected");
                }
                (
                    status,
                    ErrorBody {
                        error: kind.as_str().into(),
                        message,
                        details: None,
                        context: Some(context),
                    },
                )
            }
            ApiError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                plain("payload_too_large", msg),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    plain("internal_error", "An internal error occurred".into()),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                plain("service_unavailable", msg),
            ),
        };

        (status, Json(body)).into_response()
    }
}

fn plain(error: &str, message: String) -> ErrorBody {
    ErrorBody {
        error: error.into(),
        message,
        details: None,
        context: None,
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::InvalidFields(details)
    }
}

impl From<CsvProcessingError> for ApiError {
    fn from(err: CsvProcessingError) -> Self {
        let status = match err {
            CsvProcessingError::TooManyRows { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError::domain(status, &err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::domain(StatusCode::BAD_REQUEST, &err)
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(err: ValueObjectError) -> Self {
        ApiError::domain(StatusCode::BAD_REQUEST, &err)
    }
}

impl From<WeakPasswordError> for ApiError {
    fn from(err: WeakPasswordError) -> Self {
        ApiError::domain(StatusCode::BAD_REQUEST, &err)
    }
}

impl From<EmailSendingError> for ApiError {
    fn from(err: EmailSendingError) -> Self {
        let status = match err {
            EmailSendingError::NotConfigured { .. }
            | EmailSendingError::InvalidRecipient { .. }
            | EmailSendingError::Template { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EmailSendingError::Connection { .. } | EmailSendingError::SendFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
        };
        ApiError::domain(status, &err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::domain(StatusCode::INTERNAL_SERVER_ERROR, &err)
    }
}

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Csv(e) => e.into(),
            ProcessingError::Repository(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_simple_statuses() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ServiceUnavailable("x".into())
                .into_response()
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let (status, body) = body_json(ApiError::Internal("password=hunter2".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert!(!body.to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn test_csv_error_body() {
        let err = CsvProcessingError::MissingColumns {
            columns: vec!["ticketId".to_string()],
        };
        let (status, body) = body_json(err.into()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "csv_missing_columns");
        assert_eq!(body["context"]["type"], "csv_missing_columns");
        assert!(body["message"].as_str().unwrap().contains("ticketId"));
    }

    #[tokio::test]
    async fn test_too_many_rows_is_413() {
        let (status, _) = body_json(CsvProcessingError::TooManyRows { max: 10 }.into()).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_weak_password_body() {
        let err = WeakPasswordError::check("kurz").unwrap_err();
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "weak_password");
        assert!(body["context"]["violations"].is_array());
    }

    #[tokio::test]
    async fn test_send_failure_is_bad_gateway() {
        let err = EmailSendingError::Connection {
            host: "smtp.example.com".into(),
            reason: "refused".into(),
        };
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["context"]["host"], "smtp.example.com");
    }

    #[tokio::test]
    async fn test_processing_error_delegates() {
        let err = ProcessingError::Repository(RepositoryError("pool timed out".into()));
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "repository_failure");
        assert!(!body["message"].as_str().unwrap().contains("pool"));
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        match error {
            ApiError::NotFound(msg) => assert_eq!(msg, "Resource not found"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_from_validation_errors_lists_fields() {
        use validator::Validate;

        let request = domain::models::UpdateUserRequest {
            email: Some("kaputt".into()),
            ..Default::default()
        };
        let err: ApiError = request.validate().unwrap_err().into();
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "email");
        assert_eq!(body["message"], "Invalid email format");
    }
}
