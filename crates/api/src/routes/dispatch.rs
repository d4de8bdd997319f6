//! Survey dispatch from an uploaded ticket CSV.

use std::sync::Arc;

use axum::{extract::State, Json};
use domain::models::{CsvPreview, DispatchOptions, DispatchReport, RowError, TicketData};
use domain::services::{CsvProcessor, EmailDispatchService, MailTransport};
use persistence::repositories::{EmailSentRepository, UserRepository};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CsvUpload;
use crate::routes::settings::{load_csv_field_config, load_smtp_config};
use crate::services::mailer::{build_transport, UnavailableMailer};

/// Multipart form fields next to `file`.
pub const TEST_MODE_FIELD: &str = "testMode";
pub const FORCE_RESEND_FIELD: &str = "forceResend";
pub const TEST_EMAIL_FIELD: &str = "testEmail";

/// Dispatch report plus the rows that never reached the dispatch loop.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    #[serde(flatten)]
    pub report: DispatchReport,
    pub invalid_rows: Vec<RowError>,
    pub unknown_users: Vec<TicketData>,
}

fn processor(state: &AppState) -> CsvProcessor {
    CsvProcessor::new(Arc::new(UserRepository::new(state.pool.clone())))
        .with_max_rows(state.config.limits.max_csv_rows)
}

/// POST /api/v1/admin/dispatch
///
/// The batch runs on its own task, so a dropped connection cannot stop it
/// between two tickets.
pub async fn dispatch(
    State(state): State<AppState>,
    upload: CsvUpload,
) -> Result<Json<DispatchResponse>, ApiError> {
    let test_mode = upload.flag(TEST_MODE_FIELD)?;
    let force_resend = upload.flag(FORCE_RESEND_FIELD)?;

    let smtp = load_smtp_config(&state).await?;
    let options = DispatchOptions::new(
        test_mode,
        force_resend,
        upload.text(TEST_EMAIL_FIELD),
        smtp.test_email.as_deref(),
    )?;

    let field_config = load_csv_field_config(&state).await?;
    let processed = processor(&state)
        .process(&upload.file, &field_config)
        .await?;

    tracing::info!(
        file_name = upload.file_name.as_deref().unwrap_or("-"),
        valid = processed.valid_tickets.len(),
        invalid = processed.invalid_rows.len(),
        unknown_users = processed.unknown_users.len(),
        test_mode,
        force_resend,
        "Starting survey dispatch"
    );

    // Unusable SMTP settings fail every ticket that would be sent, not the upload.
    let transport: Arc<dyn MailTransport> = match build_transport(&state.config.email, &smtp) {
        Ok(transport) => transport,
        Err(e) => {
            tracing::warn!(error = %e, "Mail transport unavailable, sends will be recorded as failed");
            Arc::new(UnavailableMailer::new(e))
        }
    };
    let service = EmailDispatchService::new(
        Arc::new(EmailSentRepository::new(state.pool.clone())),
        transport,
        state.template.clone(),
        state.events.clone(),
    );
    let tickets = processed.valid_tickets;
    let report = tokio::spawn(async move { service.dispatch(&tickets, &options).await })
        .await
        .map_err(|e| ApiError::Internal(format!("Dispatch task failed: {}", e)))??;

    Ok(Json(DispatchResponse {
        report,
        invalid_rows: processed.invalid_rows,
        unknown_users: processed.unknown_users,
    }))
}

/// POST /api/v1/admin/dispatch/preview
///
/// Classifies the rows without sending or logging anything.
pub async fn preview(
    State(state): State<AppState>,
    upload: CsvUpload,
) -> Result<Json<CsvPreview>, ApiError> {
    let field_config = load_csv_field_config(&state).await?;
    let processed = processor(&state)
        .process(&upload.file, &field_config)
        .await?;
    Ok(Json(processed.into()))
}
