//! Bulk user import from CSV.
//!
//! Header: `username,email` plus optional `firstName`, `lastName` and
//! `excludedFromSurveys`. Rows are upserted by username.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use crate::errors::{CsvProcessingError, ProcessingError};
use crate::events::{
    DomainEvent, EventDispatcher, UserImportCompletedEvent, UserImportFailedEvent,
    UserImportStartedEvent,
};
use crate::models::{EmailAddress, NewUser, RowError, UpsertOutcome, Username};
use crate::services::csv_reader::{read_document, CsvRow};
use crate::services::ports::UserStore;

pub const USERNAME_COLUMN: &str = "username";
pub const EMAIL_COLUMN: &str = "email";
pub const FIRST_NAME_COLUMN: &str = "firstName";
pub const LAST_NAME_COLUMN: &str = "lastName";
pub const EXCLUDED_COLUMN: &str = "excludedFromSurveys";

/// Result of a user import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImportReport {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

struct Columns {
    username: Option<usize>,
    email: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    excluded: Option<usize>,
}

pub struct UserImportService {
    store: Arc<dyn UserStore>,
    events: EventDispatcher,
    max_rows: Option<usize>,
}

impl UserImportService {
    pub fn new(store: Arc<dyn UserStore>, events: EventDispatcher) -> Self {
        Self {
            store,
            events,
            max_rows: None,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub async fn import(&self, data: &[u8]) -> Result<UserImportReport, ProcessingError> {
        let started = Instant::now();
        self.events
            .publish(DomainEvent::UserImportStarted(UserImportStartedEvent {
                occurred_at: Utc::now(),
            }));

        match self.run(data).await {
            Ok(report) => {
                let duration = started.elapsed().as_secs_f64();
                tracing::info!(
                    created = report.created,
                    updated = report.updated,
                    failed = report.failed,
                    duration_secs = duration,
                    "User import completed"
                );
                self.events
                    .publish(DomainEvent::UserImportCompleted(UserImportCompletedEvent {
                        created: report.created,
                        updated: report.updated,
                        failed: report.failed,
                        duration_in_seconds: duration,
                        occurred_at: Utc::now(),
                    }));
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "User import failed");
                self.events
                    .publish(DomainEvent::UserImportFailed(UserImportFailedEvent {
                        reason: e.to_string(),
                        occurred_at: Utc::now(),
                    }));
                Err(e)
            }
        }
    }

    async fn run(&self, data: &[u8]) -> Result<UserImportReport, ProcessingError> {
        let document = read_document(data, self.max_rows)?;

        let missing = document.missing_columns(&[USERNAME_COLUMN, EMAIL_COLUMN]);
        if !missing.is_empty() {
            return Err(CsvProcessingError::MissingColumns { columns: missing }.into());
        }

        let columns = Columns {
            username: document.column(USERNAME_COLUMN),
            email: document.column(EMAIL_COLUMN),
            first_name: document.column(FIRST_NAME_COLUMN),
            last_name: document.column(LAST_NAME_COLUMN),
            excluded: document.column(EXCLUDED_COLUMN),
        };

        let mut report = UserImportReport::default();
        for row in &document.rows {
            let user = match parse_user(row, &columns) {
                Ok(user) => user,
                Err(message) => {
                    report.failed += 1;
                    report.errors.push(RowError {
                        row_number: row.line,
                        raw_ticket_id: String::new(),
                        raw_username: row.cell(columns.username).unwrap_or_default().to_string(),
                        message,
                    });
                    continue;
                }
            };

            match self.store.upsert(&user).await? {
                UpsertOutcome::Created => report.created += 1,
                UpsertOutcome::Updated => report.updated += 1,
            }
        }

        Ok(report)
    }
}

fn parse_user(row: &CsvRow, columns: &Columns) -> Result<NewUser, String> {
    let username =
        Username::new(row.cell(columns.username).unwrap_or_default()).map_err(|e| e.to_string())?;
    let email =
        EmailAddress::new(row.cell(columns.email).unwrap_or_default()).map_err(|e| e.to_string())?;
    let excluded_from_surveys = parse_flag(row.cell(columns.excluded).unwrap_or_default())?;
    let optional = |index| {
        row.cell(index)
            .filter(|s: &&str| !s.is_empty())
            .map(str::to_string)
    };

    Ok(NewUser {
        username,
        email,
        first_name: optional(columns.first_name),
        last_name: optional(columns.last_name),
        excluded_from_surveys,
    })
}

/// Parses the exclusion flag; an empty cell means "not excluded".
pub fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "false" | "no" | "nein" => Ok(false),
        "1" | "true" | "yes" | "ja" | "x" => Ok(true),
        other => Err(format!("Invalid value for {}: '{}'", EXCLUDED_COLUMN, other)),
    }
}
