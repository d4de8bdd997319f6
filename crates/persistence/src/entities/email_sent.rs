//! Email log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{EmailSent, EmailStatus, SkipReason};
use sqlx::FromRow;

/// Database row mapping for the email_sent table.
#[derive(Debug, Clone, FromRow)]
pub struct EmailSentEntity {
    pub id: i64,
    pub ticket_id: String,
    pub username: String,
    pub email: String,
    pub ticket_name: Option<String>,
    pub subject: String,
    pub status: String,
    pub test_mode: bool,
    pub sent_at: DateTime<Utc>,
}

impl From<EmailSentEntity> for EmailSent {
    fn from(entity: EmailSentEntity) -> Self {
        let status = entity.status.parse().unwrap_or_else(|_| {
            tracing::warn!(id = entity.id, status = %entity.status, "Unknown email status in log");
            EmailStatus::Skipped(SkipReason::Unspecified)
        });

        Self {
            id: entity.id,
            ticket_id: entity.ticket_id,
            username: entity.username,
            email: entity.email,
            ticket_name: entity.ticket_name,
            subject: entity.subject,
            status,
            test_mode: entity.test_mode,
            sent_at: entity.sent_at,
        }
    }
}

/// Aggregate counts for the dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct EmailStatsEntity {
    pub total: i64,
    pub sent: i64,
    pub skipped: i64,
    pub failed: i64,
    pub sent_last_7_days: i64,
    pub sent_last_30_days: i64,
    pub last_sent_at: Option<DateTime<Utc>>,
}
