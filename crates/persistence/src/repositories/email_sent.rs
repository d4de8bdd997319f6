//! Email log repository for database operations.

use chrono::{DateTime, Utc};
use domain::errors::RepositoryError;
use domain::models::{EmailStatus, NewEmailSent};
use domain::services::EmailSentStore;
use sqlx::PgPool;

use crate::entities::{EmailSentEntity, EmailStatsEntity};
use crate::metrics::{QueryTimer, Table};
use crate::repository_error;

/// Query parameters for email log pagination.
#[derive(Debug, Clone, Default)]
pub struct EmailLogFilter {
    /// SQL `LIKE` pattern on the status column.
    pub status_pattern: Option<String>,
    pub ticket_id: Option<String>,
    pub username: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub cursor_sent_at: Option<DateTime<Utc>>,
    pub cursor_id: Option<i64>,
    pub limit: i64,
}

/// Repository for email log database operations.
#[derive(Clone)]
pub struct EmailSentRepository {
    pool: PgPool,
}

impl EmailSentRepository {
    /// Creates a new EmailSentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// True if a real (non-test) delivery was logged for the ticket and user.
    pub async fn exists_sent(&self, ticket_id: &str, username: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new(Table::EmailSent, "exists");
        let result: Result<(bool,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM email_sent
                WHERE ticket_id = $1 AND username = $2
                  AND status = $3 AND test_mode = FALSE
            )
            "#,
        )
        .bind(ticket_id)
        .bind(username)
        .bind(EmailStatus::sent_literal())
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.0)
    }

    /// Append a log entry.
    pub async fn insert(&self, record: &NewEmailSent) -> Result<EmailSentEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::EmailSent, "insert");
        let result = sqlx::query_as::<_, EmailSentEntity>(
            r#"
            INSERT INTO email_sent (ticket_id, username, email, ticket_name, subject, status, test_mode, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id, ticket_id, username, email, ticket_name, subject, status, test_mode, sent_at
            "#,
        )
        .bind(&record.ticket_id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.ticket_name)
        .bind(&record.subject)
        .bind(record.status.as_string())
        .bind(record.test_mode)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// List log entries newest first with keyset pagination.
    pub async fn list(
        &self,
        filter: &EmailLogFilter,
    ) -> Result<(Vec<EmailSentEntity>, bool), sqlx::Error> {
        let timer = QueryTimer::new(Table::EmailSent, "list");

        // Fetch limit + 1 to determine if more results exist
        let fetch_limit = filter.limit + 1;

        let rows = sqlx::query_as::<_, EmailSentEntity>(
            r#"
            SELECT id, ticket_id, username, email, ticket_name, subject, status, test_mode, sent_at
            FROM email_sent
            WHERE ($1::text IS NULL OR status LIKE $1)
              AND ($2::text IS NULL OR ticket_id = $2)
              AND ($3::text IS NULL OR username = $3)
              AND ($4::timestamptz IS NULL OR sent_at >= $4)
              AND ($5::timestamptz IS NULL OR sent_at <= $5)
              AND ($6::timestamptz IS NULL OR (sent_at, id) < ($6, $7))
            ORDER BY sent_at DESC, id DESC
            LIMIT $8
            "#,
        )
        .bind(&filter.status_pattern)
        .bind(&filter.ticket_id)
        .bind(&filter.username)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.cursor_sent_at)
        .bind(filter.cursor_id.unwrap_or(i64::MAX))
        .bind(fetch_limit)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&rows);
        let rows = rows?;

        let has_more = rows.len() as i64 > filter.limit;
        let mut result = rows;
        if has_more {
            result.pop();
        }

        Ok((result, has_more))
    }

    /// Aggregate counts over real (non-test) entries.
    pub async fn stats(&self) -> Result<EmailStatsEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::EmailSent, "stats");
        let result = sqlx::query_as::<_, EmailStatsEntity>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'Versendet') AS sent,
                COUNT(*) FILTER (WHERE status LIKE 'Übersprungen%') AS skipped,
                COUNT(*) FILTER (WHERE status LIKE 'Fehler: %') AS failed,
                COUNT(*) FILTER (WHERE status = 'Versendet' AND sent_at >= NOW() - INTERVAL '7 days') AS sent_last_7_days,
                COUNT(*) FILTER (WHERE status = 'Versendet' AND sent_at >= NOW() - INTERVAL '30 days') AS sent_last_30_days,
                MAX(sent_at) FILTER (WHERE status = 'Versendet') AS last_sent_at
            FROM email_sent
            WHERE test_mode = FALSE
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }
}

#[async_trait::async_trait]
impl EmailSentStore for EmailSentRepository {
    async fn exists_for_ticket(
        &self,
        ticket_id: &str,
        username: &str,
    ) -> Result<bool, RepositoryError> {
        self.exists_sent(ticket_id, username)
            .await
            .map_err(|e| repository_error("exists_for_ticket", e))
    }

    async fn save(&self, record: &NewEmailSent) -> Result<(), RepositoryError> {
        self.insert(record)
            .await
            .map(|_| ())
            .map_err(|e| repository_error("save_email_sent", e))
    }
}
