//! Query timing and connection pool gauges for the survey database.
//!
//! - `ticket_survey_db_query_duration_seconds{table,operation,outcome}`
//! - `ticket_survey_db_pool_connections{state}` with `in_use` and `idle`

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

pub const QUERY_DURATION_METRIC: &str = "ticket_survey_db_query_duration_seconds";
pub const POOL_CONNECTIONS_METRIC: &str = "ticket_survey_db_pool_connections";

/// Table a timed query works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    EmailSent,
    CsvFieldConfigs,
    SmtpConfigs,
    AdminSettings,
    AdminSessions,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::EmailSent => "email_sent",
            Self::CsvFieldConfigs => "csv_field_configs",
            Self::SmtpConfigs => "smtp_configs",
            Self::AdminSettings => "admin_settings",
            Self::AdminSessions => "admin_sessions",
        }
    }
}

/// `ok`, `not_found` for an empty `fetch_one`, `error` otherwise.
fn outcome_label<T>(result: &Result<T, sqlx::Error>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(sqlx::Error::RowNotFound) => "not_found",
        Err(_) => "error",
    }
}

/// Publishes pool occupancy; called on every `/metrics` scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!(POOL_CONNECTIONS_METRIC, "state" => "in_use").set(size.saturating_sub(idle) as f64);
    gauge!(POOL_CONNECTIONS_METRIC, "state" => "idle").set(idle as f64);
}

/// Times one repository call.
///
/// ```ignore
/// let timer = QueryTimer::new(Table::EmailSent, "exists");
/// let result = sqlx::query_as(...).fetch_one(&pool).await;
/// timer.finish(&result);
/// ```
pub struct QueryTimer {
    table: Table,
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(table: Table, operation: &'static str) -> Self {
        Self {
            table,
            operation,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time, labelled with the outcome of `result`.
    pub fn finish<T>(self, result: &Result<T, sqlx::Error>) {
        histogram!(
            QUERY_DURATION_METRIC,
            "table" => self.table.as_str(),
            "operation" => self.operation,
            "outcome" => outcome_label(result)
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_label() {
        assert_eq!(outcome_label(&Ok::<_, sqlx::Error>(3)), "ok");
        assert_eq!(outcome_label::<()>(&Err(sqlx::Error::RowNotFound)), "not_found");
        assert_eq!(outcome_label::<()>(&Err(sqlx::Error::PoolTimedOut)), "error");
    }

    #[test]
    fn test_table_labels_match_migrations() {
        assert_eq!(Table::EmailSent.as_str(), "email_sent");
        assert_eq!(Table::CsvFieldConfigs.as_str(), "csv_field_configs");
        assert_eq!(Table::AdminSessions.as_str(), "admin_sessions");
    }

    #[test]
    fn test_finish_without_recorder_is_noop() {
        let timer = QueryTimer::new(Table::Users, "upsert");
        timer.finish(&Err::<(), _>(sqlx::Error::PoolClosed));
    }
}
