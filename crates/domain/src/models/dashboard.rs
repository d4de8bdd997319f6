//! Admin dashboard statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Email counts over the whole log, test-mode rows excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStats {
    pub total: i64,
    pub sent: i64,
    pub skipped: i64,
    pub failed: i64,
    pub sent_last_7_days: i64,
    pub sent_last_30_days: i64,
}

/// User registry counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: i64,
    pub excluded: i64,
}

/// Dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub emails: EmailStats,
    pub users: UserStats,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}
