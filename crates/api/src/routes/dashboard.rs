//! Dashboard statistics.

use axum::{extract::State, Json};
use chrono::Utc;
use domain::models::{DashboardStats, EmailStats, UserStats};
use persistence::entities::EmailStatsEntity;
use persistence::repositories::{EmailSentRepository, UserRepository};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/admin/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    let emails = EmailSentRepository::new(state.pool.clone()).stats().await?;
    let (total_users, excluded_users) = UserRepository::new(state.pool.clone())
        .count_stats()
        .await?;

    Ok(Json(build_stats(emails, total_users, excluded_users)))
}

fn build_stats(emails: EmailStatsEntity, total_users: i64, excluded_users: i64) -> DashboardStats {
    DashboardStats {
        last_sent_at: emails.last_sent_at,
        emails: EmailStats {
            total: emails.total,
            sent: emails.sent,
            skipped: emails.skipped,
            failed: emails.failed,
            sent_last_7_days: emails.sent_last_7_days,
            sent_last_30_days: emails.sent_last_30_days,
        },
        users: UserStats {
            total: total_users,
            excluded: excluded_users,
        },
        generated_at: Utc::now(),
    }
}
