//! Admin session entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the admin_sessions table.
///
/// Only the SHA-256 hash of the session token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct AdminSessionEntity {
    pub id: i64,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSessionEntity {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
