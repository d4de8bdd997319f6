//! Admin credential and session repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::AdminSessionEntity;
use crate::metrics::{QueryTimer, Table};

/// Repository for the admin password and login sessions.
#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    /// Creates a new AdminRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the stored password hash, seeding it with `initial_hash` on first use.
    pub async fn get_or_init_password_hash(&self, initial_hash: &str) -> Result<String, sqlx::Error> {
        let timer = QueryTimer::new(Table::AdminSettings, "get_or_init");

        sqlx::query(
            "INSERT INTO admin_settings (id, password_hash, updated_at) VALUES (1, $1, NOW()) ON CONFLICT (id) DO NOTHING",
        )
        .bind(initial_hash)
        .execute(&self.pool)
        .await?;

        let result: Result<(String,), sqlx::Error> =
            sqlx::query_as("SELECT password_hash FROM admin_settings WHERE id = 1")
                .fetch_one(&self.pool)
                .await;
        timer.finish(&result);
        Ok(result?.0)
    }

    /// Stores a new password hash.
    pub async fn set_password_hash(&self, password_hash: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new(Table::AdminSettings, "update");
        let result = sqlx::query(
            r#"
            INSERT INTO admin_settings (id, password_hash, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE SET password_hash = EXCLUDED.password_hash, updated_at = NOW()
            "#,
        )
        .bind(password_hash)
        .execute(&self.pool)
        .await;
        timer.finish(&result);
        result.map(|_| ())
    }

    /// Create a session for a hashed token.
    pub async fn create_session(
        &self,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AdminSessionEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::AdminSessions, "insert");
        let result = sqlx::query_as::<_, AdminSessionEntity>(
            r#"
            INSERT INTO admin_sessions (token_hash, created_at, last_used_at, expires_at)
            VALUES ($1, NOW(), NOW(), $2)
            RETURNING id, token_hash, created_at, last_used_at, expires_at
            "#,
        )
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find an unexpired session and mark it as used.
    pub async fn touch_valid_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<AdminSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::AdminSessions, "touch");
        let result = sqlx::query_as::<_, AdminSessionEntity>(
            r#"
            UPDATE admin_sessions SET last_used_at = NOW()
            WHERE token_hash = $1 AND expires_at > NOW()
            RETURNING id, token_hash, created_at, last_used_at, expires_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Delete one session.
    pub async fn delete_session(&self, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session except the given one.
    pub async fn delete_other_sessions(&self, keep_token_hash: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE token_hash <> $1")
            .bind(keep_token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove expired sessions.
    pub async fn delete_expired_sessions(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
