//! User repository for database operations.

use chrono::Utc;
use domain::errors::RepositoryError;
use domain::models::{NewUser, UpsertOutcome, User};
use domain::services::{UserDirectory, UserStore};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{UpsertedUserEntity, UserEntity};
use crate::metrics::{QueryTimer, Table};
use crate::repository_error;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, excluded_from_surveys, created_at, updated_at";

/// Partial update of a user; `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub excluded_from_surveys: Option<bool>,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by username (exact match).
    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::Users, "find_by_username");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::Users, "find_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// List users ordered by username, optionally filtered by a
    /// case-insensitive substring of username, email or name.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::Users, "list");
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE ($1::text IS NULL
                OR username ILIKE $1
                OR email ILIKE $1
                OR COALESCE(first_name, '') ILIKE $1
                OR COALESCE(last_name, '') ILIKE $1)
            ORDER BY username ASC
            "#,
            USER_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Insert a new user. Fails with a unique violation if the username exists.
    pub async fn create(&self, user: &NewUser) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::Users, "insert");
        let now = Utc::now();
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, excluded_from_surveys, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.excluded_from_surveys)
        .bind(now)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Apply a partial update. Returns `None` if the user does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        changes: &UserChanges,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new(Table::Users, "update");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                excluded_from_surveys = COALESCE($5, excluded_from_surveys),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(changes.excluded_from_surveys)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Delete a user. Returns true if a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new(Table::Users, "delete");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected() > 0)
    }

    /// Insert or update by username.
    pub async fn upsert(&self, user: &NewUser) -> Result<UpsertedUserEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::Users, "upsert");
        let result = sqlx::query_as::<_, UpsertedUserEntity>(&format!(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, excluded_from_surveys, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            ON CONFLICT (username) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = COALESCE(EXCLUDED.first_name, users.first_name),
                last_name = COALESCE(EXCLUDED.last_name, users.last_name),
                excluded_from_surveys = EXCLUDED.excluded_from_surveys,
                updated_at = NOW()
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.excluded_from_surveys)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Returns (total users, excluded users).
    pub async fn count_stats(&self) -> Result<(i64, i64), sqlx::Error> {
        let timer = QueryTimer::new(Table::Users, "stats");
        let result: Result<(i64, i64), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE excluded_from_surveys) AS excluded
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait::async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        UserRepository::find_by_username(self, username)
            .await
            .map(|found| found.map(User::from))
            .map_err(|e| repository_error("find_by_username", e))
    }
}

#[async_trait::async_trait]
impl UserStore for UserRepository {
    async fn upsert(&self, user: &NewUser) -> Result<UpsertOutcome, RepositoryError> {
        let row = UserRepository::upsert(self, user)
            .await
            .map_err(|e| repository_error("upsert_user", e))?;
        Ok(if row.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }
}
