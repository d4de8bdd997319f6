//! SMTP settings repository.

use domain::models::SmtpConfig;
use sqlx::PgPool;

use crate::entities::SmtpConfigEntity;
use crate::metrics::{QueryTimer, Table};

const SMTP_COLUMNS: &str =
    "host, port, username, password, encryption, sender_email, sender_name, test_email, updated_at";

/// Repository for the single-row SMTP configuration.
#[derive(Clone)]
pub struct SmtpConfigRepository {
    pool: PgPool,
}

impl SmtpConfigRepository {
    /// Creates a new SmtpConfigRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the stored settings, seeding them from `defaults` on first read.
    pub async fn get_or_create(&self, defaults: &SmtpConfig) -> Result<SmtpConfigEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::SmtpConfigs, "get_or_create");

        self.write(defaults, "ON CONFLICT (id) DO NOTHING").await?;

        let result = sqlx::query_as::<_, SmtpConfigEntity>(&format!(
            "SELECT {} FROM smtp_configs WHERE id = 1",
            SMTP_COLUMNS
        ))
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Replaces the stored settings.
    pub async fn update(&self, config: &SmtpConfig) -> Result<SmtpConfigEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::SmtpConfigs, "update");
        let result = self
            .write(
                config,
                r#"ON CONFLICT (id) DO UPDATE SET
                    host = EXCLUDED.host,
                    port = EXCLUDED.port,
                    username = EXCLUDED.username,
                    password = EXCLUDED.password,
                    encryption = EXCLUDED.encryption,
                    sender_email = EXCLUDED.sender_email,
                    sender_name = EXCLUDED.sender_name,
                    test_email = EXCLUDED.test_email,
                    updated_at = NOW()"#,
            )
            .await;
        timer.finish(&result);

        result?.ok_or(sqlx::Error::RowNotFound)
    }

    async fn write(
        &self,
        config: &SmtpConfig,
        on_conflict: &str,
    ) -> Result<Option<SmtpConfigEntity>, sqlx::Error> {
        sqlx::query_as::<_, SmtpConfigEntity>(&format!(
            r#"
            INSERT INTO smtp_configs (id, host, port, username, password, encryption, sender_email, sender_name, test_email, updated_at)
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, NOW())
            {}
            RETURNING {}
            "#,
            on_conflict, SMTP_COLUMNS
        ))
        .bind(&config.host)
        .bind(i32::from(config.port))
        .bind(&config.username)
        .bind(&config.password)
        .bind(config.encryption.as_str())
        .bind(&config.sender_email)
        .bind(&config.sender_name)
        .bind(&config.test_email)
        .fetch_optional(&self.pool)
        .await
    }
}
