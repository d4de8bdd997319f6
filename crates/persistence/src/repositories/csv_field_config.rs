//! CSV column mapping repository.

use domain::models::CsvFieldConfig;
use sqlx::PgPool;

use crate::entities::CsvFieldConfigEntity;
use crate::metrics::{QueryTimer, Table};

/// Repository for the single-row CSV column mapping.
#[derive(Clone)]
pub struct CsvFieldConfigRepository {
    pool: PgPool,
}

impl CsvFieldConfigRepository {
    /// Creates a new CsvFieldConfigRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the mapping, creating the default row if it is missing.
    pub async fn get_or_create(&self) -> Result<CsvFieldConfigEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::CsvFieldConfigs, "get_or_create");

        sqlx::query("INSERT INTO csv_field_configs (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(&self.pool)
            .await?;

        let result = sqlx::query_as::<_, CsvFieldConfigEntity>(
            r#"
            SELECT ticket_id_field, username_field, ticket_name_field, created_field, updated_at
            FROM csv_field_configs
            WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Replaces the mapping.
    pub async fn update(&self, config: &CsvFieldConfig) -> Result<CsvFieldConfigEntity, sqlx::Error> {
        let timer = QueryTimer::new(Table::CsvFieldConfigs, "update");
        let result = sqlx::query_as::<_, CsvFieldConfigEntity>(
            r#"
            INSERT INTO csv_field_configs (id, ticket_id_field, username_field, ticket_name_field, created_field, updated_at)
            VALUES (1, $1, $2, $3, $4, NOW())
            ON CONFLICT (id) DO UPDATE SET
                ticket_id_field = EXCLUDED.ticket_id_field,
                username_field = EXCLUDED.username_field,
                ticket_name_field = EXCLUDED.ticket_name_field,
                created_field = EXCLUDED.created_field,
                updated_at = NOW()
            RETURNING ticket_id_field, username_field, ticket_name_field, created_field, updated_at
            "#,
        )
        .bind(&config.ticket_id_field)
        .bind(&config.username_field)
        .bind(&config.ticket_name_field)
        .bind(&config.created_field)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }
}
