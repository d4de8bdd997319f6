//! CSV column mapping entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the csv_field_configs table.
#[derive(Debug, Clone, FromRow)]
pub struct CsvFieldConfigEntity {
    pub ticket_id_field: String,
    pub username_field: String,
    pub ticket_name_field: String,
    pub created_field: String,
    pub updated_at: DateTime<Utc>,
}

impl From<CsvFieldConfigEntity> for domain::models::CsvFieldConfig {
    fn from(entity: CsvFieldConfigEntity) -> Self {
        Self {
            ticket_id_field: entity.ticket_id_field,
            username_field: entity.username_field,
            ticket_name_field: entity.ticket_name_field,
            created_field: entity.created_field,
            updated_at: Some(entity.updated_at),
        }
    }
}
