//! SMTP settings entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{SmtpConfig, SmtpEncryption};
use sqlx::FromRow;

/// Database row mapping for the smtp_configs table.
#[derive(Debug, Clone, FromRow)]
pub struct SmtpConfigEntity {
    pub host: String,
    pub port: i32,
    pub username: Option<String>,
    pub password: Option<String>,
    pub encryption: String,
    pub sender_email: String,
    pub sender_name: String,
    pub test_email: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<SmtpConfigEntity> for SmtpConfig {
    fn from(entity: SmtpConfigEntity) -> Self {
        Self {
            host: entity.host,
            // The column is constrained to 1..=65535
            port: u16::try_from(entity.port).unwrap_or_default(),
            username: entity.username,
            password: entity.password,
            encryption: entity
                .encryption
                .parse()
                .unwrap_or(SmtpEncryption::StartTls),
            sender_email: entity.sender_email,
            sender_name: entity.sender_name,
            test_email: entity.test_email,
            updated_at: Some(entity.updated_at),
        }
    }
}
