//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod admin_session;
pub mod csv_field_config;
pub mod email_sent;
pub mod smtp_config;
pub mod user;

pub use admin_session::AdminSessionEntity;
pub use csv_field_config::CsvFieldConfigEntity;
pub use email_sent::{EmailSentEntity, EmailStatsEntity};
pub use smtp_config::SmtpConfigEntity;
pub use user::{UpsertedUserEntity, UserEntity};
