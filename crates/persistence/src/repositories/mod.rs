//! Repository implementations for database operations.

pub mod admin;
pub mod csv_field_config;
pub mod email_sent;
pub mod smtp_config;
pub mod user;

pub use admin::AdminRepository;
pub use csv_field_config::CsvFieldConfigRepository;
pub use email_sent::{EmailLogFilter, EmailSentRepository};
pub use smtp_config::SmtpConfigRepository;
pub use user::{UserChanges, UserRepository};
