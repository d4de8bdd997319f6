//! Domain models for the ticket survey mailer.

pub mod csv_field_config;
pub mod dashboard;
pub mod dispatch;
pub mod email_sent;
pub mod email_status;
pub mod smtp_config;
pub mod ticket;
pub mod user;
pub mod value_objects;

pub use csv_field_config::{CsvFieldConfig, UpdateCsvFieldConfigRequest};
pub use dashboard::{DashboardStats, EmailStats, UserStats};
pub use dispatch::{DispatchOptions, DispatchReport, DispatchSummary, TicketOutcome};
pub use email_sent::{EmailLogPage, EmailLogQuery, EmailSent, EmailStatusFilter, NewEmailSent};
pub use email_status::{EmailStatus, SkipReason};
pub use smtp_config::{
    SmtpConfig, SmtpConfigResponse, SmtpEncryption, SmtpTestRequest, UpdateSmtpConfigRequest,
};
pub use ticket::{CsvPreview, CsvProcessingResult, RowError, TicketData, ValidTicket};
pub use user::{
    CreateUserRequest, ListUsersQuery, NewUser, UpdateUserRequest, UpsertOutcome, User,
};
pub use value_objects::{EmailAddress, TicketId, TicketName, Username};
