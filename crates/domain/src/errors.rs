//! Domain error taxonomy.
//!
//! Every error family exposes a closed [`ErrorKind`], a machine-readable
//! [`ErrorContext`] and a message that is safe to show in the admin UI.
//! Row-local errors ([`ValueObjectError`], [`EmailSendingError`]) are turned
//! into per-row outcomes by the services; file-level errors
//! ([`CsvProcessingError`]) abort the whole upload.

use serde::Serialize;
use serde_json::{json, Map, Value};
use shared::password::PolicyViolation;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fallback shown when a context carries no known error type.
pub const GENERIC_USER_MESSAGE: &str =
    "Ein unerwarteter Fehler ist aufgetreten. Bitte versuchen Sie es erneut.";

/// Declares [`ErrorKind`] together with `ALL` and `as_str`, so every variant
/// is listed and coded exactly once.
macro_rules! error_kinds {
    ($($variant:ident => $code:literal,)+) => {
        /// Closed set of error kinds. Each kind has exactly one user message.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum ErrorKind {
            $($variant,)+
        }

        impl ErrorKind {
            pub const ALL: &'static [ErrorKind] = &[$(ErrorKind::$variant,)+];

            /// Machine-readable code stored under `context["type"]`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }
    };
}

error_kinds! {
    CsvMissingColumns => "csv_missing_columns",
    CsvEmptyFile => "csv_empty_file",
    CsvFileReadError => "csv_file_read_error",
    CsvInvalidStructure => "csv_invalid_structure",
    CsvTooManyRows => "csv_too_many_rows",
    ValidationRequiredField => "validation_required_field",
    ValidationInvalidFormat => "validation_invalid_format",
    ValidationTooLong => "validation_too_long",
    ValidationInvalidValue => "validation_invalid_value",
    EmailNotConfigured => "email_not_configured",
    EmailInvalidRecipient => "email_invalid_recipient",
    EmailTemplateError => "email_template_error",
    EmailConnectionFailed => "email_connection_failed",
    EmailSendFailed => "email_send_failed",
    InvalidTicketId => "invalid_ticket_id",
    InvalidUsername => "invalid_username",
    InvalidTicketName => "invalid_ticket_name",
    InvalidEmailAddress => "invalid_email_address",
    WeakPassword => "weak_password",
    RepositoryFailure => "repository_failure",
}

impl ErrorKind {
    /// Message shown to the administrator.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CsvMissingColumns => "Die CSV-Datei enthält nicht alle benötigten Spalten.",
            Self::CsvEmptyFile => "Die CSV-Datei ist leer.",
            Self::CsvFileReadError => "Die CSV-Datei konnte nicht gelesen werden.",
            Self::CsvInvalidStructure => {
                "Die CSV-Datei hat eine ungültige Struktur. Bitte prüfen Sie Trennzeichen und Spaltenanzahl."
            }
            Self::CsvTooManyRows => "Die CSV-Datei enthält zu viele Zeilen.",
            Self::ValidationRequiredField => "Bitte füllen Sie alle Pflichtfelder aus.",
            Self::ValidationInvalidFormat => "Ein Feld hat ein ungültiges Format.",
            Self::ValidationTooLong => "Ein Feld ist zu lang.",
            Self::ValidationInvalidValue => "Ein Feld enthält einen ungültigen Wert.",
            Self::EmailNotConfigured => "Der E-Mail-Versand ist nicht konfiguriert.",
            Self::EmailInvalidRecipient => "Die Empfängeradresse ist ungültig.",
            Self::EmailTemplateError => "Die E-Mail-Vorlage konnte nicht verarbeitet werden.",
            Self::EmailConnectionFailed => "Verbindung zum SMTP-Server fehlgeschlagen.",
            Self::EmailSendFailed => "Die E-Mail konnte nicht versendet werden.",
            Self::InvalidTicketId => "Ungültige Ticket-ID.",
            Self::InvalidUsername => "Ungültiger Benutzername.",
            Self::InvalidTicketName => "Ungültiger Ticket-Name.",
            Self::InvalidEmailAddress => "Ungültige E-Mail-Adresse.",
            Self::WeakPassword => "Das Passwort erfüllt nicht die Sicherheitsanforderungen.",
            Self::RepositoryFailure => GENERIC_USER_MESSAGE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown error kind: {}", s))
    }
}

/// Structured error context: a JSON object whose `type` key names the kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorContext(Map<String, Value>);

impl ErrorContext {
    pub fn new(kind: ErrorKind) -> Self {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        Self(map)
    }

    /// Wraps an arbitrary JSON object, e.g. one read back from logs.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The kind named by `type`, if present and known.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Resolves the user message for a context via its `type`.
pub fn user_message_for_context(context: &ErrorContext) -> &'static str {
    context
        .kind()
        .map(|kind| kind.user_message())
        .unwrap_or(GENERIC_USER_MESSAGE)
}

/// Common surface of every domain error.
pub trait UserFacingError: std::error::Error {
    fn kind(&self) -> ErrorKind;

    fn context(&self) -> ErrorContext;

    fn user_message(&self) -> String {
        self.kind().user_message().to_string()
    }

    /// Everything useful for a log line.
    fn debug_info(&self) -> Value {
        json!({
            "kind": self.kind().as_str(),
            "message": self.to_string(),
            "context": self.context().into_value(),
        })
    }
}

/// File-level CSV errors. These abort the whole upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvProcessingError {
    #[error("CSV is missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("CSV file is empty")]
    EmptyFile,

    #[error("Failed to read CSV file: {reason}")]
    FileReadError { reason: String },

    #[error("Invalid CSV structure at line {line}: {reason}")]
    InvalidStructure { line: u64, reason: String },

    #[error("CSV file has more than {max} data rows")]
    TooManyRows { max: usize },
}

impl UserFacingError for CsvProcessingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingColumns { .. } => ErrorKind::CsvMissingColumns,
            Self::EmptyFile => ErrorKind::CsvEmptyFile,
            Self::FileReadError { .. } => ErrorKind::CsvFileReadError,
            Self::InvalidStructure { .. } => ErrorKind::CsvInvalidStructure,
            Self::TooManyRows { .. } => ErrorKind::CsvTooManyRows,
        }
    }

    fn context(&self) -> ErrorContext {
        let ctx = ErrorContext::new(self.kind());
        match self {
            Self::MissingColumns { columns } => ctx.with("columns", json!(columns)),
            Self::EmptyFile => ctx,
            Self::FileReadError { reason } => ctx.with("reason", reason.as_str()),
            Self::InvalidStructure { line, reason } => {
                ctx.with("line", *line).with("reason", reason.as_str())
            }
            Self::TooManyRows { max } => ctx.with("max", *max),
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::MissingColumns { columns } => {
                format!("{} Fehlend: {}", self.kind().user_message(), columns.join(", "))
            }
            Self::InvalidStructure { line, .. } => {
                format!("{} (Zeile {})", self.kind().user_message(), line)
            }
            Self::TooManyRows { max } => {
                format!("{} Maximal erlaubt: {}", self.kind().user_message(), max)
            }
            _ => self.kind().user_message().to_string(),
        }
    }
}

/// Field-level errors for admin form input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    RequiredField { field: String },

    #[error("Field '{field}' has an invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        Self::RequiredField {
            field: field.to_string(),
        }
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::RequiredField { field }
            | Self::InvalidFormat { field, .. }
            | Self::TooLong { field, .. }
            | Self::InvalidValue { field, .. } => field,
        }
    }
}

impl UserFacingError for ValidationError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::RequiredField { .. } => ErrorKind::ValidationRequiredField,
            Self::InvalidFormat { .. } => ErrorKind::ValidationInvalidFormat,
            Self::TooLong { .. } => ErrorKind::ValidationTooLong,
            Self::InvalidValue { .. } => ErrorKind::ValidationInvalidValue,
        }
    }

    fn context(&self) -> ErrorContext {
        let ctx = ErrorContext::new(self.kind()).with("field", self.field());
        match self {
            Self::RequiredField { .. } => ctx,
            Self::InvalidFormat { reason, .. } | Self::InvalidValue { reason, .. } => {
                ctx.with("reason", reason.as_str())
            }
            Self::TooLong { max, .. } => ctx.with("max", *max),
        }
    }

    fn user_message(&self) -> String {
        format!("{} ({})", self.kind().user_message(), self.field())
    }
}

/// Transport and template errors. Recoverable per row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailSendingError {
    #[error("Email delivery is not configured: {reason}")]
    NotConfigured { reason: String },

    #[error("Invalid recipient address: {address}")]
    InvalidRecipient { address: String },

    #[error("Template error: {reason}")]
    Template { reason: String },

    #[error("SMTP connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    #[error("Failed to send email: {reason}")]
    SendFailed { reason: String },
}

impl UserFacingError for EmailSendingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured { .. } => ErrorKind::EmailNotConfigured,
            Self::InvalidRecipient { .. } => ErrorKind::EmailInvalidRecipient,
            Self::Template { .. } => ErrorKind::EmailTemplateError,
            Self::Connection { .. } => ErrorKind::EmailConnectionFailed,
            Self::SendFailed { .. } => ErrorKind::EmailSendFailed,
        }
    }

    fn context(&self) -> ErrorContext {
        let ctx = ErrorContext::new(self.kind());
        match self {
            Self::NotConfigured { reason }
            | Self::Template { reason }
            | Self::SendFailed { reason } => ctx.with("reason", reason.as_str()),
            Self::InvalidRecipient { address } => ctx.with("address", address.as_str()),
            Self::Connection { host, reason } => ctx
                .with("host", host.as_str())
                .with("reason", reason.as_str()),
        }
    }
}

/// Value-object construction errors. Row-local.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Invalid ticket ID '{value}': {reason}")]
    InvalidTicketId { value: String, reason: String },

    #[error("Invalid username '{value}': {reason}")]
    InvalidUsername { value: String, reason: String },

    #[error("Invalid ticket name: {reason}")]
    InvalidTicketName { reason: String },

    #[error("Invalid email address '{value}': {reason}")]
    InvalidEmailAddress { value: String, reason: String },
}

impl UserFacingError for ValueObjectError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTicketId { .. } => ErrorKind::InvalidTicketId,
            Self::InvalidUsername { .. } => ErrorKind::InvalidUsername,
            Self::InvalidTicketName { .. } => ErrorKind::InvalidTicketName,
            Self::InvalidEmailAddress { .. } => ErrorKind::InvalidEmailAddress,
        }
    }

    fn context(&self) -> ErrorContext {
        let ctx = ErrorContext::new(self.kind());
        match self {
            Self::InvalidTicketId { value, reason }
            | Self::InvalidUsername { value, reason }
            | Self::InvalidEmailAddress { value, reason } => ctx
                .with("value", value.as_str())
                .with("reason", reason.as_str()),
            Self::InvalidTicketName { reason } => ctx.with("reason", reason.as_str()),
        }
    }
}

/// The admin password violates the password policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Password does not meet policy: {}", .violations.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", "))]
pub struct WeakPasswordError {
    pub violations: Vec<PolicyViolation>,
}

impl WeakPasswordError {
    /// Returns an error if the candidate violates any policy rule.
    pub fn check(password: &str) -> Result<(), Self> {
        let violations = shared::password::check_password_policy(password);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }
}

impl UserFacingError for WeakPasswordError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::WeakPassword
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new(self.kind()).with("violations", json!(self.violations))
    }

    fn user_message(&self) -> String {
        let hints: Vec<&str> = self
            .violations
            .iter()
            .map(|v| match v {
                PolicyViolation::TooShort => "mindestens 10 Zeichen",
                PolicyViolation::MissingUppercase => "einen Großbuchstaben",
                PolicyViolation::MissingLowercase => "einen Kleinbuchstaben",
                PolicyViolation::MissingDigit => "eine Ziffer",
                PolicyViolation::MissingSpecialCharacter => "ein Sonderzeichen",
            })
            .collect();
        format!(
            "{} Benötigt: {}.",
            self.kind().user_message(),
            hints.join(", ")
        )
    }
}

/// Persistence failure surfaced through a port. Fatal for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Repository error: {0}")]
pub struct RepositoryError(pub String);

impl UserFacingError for RepositoryError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::RepositoryFailure
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new(self.kind())
    }
}

/// Errors from a CSV run that reads rows and resolves them against storage.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Csv(#[from] CsvProcessingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl UserFacingError for ProcessingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Csv(e) => e.kind(),
            Self::Repository(e) => e.kind(),
        }
    }

    fn context(&self) -> ErrorContext {
        match self {
            Self::Csv(e) => e.context(),
            Self::Repository(e) => e.context(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Csv(e) => e.user_message(),
            Self::Repository(e) => e.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_error_kind_codes_are_unique_and_parse_back() {
        let codes: HashSet<&str> = ErrorKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(codes.len(), ErrorKind::ALL.len());

        for &kind in ErrorKind::ALL {
            assert_eq!(kind.as_str().parse::<ErrorKind>().unwrap(), kind);
            assert!(!kind.user_message().is_empty());
        }
    }

    #[test]
    fn test_every_kind_is_listed_and_resolves_its_message() {
        for &kind in ErrorKind::ALL {
            let context = ErrorContext::new(kind);
            assert_eq!(user_message_for_context(&context), kind.user_message());
        }
    }

    #[test]
    fn test_context_carries_type() {
        let err = CsvProcessingError::MissingColumns {
            columns: vec!["ticketId".to_string()],
        };
        let ctx = err.context();
        assert_eq!(ctx.get("type").unwrap(), "csv_missing_columns");
        assert_eq!(ctx.get("columns").unwrap(), &json!(["ticketId"]));
        assert_eq!(ctx.kind(), Some(ErrorKind::CsvMissingColumns));
    }

    #[test]
    fn test_user_message_for_context_known_type() {
        let ctx = EmailSendingError::SendFailed {
            reason: "554 rejected".to_string(),
        }
        .context();
        assert_eq!(
            user_message_for_context(&ctx),
            "Die E-Mail konnte nicht versendet werden."
        );
    }

    #[test]
    fn test_user_message_for_context_unknown_or_missing_type() {
        let mut map = Map::new();
        map.insert("type".to_string(), json!("something_else"));
        assert_eq!(
            user_message_for_context(&ErrorContext::from_map(map)),
            GENERIC_USER_MESSAGE
        );
        assert_eq!(
            user_message_for_context(&ErrorContext::from_map(Map::new())),
            GENERIC_USER_MESSAGE
        );
    }

    #[test]
    fn test_missing_columns_user_message_lists_columns() {
        let err = CsvProcessingError::MissingColumns {
            columns: vec!["ticketId".to_string(), "username".to_string()],
        };
        assert!(err.user_message().ends_with("Fehlend: ticketId, username"));
        assert_eq!(
            err.to_string(),
            "CSV is missing required columns: ticketId, username"
        );
    }

    #[test]
    fn test_value_object_error_context() {
        let err = ValueObjectError::InvalidTicketId {
            value: "".to_string(),
            reason: "must not be empty".to_string(),
        };
        let ctx = err.context();
        assert_eq!(ctx.get("type").unwrap(), "invalid_ticket_id");
        assert_eq!(ctx.get("reason").unwrap(), "must not be empty");
        assert_eq!(err.user_message(), "Ungültige Ticket-ID.");
    }

    #[test]
    fn test_weak_password_error() {
        let err = WeakPasswordError::check("short").unwrap_err();
        assert!(err.violations.contains(&PolicyViolation::TooShort));
        assert!(err.user_message().contains("mindestens 10 Zeichen"));
        assert!(WeakPasswordError::check("Gutes#Passwort1").is_ok());
    }

    #[test]
    fn test_debug_info_includes_message_and_context() {
        let err = ValidationError::TooLong {
            field: "ticket_id_field".to_string(),
            max: 50,
        };
        let info = err.debug_info();
        assert_eq!(info["kind"], "validation_too_long");
        assert_eq!(info["context"]["field"], "ticket_id_field");
        assert_eq!(info["context"]["max"], 50);
        assert!(info["message"].as_str().unwrap().contains("at most 50"));
    }

    #[test]
    fn test_processing_error_delegates() {
        let err: ProcessingError = CsvProcessingError::EmptyFile.into();
        assert_eq!(err.kind(), ErrorKind::CsvEmptyFile);
        assert_eq!(err.user_message(), "Die CSV-Datei ist leer.");

        let err: ProcessingError = RepositoryError("down".to_string()).into();
        assert_eq!(err.user_message(), GENERIC_USER_MESSAGE);
    }
}
