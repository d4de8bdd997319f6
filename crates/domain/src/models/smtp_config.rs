//! SMTP delivery settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Transport security for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpEncryption {
    None,
    StartTls,
    Tls,
}

impl SmtpEncryption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmtpEncryption::None => "none",
            SmtpEncryption::StartTls => "starttls",
            SmtpEncryption::Tls => "tls",
        }
    }
}

impl FromStr for SmtpEncryption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SmtpEncryption::None),
            "starttls" => Ok(SmtpEncryption::StartTls),
            "tls" => Ok(SmtpEncryption::Tls),
            _ => Err(format!("Invalid SMTP encryption: {}", s)),
        }
    }
}

impl fmt::Display for SmtpEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single persisted SMTP configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub encryption: SmtpEncryption,
    pub sender_email: String,
    pub sender_name: String,
    pub test_email: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SmtpConfig {
    /// Returns true if both username and password are set.
    pub fn has_credentials(&self) -> bool {
        matches!(
            (self.username.as_deref(), self.password.as_deref()),
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty()
        )
    }
}

/// SMTP settings as returned by the API. The password is never included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpConfigResponse {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password_set: bool,
    pub encryption: SmtpEncryption,
    pub sender_email: String,
    pub sender_name: String,
    pub test_email: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<SmtpConfig> for SmtpConfigResponse {
    fn from(config: SmtpConfig) -> Self {
        Self {
            password_set: config.password.as_deref().is_some_and(|p| !p.is_empty()),
            host: config.host,
            port: config.port,
            username: config.username,
            encryption: config.encryption,
            sender_email: config.sender_email,
            sender_name: config.sender_name,
            test_email: config.test_email,
            updated_at: config.updated_at,
        }
    }
}

/// Request payload for updating the SMTP settings.
///
/// An absent `password` keeps the stored one; an empty string clears it.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSmtpConfigRequest {
    #[validate(length(min = 1, max = 255, message = "Host must be 1-255 characters"))]
    pub host: String,

    #[validate(custom(function = "shared::validation::validate_smtp_port"))]
    pub port: u16,

    #[validate(length(max = 255, message = "Username must be at most 255 characters"))]
    pub username: Option<String>,

    pub password: Option<String>,

    #[validate(custom(function = "shared::validation::validate_smtp_encryption"))]
    pub encryption: String,

    #[validate(email(message = "Invalid sender email"))]
    pub sender_email: String,

    #[validate(length(min = 1, max = 100, message = "Sender name must be 1-100 characters"))]
    pub sender_name: String,

    #[validate(email(message = "Invalid test email"))]
    pub test_email: Option<String>,
}

/// Request payload for sending a test email.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SmtpTestRequest {
    #[validate(email(message = "Invalid recipient"))]
    pub recipient: Option<String>,
}
