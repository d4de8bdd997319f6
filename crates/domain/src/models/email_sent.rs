//! Email log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::email_status::EmailStatus;

/// One append-only email log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSent {
    pub id: i64,
    pub ticket_id: String,
    pub username: String,
    pub email: String,
    pub ticket_name: Option<String>,
    pub subject: String,
    pub status: EmailStatus,
    pub test_mode: bool,
    pub sent_at: DateTime<Utc>,
}

/// Email log entry before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmailSent {
    pub ticket_id: String,
    pub username: String,
    pub email: String,
    pub ticket_name: Option<String>,
    pub subject: String,
    pub status: EmailStatus,
    pub test_mode: bool,
}

/// Coarse status filter for the email log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatusFilter {
    Sent,
    Skipped,
    Error,
}

impl EmailStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatusFilter::Sent => "sent",
            EmailStatusFilter::Skipped => "skipped",
            EmailStatusFilter::Error => "error",
        }
    }

    /// SQL `LIKE` pattern matching the persisted status literals.
    pub fn like_pattern(&self) -> &'static str {
        match self {
            EmailStatusFilter::Sent => "Versendet",
            EmailStatusFilter::Skipped => "Übersprungen%",
            EmailStatusFilter::Error => "Fehler: %",
        }
    }

    pub fn matches(&self, status: &EmailStatus) -> bool {
        match self {
            EmailStatusFilter::Sent => status.is_sent(),
            EmailStatusFilter::Skipped => status.is_skipped(),
            EmailStatusFilter::Error => status.is_error(),
        }
    }
}

impl FromStr for EmailStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sent" => Ok(EmailStatusFilter::Sent),
            "skipped" => Ok(EmailStatusFilter::Skipped),
            "error" => Ok(EmailStatusFilter::Error),
            _ => Err(format!("Invalid status filter: {}", s)),
        }
    }
}

impl fmt::Display for EmailStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query parameters for the email log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailLogQuery {
    pub status: Option<EmailStatusFilter>,
    pub ticket_id: Option<String>,
    pub username: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// One page of the email log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLogPage {
    pub data: Vec<EmailSent>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
