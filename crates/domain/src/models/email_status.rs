//! Persisted outcome of a survey email attempt.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const SENT: &str = "Versendet";
const SKIPPED: &str = "Übersprungen";
const SKIPPED_PREFIX: &str = "Übersprungen: ";
const ERROR_PREFIX: &str = "Fehler: ";

/// Why a ticket was not mailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    AlreadyProcessed,
    ExcludedFromSurveys,
    Unspecified,
}

impl SkipReason {
    /// Code used in API payloads and event logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::AlreadyProcessed => "already_processed",
            SkipReason::ExcludedFromSurveys => "excluded_from_surveys",
            SkipReason::Unspecified => "unspecified",
        }
    }

    fn label(&self) -> Option<&'static str> {
        match self {
            SkipReason::AlreadyProcessed => Some("bereits verarbeitet"),
            SkipReason::ExcludedFromSurveys => Some("von Umfragen ausgeschlossen"),
            SkipReason::Unspecified => None,
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of one dispatch decision, stored as a single text column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmailStatus {
    Sent,
    Skipped(SkipReason),
    Error(String),
}

impl EmailStatus {
    pub fn as_string(&self) -> String {
        match self {
            EmailStatus::Sent => SENT.to_string(),
            EmailStatus::Skipped(reason) => match reason.label() {
                Some(label) => format!("{}{}", SKIPPED_PREFIX, label),
                None => SKIPPED.to_string(),
            },
            EmailStatus::Error(message) => format!("{}{}", ERROR_PREFIX, message),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, EmailStatus::Sent)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, EmailStatus::Skipped(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EmailStatus::Error(_))
    }

    pub fn sent_literal() -> &'static str {
        SENT
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl FromStr for EmailStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == SENT {
            return Ok(EmailStatus::Sent);
        }
        if s == SKIPPED {
            return Ok(EmailStatus::Skipped(SkipReason::Unspecified));
        }
        if let Some(message) = s.strip_prefix(ERROR_PREFIX) {
            return Ok(EmailStatus::Error(message.to_string()));
        }
        if let Some(label) = s.strip_prefix(SKIPPED_PREFIX) {
            return [SkipReason::AlreadyProcessed, SkipReason::ExcludedFromSurveys]
                .into_iter()
                .find(|reason| reason.label() == Some(label))
                .map(EmailStatus::Skipped)
                .ok_or_else(|| format!("Unknown skip reason: {}", label));
        }
        Err(format!("Invalid email status: {}", s))
    }
}

impl Serialize for EmailStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for EmailStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(EmailStatus::Sent.as_string(), "Versendet");
        assert_eq!(
            EmailStatus::Skipped(SkipReason::AlreadyProcessed).as_string(),
            "Übersprungen: bereits verarbeitet"
        );
        assert_eq!(
            EmailStatus::Skipped(SkipReason::ExcludedFromSurveys).as_string(),
            "Übersprungen: von Umfragen ausgeschlossen"
        );
        assert_eq!(
            EmailStatus::Skipped(SkipReason::Unspecified).as_string(),
            "Übersprungen"
        );
        assert_eq!(
            EmailStatus::Error("SMTP timeout".to_string()).as_string(),
            "Fehler: SMTP timeout"
        );
    }

    #[test]
    fn test_round_trip() {
        let statuses = vec![
            EmailStatus::Sent,
            EmailStatus::Skipped(SkipReason::AlreadyProcessed),
            EmailStatus::Skipped(SkipReason::ExcludedFromSurveys),
            EmailStatus::Skipped(SkipReason::Unspecified),
            EmailStatus::Error("550 mailbox unavailable".to_string()),
            EmailStatus::Error(String::new()),
            EmailStatus::Error("Fehler: nested".to_string()),
        ];
        for status in statuses {
            assert_eq!(status.as_string().parse::<EmailStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("sent".parse::<EmailStatus>().is_err());
        assert!("Übersprungen: unbekannt".parse::<EmailStatus>().is_err());
        assert!("".parse::<EmailStatus>().is_err());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&EmailStatus::Sent).unwrap();
        assert_eq!(json, "\"Versendet\"");
        let parsed: EmailStatus =
            serde_json::from_str("\"Übersprungen: bereits verarbeitet\"").unwrap();
        assert_eq!(parsed, EmailStatus::Skipped(SkipReason::AlreadyProcessed));
    }
}
