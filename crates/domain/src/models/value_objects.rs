//! Validated value objects for CSV-derived data.
//!
//! All constructors trim their input and reject invalid values, so a
//! `TicketId`, `Username`, `EmailAddress` or `TicketName` always holds a
//! valid value.

use crate::errors::ValueObjectError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_TICKET_ID_LENGTH: usize = 50;
pub const MAX_USERNAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_TICKET_NAME_LENGTH: usize = 255;

lazy_static::lazy_static! {
    static ref TICKET_ID_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-/#]*$").unwrap();
    static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9._@\-]+$").unwrap();
    static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$").unwrap();
}

/// Identifier of a support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(String);

impl TicketId {
    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        let invalid = |reason: &str| ValueObjectError::InvalidTicketId {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if trimmed.chars().count() > MAX_TICKET_ID_LENGTH {
            return Err(invalid("must be at most 50 characters"));
        }
        if !TICKET_ID_REGEX.is_match(trimmed) {
            return Err(invalid(
                "must start with a letter or digit and contain only letters, digits, '.', '_', '-', '/' or '#'",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Login name that links CSV rows to registered users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        let invalid = |reason: &str| ValueObjectError::InvalidUsername {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if trimmed.chars().count() > MAX_USERNAME_LENGTH {
            return Err(invalid("must be at most 100 characters"));
        }
        if !USERNAME_REGEX.is_match(trimmed) {
            return Err(invalid(
                "may only contain letters, digits, '.', '_', '-' or '@'",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Recipient address, stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        let normalized = value.trim().to_lowercase();
        let invalid = |reason: &str| ValueObjectError::InvalidEmailAddress {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if normalized.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if normalized.len() > MAX_EMAIL_LENGTH {
            return Err(invalid("must be at most 254 characters"));
        }
        if !EMAIL_REGEX.is_match(&normalized) {
            return Err(invalid("is not a valid email address"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional ticket label. Empty input means "no name".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketName(String);

impl TicketName {
    /// Builds a name from an optional CSV cell; a blank cell yields `None`.
    pub fn from_optional(value: Option<&str>) -> Result<Option<Self>, ValueObjectError> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(trimmed) => Self::new(trimmed).map(Some),
        }
    }

    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::InvalidTicketName {
                reason: "must not be empty".to_string(),
            });
        }
        if trimmed.chars().count() > MAX_TICKET_NAME_LENGTH {
            return Err(ValueObjectError::InvalidTicketName {
                reason: "must be at most 255 characters".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_value_object {
    ($($ty:ident),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl TryFrom<String> for $ty {
                type Error = ValueObjectError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(&value)
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.0
                }
            }

            impl AsRef<str> for $ty {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }
        )+
    };
}

string_value_object!(TicketId, Username, EmailAddress, TicketName);
