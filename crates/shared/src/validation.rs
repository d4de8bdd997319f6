//! Custom validators for admin form input.
//!
//! These plug into `#[validate(custom(function = ...))]` on request DTOs.

use validator::ValidationError;

/// Maximum length of a configurable CSV column name.
pub const MAX_COLUMN_NAME_LENGTH: usize = 50;

/// Allowed values for the SMTP encryption setting.
pub const SMTP_ENCRYPTION_MODES: [&str; 3] = ["none", "starttls", "tls"];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a string is not empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value must not be blank"))
    } else {
        Ok(())
    }
}

/// Validates a CSV column name: non-blank, no surrounding whitespace, at most 50 chars.
pub fn validate_column_name(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value)?;

    if value.trim() != value {
        return Err(error(
            "column_name_whitespace",
            "Column name must not start or end with whitespace",
        ));
    }

    if value.chars().count() > MAX_COLUMN_NAME_LENGTH {
        return Err(error(
            "column_name_length",
            "Column name must be at most 50 characters",
        ));
    }

    Ok(())
}

/// Validates the SMTP encryption mode.
pub fn validate_smtp_encryption(value: &str) -> Result<(), ValidationError> {
    if SMTP_ENCRYPTION_MODES.contains(&value) {
        Ok(())
    } else {
        Err(error(
            "smtp_encryption",
            "Encryption must be one of: none, starttls, tls",
        ))
    }
}

/// Validates an SMTP port (non-zero).
pub fn validate_smtp_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        Err(error("smtp_port", "Port must be between 1 and 65535"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("x").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_column_name() {
        assert!(validate_column_name("ticketId").is_ok());
        assert!(validate_column_name("Erstellt").is_ok());
        assert!(validate_column_name("Ticket Nummer").is_ok());
        assert!(validate_column_name(" ticketId").is_err());
        assert!(validate_column_name("").is_err());
        assert!(validate_column_name(&"a".repeat(50)).is_ok());
        assert!(validate_column_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_column_name_error_message() {
        let err = validate_column_name(&"b".repeat(60)).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Column name must be at most 50 characters"
        );
    }

    #[test]
    fn test_validate_smtp_encryption() {
        assert!(validate_smtp_encryption("none").is_ok());
        assert!(validate_smtp_encryption("starttls").is_ok());
        assert!(validate_smtp_encryption("tls").is_ok());
        assert!(validate_smtp_encryption("ssl").is_err());
        assert!(validate_smtp_encryption("TLS").is_err());
    }

    #[test]
    fn test_validate_smtp_port() {
        assert!(validate_smtp_port(587).is_ok());
        assert!(validate_smtp_port(0).is_err());
    }
}
