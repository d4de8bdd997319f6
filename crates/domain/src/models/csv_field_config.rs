//! Configurable CSV column mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_TICKET_ID_FIELD: &str = "ticketId";
pub const DEFAULT_USERNAME_FIELD: &str = "username";
pub const DEFAULT_TICKET_NAME_FIELD: &str = "ticketName";
pub const DEFAULT_CREATED_FIELD: &str = "Erstellt";

/// Maps CSV header names to the canonical ticket fields.
///
/// There is exactly one persisted instance; it is created with the defaults
/// on first read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvFieldConfig {
    pub ticket_id_field: String,
    pub username_field: String,
    pub ticket_name_field: String,
    pub created_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for CsvFieldConfig {
    fn default() -> Self {
        Self {
            ticket_id_field: DEFAULT_TICKET_ID_FIELD.to_string(),
            username_field: DEFAULT_USERNAME_FIELD.to_string(),
            ticket_name_field: DEFAULT_TICKET_NAME_FIELD.to_string(),
            created_field: DEFAULT_CREATED_FIELD.to_string(),
            updated_at: None,
        }
    }
}

impl CsvFieldConfig {
    pub fn ticket_id_field(&self) -> &str {
        &self.ticket_id_field
    }

    pub fn username_field(&self) -> &str {
        &self.username_field
    }

    pub fn ticket_name_field(&self) -> &str {
        &self.ticket_name_field
    }

    pub fn created_field(&self) -> &str {
        &self.created_field
    }

    /// Columns a survey CSV must contain.
    pub fn required_fields(&self) -> [&str; 2] {
        [&self.ticket_id_field, &self.username_field]
    }
}

/// Request payload for updating the column mapping.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCsvFieldConfigRequest {
    #[validate(custom(function = "shared::validation::validate_column_name"))]
    pub ticket_id_field: String,

    #[validate(custom(function = "shared::validation::validate_column_name"))]
    pub username_field: String,

    #[validate(custom(function = "shared::validation::validate_column_name"))]
    pub ticket_name_field: String,

    #[validate(custom(function = "shared::validation::validate_column_name"))]
    pub created_field: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CsvFieldConfig::default();
        assert_eq!(config.ticket_id_field(), "ticketId");
        assert_eq!(config.username_field(), "username");
        assert_eq!(config.ticket_name_field(), "ticketName");
        assert_eq!(config.created_field(), "Erstellt");
        assert_eq!(config.required_fields(), ["ticketId", "username"]);
    }

    #[test]
    fn test_update_request_validation() {
        let request = UpdateCsvFieldConfigRequest {
            ticket_id_field: "Ticket".to_string(),
            username_field: "Benutzer".to_string(),
            ticket_name_field: "Titel".to_string(),
            created_field: "Erstellt am".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = UpdateCsvFieldConfigRequest {
            ticket_id_field: "".to_string(),
            username_field: "x".repeat(51),
            ..request
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("ticket_id_field"));
        assert!(fields.contains_key("username_field"));
        assert!(!fields.contains_key("created_field"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(CsvFieldConfig::default()).unwrap();
        assert_eq!(json["ticketIdField"], "ticketId");
        assert_eq!(json["createdField"], "Erstellt");
        assert!(json.get("updatedAt").is_none());
    }
}
