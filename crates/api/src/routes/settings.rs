//! CSV column mapping and SMTP settings.

use axum::{extract::State, Json};
use domain::errors::ValidationError;
use domain::models::{
    CsvFieldConfig, EmailAddress, SmtpConfig, SmtpConfigResponse, SmtpTestRequest,
    UpdateCsvFieldConfigRequest, UpdateSmtpConfigRequest,
};
use domain::services::OutgoingEmail;
use persistence::repositories::{CsvFieldConfigRepository, SmtpConfigRepository};
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::mailer::build_transport;

pub(crate) async fn load_csv_field_config(state: &AppState) -> Result<CsvFieldConfig, ApiError> {
    let repo = CsvFieldConfigRepository::new(state.pool.clone());
    Ok(repo.get_or_create().await?.into())
}

pub(crate) async fn load_smtp_config(state: &AppState) -> Result<SmtpConfig, ApiError> {
    let repo = SmtpConfigRepository::new(state.pool.clone());
    Ok(repo
        .get_or_create(&state.config.email.default_smtp())
        .await?
        .into())
}

/// GET /api/v1/admin/csv-config
pub async fn get_csv_config(
    State(state): State<AppState>,
) -> Result<Json<CsvFieldConfig>, ApiError> {
    Ok(Json(load_csv_field_config(&state).await?))
}

/// PUT /api/v1/admin/csv-config
pub async fn update_csv_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateCsvFieldConfigRequest>,
) -> Result<Json<CsvFieldConfig>, ApiError> {
    request.validate()?;

    let config = CsvFieldConfig {
        ticket_id_field: request.ticket_id_field.trim().to_string(),
        username_field: request.username_field.trim().to_string(),
        ticket_name_field: request.ticket_name_field.trim().to_string(),
        created_field: request.created_field.trim().to_string(),
        updated_at: None,
    };
    check_distinct_columns(&config)?;

    let repo = CsvFieldConfigRepository::new(state.pool.clone());
    let saved: CsvFieldConfig = repo.update(&config).await?.into();
    tracing::info!(
        ticket_id_field = %saved.ticket_id_field,
        username_field = %saved.username_field,
        "CSV column mapping updated"
    );
    Ok(Json(saved))
}

/// Two canonical fields cannot read the same column.
fn check_distinct_columns(config: &CsvFieldConfig) -> Result<(), ValidationError> {
    let columns = [
        ("ticketIdField", &config.ticket_id_field),
        ("usernameField", &config.username_field),
        ("ticketNameField", &config.ticket_name_field),
        ("createdField", &config.created_field),
    ];
    for (i, (field, column)) in columns.iter().enumerate() {
        if columns[..i].iter().any(|(_, earlier)| earlier == column) {
            return Err(ValidationError::invalid_value(
                field,
                format!("column '{}' is mapped twice", column),
            ));
        }
    }
    Ok(())
}

/// GET /api/v1/admin/smtp-config
pub async fn get_smtp_config(
    State(state): State<AppState>,
) -> Result<Json<SmtpConfigResponse>, ApiError> {
    Ok(Json(load_smtp_config(&state).await?.into()))
}

/// PUT /api/v1/admin/smtp-config
pub async fn update_smtp_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateSmtpConfigRequest>,
) -> Result<Json<SmtpConfigResponse>, ApiError> {
    request.validate()?;

    let current = load_smtp_config(&state).await?;
    let config = apply_smtp_update(current, request)?;

    let repo = SmtpConfigRepository::new(state.pool.clone());
    let saved: SmtpConfig = repo.update(&config).await?.into();
    tracing::info!(
        host = %saved.host,
        port = saved.port,
        encryption = %saved.encryption,
        "SMTP settings updated"
    );
    Ok(Json(saved.into()))
}

/// Merges a settings update into the stored configuration.
fn apply_smtp_update(
    current: SmtpConfig,
    request: UpdateSmtpConfigRequest,
) -> Result<SmtpConfig, ValidationError> {
    let non_empty = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let password = match request.password {
        None => current.password,
        Some(p) if p.is_empty() => None,
        Some(p) => Some(p),
    };

    Ok(SmtpConfig {
        host: request.host.trim().to_string(),
        port: request.port,
        username: non_empty(request.username),
        password,
        encryption: request
            .encryption
            .parse()
            .map_err(|e: String| ValidationError::invalid_value("encryption", e))?,
        sender_email: request.sender_email.trim().to_lowercase(),
        sender_name: request.sender_name.trim().to_string(),
        test_email: non_empty(request.test_email).map(|e| e.to_lowercase()),
        updated_at: current.updated_at,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpTestResponse {
    pub recipient: String,
}

/// POST /api/v1/admin/smtp-config/test
///
/// Sends one message with the stored settings.
pub async fn test_smtp_config(
    State(state): State<AppState>,
    Json(request): Json<SmtpTestRequest>,
) -> Result<Json<SmtpTestResponse>, ApiError> {
    request.validate()?;

    let smtp = load_smtp_config(&state).await?;
    let raw = request
        .recipient
        .as_deref()
        .or(smtp.test_email.as_deref())
        .ok_or_else(|| ValidationError::required("recipient"))?;
    let recipient = EmailAddress::new(raw)?;

    let transport = build_transport(&state.config.email, &smtp)?;
    transport
        .send(&OutgoingEmail {
            to: recipient.to_string(),
            to_name: None,
            subject: "SMTP-Test".to_string(),
            body: format!(
                "Diese Nachricht bestätigt, dass der Versand über {}:{} funktioniert.",
                smtp.host, smtp.port
            ),
        })
        .await?;

    tracing::info!(recipient = %recipient, host = %smtp.host, "SMTP test email sent");
    Ok(Json(SmtpTestResponse {
        recipient: recipient.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::SmtpEncryption;

    fn stored() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("mailer".to_string()),
            password: Some("geheim".to_string()),
            encryption: SmtpEncryption::StartTls,
            sender_email: "umfrage@example.com".to_string(),
            sender_name: "Ticket-Umfrage".to_string(),
            test_email: None,
            updated_at: None,
        }
    }

    fn request(password: Option<&str>) -> UpdateSmtpConfigRequest {
        UpdateSmtpConfigRequest {
            host: " mail.example.org ".to_string(),
            port: 465,
            username: Some("".to_string()),
            password: password.map(str::to_string),
            encryption: "TLS".to_string(),
            sender_email: "Umfrage@Example.org".to_string(),
            sender_name: "Support".to_string(),
            test_email: Some("QA@example.org".to_string()),
        }
    }

    #[test]
    fn test_absent_password_keeps_stored_one() {
        let updated = apply_smtp_update(stored(), request(None)).unwrap();
        assert_eq!(updated.password.as_deref(), Some("geheim"));
        assert_eq!(updated.host, "mail.example.org");
        assert_eq!(updated.encryption, SmtpEncryption::Tls);
        assert_eq!(updated.username, None);
        assert_eq!(updated.sender_email, "umfrage@example.org");
        assert_eq!(updated.test_email.as_deref(), Some("qa@example.org"));
    }

    #[test]
    fn test_empty_password_clears_and_new_password_replaces() {
        let cleared = apply_smtp_update(stored(), request(Some(""))).unwrap();
        assert_eq!(cleared.password, None);

        let replaced = apply_smtp_update(stored(), request(Some("neu"))).unwrap();
        assert_eq!(replaced.password.as_deref(), Some("neu"));
    }

    #[test]
    fn test_distinct_columns() {
        assert!(check_distinct_columns(&CsvFieldConfig::default()).is_ok());

        let config = CsvFieldConfig {
            username_field: "ticketId".to_string(),
            ..CsvFieldConfig::default()
        };
        let err = check_distinct_columns(&config).unwrap_err();
        assert_eq!(err.field(), "usernameField");
    }
}
