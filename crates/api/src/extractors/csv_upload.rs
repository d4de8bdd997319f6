//! Multipart CSV upload extractor.
//!
//! Reads the `file` part into memory and keeps every other part as text.

use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};
use domain::errors::ValidationError;

use crate::app::AppState;
use crate::error::ApiError;

/// Name of the multipart part that carries the CSV.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub file: Bytes,
    pub file_name: Option<String>,
    fields: HashMap<String, String>,
}

impl CsvUpload {
    pub fn new(file: Bytes, fields: HashMap<String, String>) -> Self {
        Self {
            file,
            file_name: None,
            fields,
        }
    }

    /// A trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Checkbox-style flag; absent means false.
    pub fn flag(&self, name: &str) -> Result<bool, ValidationError> {
        match self.text(name).map(str::to_lowercase).as_deref() {
            None | Some("false") | Some("0") | Some("off") | Some("no") => Ok(false),
            Some("true") | Some("1") | Some("on") | Some("yes") => Ok(true),
            Some(other) => Err(ValidationError::invalid_value(
                name,
                format!("expected a boolean, got '{}'", other),
            )),
        }
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Die hochgeladene Datei ist zu groß.".to_string())
    } else {
        ApiError::Validation(e.body_text())
    }
}

#[async_trait]
impl FromRequest<AppState> for CsvUpload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;

        let mut file = None;
        let mut file_name = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD {
                file_name = field.file_name().map(str::to_string);
                file = Some(field.bytes().await.map_err(multipart_error)?);
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                fields.insert(name, value);
            }
        }

        let file = file.ok_or_else(|| ValidationError::required(FILE_FIELD))?;
        tracing::debug!(
            file_name = file_name.as_deref().unwrap_or("-"),
            bytes = file.len(),
            "CSV upload received"
        );

        Ok(Self {
            file,
            file_name,
            fields,
        })
    }
}
