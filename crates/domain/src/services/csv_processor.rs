//! Turns an uploaded survey CSV into valid tickets, invalid rows and
//! unknown users.

use std::sync::Arc;

use crate::errors::{CsvProcessingError, ProcessingError};
use crate::models::{
    CsvFieldConfig, CsvProcessingResult, RowError, TicketData, TicketId, TicketName, Username,
    ValidTicket,
};
use crate::services::csv_reader::{read_document, CsvRow};
use crate::services::ports::UserDirectory;

/// Parses survey CSVs and resolves usernames against the user directory.
pub struct CsvProcessor {
    users: Arc<dyn UserDirectory>,
    max_rows: Option<usize>,
}

impl CsvProcessor {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self {
            users,
            max_rows: None,
        }
    }

    /// Rejects files with more than `max_rows` data rows.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Processes a whole file.
    ///
    /// Structural problems abort with a [`CsvProcessingError`]; row problems
    /// land in `invalid_rows`. Every non-blank data row ends up in exactly
    /// one bucket, in file order.
    pub async fn process(
        &self,
        data: &[u8],
        config: &CsvFieldConfig,
    ) -> Result<CsvProcessingResult, ProcessingError> {
        let document = read_document(data, self.max_rows)?;

        let missing = document.missing_columns(&config.required_fields());
        if !missing.is_empty() {
            return Err(CsvProcessingError::MissingColumns { columns: missing }.into());
        }

        let ticket_id_col = document.column(config.ticket_id_field());
        let username_col = document.column(config.username_field());
        let ticket_name_col = document.column(config.ticket_name_field());
        let created_col = document.column(config.created_field());

        let mut result = CsvProcessingResult::default();

        for row in &document.rows {
            let raw_ticket_id = row.cell(ticket_id_col).unwrap_or_default();
            let raw_username = row.cell(username_col).unwrap_or_default();

            let ticket = match parse_ticket(row, raw_ticket_id, raw_username, ticket_name_col, created_col) {
                Ok(ticket) => ticket,
                Err(message) => {
                    tracing::debug!(line = row.line, error = %message, "Invalid CSV row");
                    result.invalid_rows.push(RowError {
                        row_number: row.line,
                        raw_ticket_id: raw_ticket_id.to_string(),
                        raw_username: raw_username.to_string(),
                        message,
                    });
                    continue;
                }
            };

            match self.users.find_by_username(ticket.username.as_str()).await? {
                Some(user) => result.valid_tickets.push(ValidTicket { ticket, user }),
                None => result.unknown_users.push(ticket),
            }
        }

        tracing::info!(
            valid = result.valid_tickets.len(),
            invalid = result.invalid_rows.len(),
            unknown_users = result.unknown_users.len(),
            "CSV processed"
        );

        Ok(result)
    }
}

fn parse_ticket(
    row: &CsvRow,
    raw_ticket_id: &str,
    raw_username: &str,
    ticket_name_col: Option<usize>,
    created_col: Option<usize>,
) -> Result<TicketData, String> {
    let ticket_id = TicketId::new(raw_ticket_id).map_err(|e| e.to_string())?;
    let username = Username::new(raw_username).map_err(|e| e.to_string())?;
    let ticket_name = TicketName::from_optional(row.cell(ticket_name_col)).map_err(|e| e.to_string())?;
    let created = row
        .cell(created_col)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(TicketData {
        ticket_id,
        username,
        ticket_name,
        created,
        row_number: row.line,
    })
}
