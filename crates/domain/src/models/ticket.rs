//! Ticket rows parsed from an uploaded survey CSV.

use serde::Serialize;

use super::user::User;
use super::value_objects::{TicketId, TicketName, Username};

/// One validated CSV data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketData {
    pub ticket_id: TicketId,
    pub username: Username,
    pub ticket_name: Option<TicketName>,
    /// Raw value of the "created" column, passed through to the template.
    pub created: Option<String>,
    /// 1-based line number in the file, header included.
    pub row_number: u64,
}

/// A ticket whose username resolved to a registered user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidTicket {
    pub ticket: TicketData,
    pub user: User,
}

/// A CSV row that could not be turned into a ticket or user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row_number: u64,
    pub raw_ticket_id: String,
    pub raw_username: String,
    pub message: String,
}

/// The three disjoint buckets produced by CSV processing, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvProcessingResult {
    pub valid_tickets: Vec<ValidTicket>,
    pub invalid_rows: Vec<RowError>,
    pub unknown_users: Vec<TicketData>,
}

impl CsvProcessingResult {
    /// Number of data rows that produced an outcome.
    pub fn total_rows(&self) -> usize {
        self.valid_tickets.len() + self.invalid_rows.len() + self.unknown_users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}

/// Preview response: bucket counts plus the rows that need attention.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvPreview {
    pub total_rows: usize,
    pub valid_count: usize,
    pub invalid_rows: Vec<RowError>,
    pub unknown_users: Vec<TicketData>,
    pub valid_tickets: Vec<ValidTicket>,
}

impl From<CsvProcessingResult> for CsvPreview {
    fn from(result: CsvProcessingResult) -> Self {
        Self {
            total_rows: result.total_rows(),
            valid_count: result.valid_tickets.len(),
            invalid_rows: result.invalid_rows,
            unknown_users: result.unknown_users,
            valid_tickets: result.valid_tickets,
        }
    }
}
