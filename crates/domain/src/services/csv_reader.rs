//! Low-level CSV reading shared by the ticket and user importers.

use std::collections::HashMap;

use crate::errors::CsvProcessingError;

const BOM: &str = "\u{feff}";
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// A data row with its 1-based line number.
#[derive(Debug, Clone)]
pub(crate) struct CsvRow {
    pub line: u64,
    record: csv::StringRecord,
}

impl CsvRow {
    /// Trimmed cell at `index`; `None` for an absent column.
    pub fn cell(&self, index: Option<usize>) -> Option<&str> {
        index.and_then(|i| self.record.get(i)).map(str::trim)
    }

    pub fn is_blank(&self) -> bool {
        self.record.iter().all(|field| field.trim().is_empty())
    }
}

/// A parsed CSV document: header index plus data rows in file order.
#[derive(Debug)]
pub(crate) struct CsvDocument {
    columns: HashMap<String, usize>,
    pub rows: Vec<CsvRow>,
}

impl CsvDocument {
    /// Index of the header named exactly `name` (after trimming).
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// The subset of `names` that has no matching header.
    pub fn missing_columns(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .filter(|name| !self.columns.contains_key(**name))
            .map(|name| name.to_string())
            .collect()
    }
}

/// Picks the candidate delimiter occurring most often in the header line.
/// Ties resolve to the earlier candidate, so `,` wins when nothing matches.
pub(crate) fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = CANDIDATE_DELIMITERS[0];
    let mut best_count = 0;
    for candidate in CANDIDATE_DELIMITERS {
        let count = header_line.bytes().filter(|b| *b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Decodes and parses an uploaded CSV.
///
/// Blank rows are dropped. `max_rows` bounds the number of non-blank data rows.
pub(crate) fn read_document(
    data: &[u8],
    max_rows: Option<usize>,
) -> Result<CsvDocument, CsvProcessingError> {
    let text = std::str::from_utf8(data).map_err(|e| CsvProcessingError::FileReadError {
        reason: format!("file is not valid UTF-8: {}", e),
    })?;
    let text = text.strip_prefix(BOM).unwrap_or(text);

    // The header is the first non-blank line; line numbers still count from the file start.
    let mut header_offset = 0;
    let mut leading_blank_lines = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        header_offset += line.len();
        leading_blank_lines += 1;
    }
    let text = &text[header_offset..];
    let header_line = text.lines().next().ok_or(CsvProcessingError::EmptyFile)?;
    let delimiter = detect_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CsvProcessingError::FileReadError {
            reason: e.to_string(),
        })?
        .clone();

    let mut columns = HashMap::with_capacity(headers.len());
    for (index, name) in headers.iter().enumerate() {
        columns.entry(name.to_string()).or_insert(index);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| match e.position() {
            Some(position) => CsvProcessingError::InvalidStructure {
                line: position.line() + leading_blank_lines,
                reason: e.to_string(),
            },
            None => CsvProcessingError::FileReadError {
                reason: e.to_string(),
            },
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default() + leading_blank_lines;
        let row = CsvRow { line, record };

        if row.is_blank() {
            continue;
        }
        if row.record.len() != headers.len() {
            return Err(CsvProcessingError::InvalidStructure {
                line,
                reason: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    row.record.len()
                ),
            });
        }
        if let Some(max) = max_rows {
            if rows.len() >= max {
                return Err(CsvProcessingError::TooManyRows { max });
            }
        }
        rows.push(row);
    }

    Ok(CsvDocument { columns, rows })
}
