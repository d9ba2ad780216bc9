//! Row codec: maps an [`Issue`] to a sheet row and back.
//!
//! Column order is fixed:
//!
//! ```text
//! A: ID | B: Description | C: Parent ID | D: Status | E: Created at | F: Updated at
//! ```
//!
//! Decoding is total. The sheet is shared and hand-editable, so a short row, an
//! unknown status token or an unparsable timestamp is normalised instead of
//! rejected: missing cells read as empty, unknown or blank statuses become
//! [`Status::Open`], bad timestamps and blank parents become `None`.

use chrono::NaiveDateTime;

use crate::issue::{Issue, Status};

/// A sheet row: cell values in column order.
pub type Row = Vec<String>;

/// Canonical header labels, columns A through F.
pub const HEADER: [&str; 6] = [
    "ID",
    "Description",
    "Parent ID",
    "Status",
    "Created at",
    "Updated at",
];

/// Number of columns an issue occupies.
pub const COLUMN_COUNT: usize = HEADER.len();

const COL_ID: usize = 0;
const COL_DESCRIPTION: usize = 1;
const COL_PARENT: usize = 2;
const COL_STATUS: usize = 3;
const COL_CREATED: usize = 4;
const COL_UPDATED: usize = 5;

/// Write format for timestamps (ISO-8601 local date-time).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// Accepted on read: the same layout with seconds omitted.
const TIMESTAMP_FORMAT_MINUTES: &str = "%Y-%m-%dT%H:%M";

pub fn header() -> Row {
    HEADER.iter().map(|label| label.to_string()).collect()
}

/// Cheap presence check: only the first cell is compared, ignoring case.
pub fn is_header(row: &[String]) -> bool {
    row.first()
        .map(|cell| cell.trim().eq_ignore_ascii_case(HEADER[COL_ID]))
        .unwrap_or(false)
}

/// Encode an issue.
///
/// The `Updated at` cell is only emitted once the issue has been updated, so a
/// freshly created issue encodes to five cells.
pub fn encode(issue: &Issue) -> Row {
    let mut row = vec![
        issue.id.clone(),
        issue.description.clone(),
        issue.parent_id.clone().unwrap_or_default(),
        issue.status.as_str().to_string(),
        issue.created_at.map(format_timestamp).unwrap_or_default(),
    ];
    if let Some(updated_at) = issue.updated_at {
        row.push(format_timestamp(updated_at));
    }
    row
}

pub fn decode(row: &[String]) -> Issue {
    let parent = cell(row, COL_PARENT);
    Issue {
        id: cell(row, COL_ID).to_string(),
        description: cell(row, COL_DESCRIPTION).to_string(),
        parent_id: if parent.trim().is_empty() {
            None
        } else {
            Some(parent.to_string())
        },
        status: decode_status(cell(row, COL_STATUS)),
        created_at: parse_timestamp(cell(row, COL_CREATED)),
        updated_at: parse_timestamp(cell(row, COL_UPDATED)),
    }
}

/// The id cell of a row, empty when the row is shorter than one cell.
pub fn id_cell(row: &[String]) -> &str {
    cell(row, COL_ID)
}

/// Exact canonical name after trimming; anything else reads as `OPEN`.
pub fn decode_status(token: &str) -> Status {
    Status::from_token(token).unwrap_or_default()
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT_MINUTES))
        .ok()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}
