//! A1-notation ranges over the issue columns.

use std::fmt;

/// First and last column letters of the issue block.
pub const FIRST_COLUMN: char = 'A';
pub const LAST_COLUMN: char = 'F';

/// Row span of a range; rows are 1-based as in spreadsheet notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSpan {
    /// Every row: `A:F`.
    All,
    /// A single row: `A{n}:F{n}`.
    Row(usize),
}

/// Sheet name plus a row span over columns `A`..`F`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub sheet: String,
    pub rows: RowSpan,
}

impl RangeSpec {
    /// The open column range, `Sheet!A:F`.
    pub fn all(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            rows: RowSpan::All,
        }
    }

    /// A single row, `Sheet!A{n}:F{n}`.
    pub fn row(sheet: impl Into<String>, row: usize) -> Self {
        Self {
            sheet: sheet.into(),
            rows: RowSpan::Row(row),
        }
    }

    /// The header range, `Sheet!A1:F1`.
    pub fn header(sheet: impl Into<String>) -> Self {
        Self::row(sheet, 1)
    }

    /// A1 notation, e.g. `Issues!A2:F2`.
    pub fn to_a1(&self) -> String {
        self.to_string()
    }
}

/// Sheet names other than plain identifiers must be single-quoted in A1
/// notation, with embedded quotes doubled.
fn quote_sheet(sheet: &str) -> String {
    if !sheet.is_empty() && sheet.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sheet = quote_sheet(&self.sheet);
        match self.rows {
            RowSpan::All => write!(f, "{}!{}:{}", sheet, FIRST_COLUMN, LAST_COLUMN),
            RowSpan::Row(n) => write!(f, "{}!{}{}:{}{}", sheet, FIRST_COLUMN, n, LAST_COLUMN, n),
        }
    }
}
