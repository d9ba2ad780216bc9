//! In-memory model of a sheet, shared by the local clients.
//!
//! Behaves like a spreadsheet values API: reads trim trailing empty cells and
//! trailing empty rows, overwrites only touch the addressed cells, and
//! appends land after the last row that has any content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::WriteMode;
use crate::codec::{Row, COLUMN_COUNT};
use crate::error::{Error, Result};
use crate::range::{RangeSpec, RowSpan};

/// Cells of one sheet, row-major. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Raw stored rows, untrimmed.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn read(&self, span: RowSpan) -> Vec<Row> {
        match span {
            RowSpan::All => {
                let mut out: Vec<Row> = self.rows.iter().map(visible).collect();
                while out.last().map(|row| row.is_empty()).unwrap_or(false) {
                    out.pop();
                }
                out
            }
            RowSpan::Row(n) => {
                let row = n
                    .checked_sub(1)
                    .and_then(|idx| self.rows.get(idx))
                    .map(visible)
                    .unwrap_or_default();
                if row.is_empty() {
                    Vec::new()
                } else {
                    vec![row]
                }
            }
        }
    }

    pub fn write(&mut self, range: &RangeSpec, rows: &[Row], mode: WriteMode) -> Result<()> {
        if let Some(wide) = rows.iter().find(|row| row.len() > COLUMN_COUNT) {
            return Err(Error::Transport(format!(
                "row of {} cells does not fit {}",
                wide.len(),
                range
            )));
        }

        let start = match (mode, range.rows) {
            (WriteMode::Append, _) => self.last_populated_row(),
            (WriteMode::Overwrite, RowSpan::All) => 0,
            (WriteMode::Overwrite, RowSpan::Row(n)) => {
                if n == 0 {
                    return Err(Error::Transport(format!("invalid range {range}")));
                }
                if rows.len() > 1 {
                    return Err(Error::Transport(format!(
                        "{} rows do not fit single-row range {}",
                        rows.len(),
                        range
                    )));
                }
                n - 1
            }
        };

        for (offset, values) in rows.iter().enumerate() {
            let idx = start + offset;
            if self.rows.len() <= idx {
                self.rows.resize_with(idx + 1, Vec::new);
            }
            let target = &mut self.rows[idx];
            if target.len() < values.len() {
                target.resize(values.len(), String::new());
            }
            for (col, value) in values.iter().enumerate() {
                target[col] = value.clone();
            }
        }
        Ok(())
    }

    /// Number of rows up to and including the last one with content.
    fn last_populated_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| !visible(row).is_empty())
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }
}

/// A row as a values API returns it: at most `A`..`F`, trailing blanks cut.
fn visible(row: &Row) -> Row {
    let mut out: Row = row.iter().take(COLUMN_COUNT).cloned().collect();
    while out.last().map(|cell| cell.is_empty()).unwrap_or(false) {
        out.pop();
    }
    out
}

/// Named sheets of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub sheets: BTreeMap<String, Grid>,
}

impl Workbook {
    /// Missing sheets read as empty.
    pub fn read(&self, range: &RangeSpec) -> Vec<Row> {
        self.sheets
            .get(&range.sheet)
            .map(|grid| grid.read(range.rows))
            .unwrap_or_default()
    }

    /// Missing sheets are created on first write.
    pub fn write(&mut self, range: &RangeSpec, rows: &[Row], mode: WriteMode) -> Result<()> {
        self.sheets
            .entry(range.sheet.clone())
            .or_default()
            .write(range, rows, mode)
    }
}
