//! Tabular store clients.
//!
//! The issue store only needs two range calls from its backing document:
//! read a rectangular range, and write one (overwrite in place or append
//! after the last populated row). [`SheetClient`] is that contract; the
//! implementations are:
//!
//! - [`MemorySheetClient`]: process memory, records every call
//! - [`FileSheetClient`]: a JSON workbook on local disk, flock-guarded
//! - [`GoogleSheetsClient`]: the Google Sheets v4 values API over HTTP

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::Row;
use crate::error::Result;
use crate::range::RangeSpec;

mod file;
mod google;
mod grid;
mod memory;

pub use file::FileSheetClient;
pub use google::GoogleSheetsClient;
pub use grid::{Grid, Workbook};
pub use memory::{MemorySheetClient, RangeCall};

/// How `write_range` places rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace the cells of exactly the given range.
    Overwrite,
    /// Add rows after the last populated row of the range's columns.
    Append,
}

/// Range access to an external tabular document.
///
/// Implementations must return an empty vector for an empty range rather
/// than an error. Calls are blocking; timeouts, if any, are the client's.
pub trait SheetClient: Send + Sync {
    fn read_range(&self, document_id: &str, range: &RangeSpec) -> Result<Vec<Row>>;

    fn write_range(
        &self,
        document_id: &str,
        range: &RangeSpec,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<()>;
}

impl<T: SheetClient + ?Sized> SheetClient for Arc<T> {
    fn read_range(&self, document_id: &str, range: &RangeSpec) -> Result<Vec<Row>> {
        (**self).read_range(document_id, range)
    }

    fn write_range(
        &self,
        document_id: &str,
        range: &RangeSpec,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<()> {
        (**self).write_range(document_id, range, rows, mode)
    }
}

impl<T: SheetClient + ?Sized> SheetClient for Box<T> {
    fn read_range(&self, document_id: &str, range: &RangeSpec) -> Result<Vec<Row>> {
        (**self).read_range(document_id, range)
    }

    fn write_range(
        &self,
        document_id: &str,
        range: &RangeSpec,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<()> {
        (**self).write_range(document_id, range, rows, mode)
    }
}
