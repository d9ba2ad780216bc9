//! Local workbook file.
//!
//! Each document is a JSON file `<dir>/<document_id>.json`:
//!
//! ```json
//! { "sheets": { "Issues": [["ID", "Description", ...], ["AD-1", "fix bug", ...]] } }
//! ```
//!
//! Every range call locks `<file>.lock`, loads the workbook, applies the call
//! and (for writes) replaces the file atomically. A single call is therefore
//! atomic across processes; a sequence of calls is not.

use std::fs;
use std::path::{Path, PathBuf};

use super::{SheetClient, Workbook, WriteMode};
use crate::codec::Row;
use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::range::RangeSpec;

#[derive(Debug, Clone)]
pub struct FileSheetClient {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileSheetClient {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path of the workbook backing `document_id`.
    pub fn document_path(&self, document_id: &str) -> Result<PathBuf> {
        let id = document_id.trim();
        if id.is_empty()
            || id.starts_with('.')
            || id.contains(|ch: char| ch == '/' || ch == '\\' || ch.is_control())
        {
            return Err(Error::InvalidArgument(format!(
                "invalid document id '{document_id}'"
            )));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    fn load(path: &Path) -> Result<Workbook> {
        if !path.exists() {
            return Ok(Workbook::default());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Workbook::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn store(path: &Path, book: &Workbook) -> Result<()> {
        let json = serde_json::to_string_pretty(book)?;
        lock::write_atomic(path, json.as_bytes())
    }
}

impl SheetClient for FileSheetClient {
    fn read_range(&self, document_id: &str, range: &RangeSpec) -> Result<Vec<Row>> {
        let path = self.document_path(document_id)?;
        let _lock = FileLock::acquire(lock::lock_path_for(&path), self.lock_timeout_ms)?;
        let book = Self::load(&path)?;
        let rows = book.read(range);
        tracing::trace!(path = %path.display(), range = %range, rows = rows.len(), "file read");
        Ok(rows)
    }

    fn write_range(
        &self,
        document_id: &str,
        range: &RangeSpec,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<()> {
        let path = self.document_path(document_id)?;
        let _lock = FileLock::acquire(lock::lock_path_for(&path), self.lock_timeout_ms)?;
        let mut book = Self::load(&path)?;
        book.write(range, rows, mode)?;
        Self::store(&path, &book)?;
        tracing::trace!(path = %path.display(), range = %range, rows = rows.len(), ?mode, "file write");
        Ok(())
    }
}
