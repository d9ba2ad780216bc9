//! In-process tabular store.
//!
//! Holds documents in memory and keeps a log of every range call, which is
//! what the store tests assert against ("exactly one write, to `A3:F3`").
//! Failures can be injected for the next N calls.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Grid, SheetClient, Workbook, WriteMode};
use crate::codec::Row;
use crate::error::{Error, Result};
use crate::range::RangeSpec;

/// One observed range call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeCall {
    Read {
        document_id: String,
        range: String,
    },
    Write {
        document_id: String,
        range: String,
        rows: Vec<Row>,
        mode: WriteMode,
    },
}

impl RangeCall {
    pub fn is_write(&self) -> bool {
        matches!(self, RangeCall::Write { .. })
    }

    /// A1 range the call addressed.
    pub fn range(&self) -> &str {
        match self {
            RangeCall::Read { range, .. } | RangeCall::Write { range, .. } => range,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<String, Workbook>,
    calls: Vec<RangeCall>,
    failures: Vec<Option<String>>,
}

#[derive(Debug, Default)]
pub struct MemorySheetClient {
    state: Mutex<MemoryState>,
}

impl MemorySheetClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a sheet's contents with raw rows (header included, if any).
    pub fn seed(&self, document_id: &str, sheet: &str, rows: Vec<Row>) {
        let mut state = self.state();
        state
            .documents
            .entry(document_id.to_string())
            .or_default()
            .sheets
            .insert(sheet.to_string(), Grid::from_rows(rows));
    }

    /// Raw stored rows of a sheet.
    pub fn rows(&self, document_id: &str, sheet: &str) -> Vec<Row> {
        self.state()
            .documents
            .get(document_id)
            .and_then(|book| book.sheets.get(sheet))
            .map(|grid| grid.rows().to_vec())
            .unwrap_or_default()
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<RangeCall> {
        self.state().calls.clone()
    }

    pub fn writes(&self) -> Vec<RangeCall> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.is_write())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Make the next call fail with `message`. Stacks: queued failures are
    /// consumed one per call, in order.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.state().failures.push(Some(message.into()));
    }

    /// Let `calls` more calls through, then fail one with `message`.
    pub fn fail_next_after(&self, calls: usize, message: impl Into<String>) {
        let mut state = self.state();
        state.failures.extend(std::iter::repeat(None).take(calls));
        state.failures.push(Some(message.into()));
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryState {
    fn take_failure(&mut self) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        match self.failures.remove(0) {
            Some(message) => Err(Error::Transport(message)),
            None => Ok(()),
        }
    }
}

impl SheetClient for MemorySheetClient {
    fn read_range(&self, document_id: &str, range: &RangeSpec) -> Result<Vec<Row>> {
        let mut state = self.state();
        state.calls.push(RangeCall::Read {
            document_id: document_id.to_string(),
            range: range.to_a1(),
        });
        state.take_failure()?;
        Ok(state
            .documents
            .get(document_id)
            .map(|book| book.read(range))
            .unwrap_or_default())
    }

    fn write_range(
        &self,
        document_id: &str,
        range: &RangeSpec,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<()> {
        let mut state = self.state();
        state.calls.push(RangeCall::Write {
            document_id: document_id.to_string(),
            range: range.to_a1(),
            rows: rows.to_vec(),
            mode,
        });
        state.take_failure()?;
        state
            .documents
            .entry(document_id.to_string())
            .or_default()
            .write(range, rows, mode)
    }
}
