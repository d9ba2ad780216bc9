//! Issue store over a single sheet.
//!
//! Rows live in columns `A`..`F` of one sheet; row 1 is the header and
//! data row `k` (0-based) sits at sheet row `k + 2`. Nothing is cached:
//! every operation reads the whole range again.
//!
//! The store handle owns a reader/writer lock. `save`, `update_status` and
//! `ensure_schema` hold it exclusively for their whole read-modify-write
//! sequence, list operations hold it shared. The lock only orders callers
//! within this process; two processes sharing a document can still race.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::codec::{self, Row};
use crate::error::{Error, Result};
use crate::id_alloc;
use crate::issue::{self, Issue, Status};
use crate::range::RangeSpec;
use crate::sheet::{SheetClient, WriteMode};

/// Default prefix of allocated ids.
pub const DEFAULT_ID_PREFIX: &str = "AD";

#[derive(Debug)]
pub struct IssueStore<C> {
    client: C,
    document_id: String,
    sheet_name: String,
    id_prefix: String,
    lock: RwLock<()>,
}

impl<C: SheetClient> IssueStore<C> {
    pub fn new(client: C, document_id: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        Self {
            client,
            document_id: document_id.into(),
            sheet_name: sheet_name.into(),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            lock: RwLock::new(()),
        }
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Make sure row 1 carries the header, writing it if the first cell is
    /// not `ID`. Existing data below is left alone.
    ///
    /// Any failure reading or writing the header range is reported as
    /// [`Error::SchemaUnavailable`].
    pub fn ensure_schema(&self) -> Result<()> {
        let _guard = self.write_guard();
        self.ensure_schema_locked()
    }

    /// Persist a new issue by appending it as the last row.
    ///
    /// An empty id is allocated from the current rows, a missing
    /// `created_at` is set to now. Returns the issue as written.
    pub fn save(&self, mut issue: Issue) -> Result<Issue> {
        let _guard = self.write_guard();
        self.ensure_schema_locked()?;

        if !issue.is_persisted() {
            let rows = self.read_all()?;
            issue.id = id_alloc::next_id(&self.id_prefix, &rows)?;
        }
        if issue.created_at.is_none() {
            issue.created_at = Some(issue::now());
        }

        let row = codec::encode(&issue);
        self.write(&RangeSpec::all(&self.sheet_name), &[row], WriteMode::Append)?;
        tracing::info!(id = %issue.id, status = %issue.status, "issue created");
        Ok(issue)
    }

    /// Set the status of the first row whose id equals `id` and stamp
    /// `updated_at`. Exactly one single-row range is written.
    pub fn update_status(&self, id: &str, status: Status) -> Result<Issue> {
        let _guard = self.write_guard();
        let rows = self.read_all()?;

        let position = rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| codec::id_cell(row) == id)
            .map(|(idx, _)| idx)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut issue = codec::decode(&rows[position]);
        let previous = issue.status;
        issue.status = status;
        issue.updated_at = Some(issue::now());

        // Always a full row, so short rows come back normalised.
        let mut row = codec::encode(&issue);
        row.resize(codec::COLUMN_COUNT, String::new());

        let range = RangeSpec::row(&self.sheet_name, position + 1);
        self.write(&range, &[row], WriteMode::Overwrite)?;
        tracing::info!(id = %issue.id, from = %previous, to = %status, row = position + 1, "issue status changed");
        Ok(issue)
    }

    /// Every issue with `status`, in sheet order.
    pub fn list_by_status(&self, status: Status) -> Result<Vec<Issue>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|issue| issue.status == status)
            .collect())
    }

    /// Every data row decoded, in sheet order. Never fails on bad rows.
    pub fn list_all(&self) -> Result<Vec<Issue>> {
        let _guard = self.read_guard();
        let rows = self.read_all()?;
        Ok(rows.iter().skip(1).map(|row| codec::decode(row)).collect())
    }

    fn ensure_schema_locked(&self) -> Result<()> {
        let range = RangeSpec::header(&self.sheet_name);
        let rows = self.read(&range).map_err(Error::schema)?;
        if rows.first().map(|row| codec::is_header(row)).unwrap_or(false) {
            return Ok(());
        }
        tracing::warn!(document = %self.document_id, range = %range, "writing issue sheet header");
        self.write(&range, &[codec::header()], WriteMode::Overwrite)
            .map_err(Error::schema)
    }

    fn read_all(&self) -> Result<Vec<Row>> {
        self.read(&RangeSpec::all(&self.sheet_name))
    }

    fn read(&self, range: &RangeSpec) -> Result<Vec<Row>> {
        let rows = self.client.read_range(&self.document_id, range)?;
        tracing::debug!(document = %self.document_id, range = %range, rows = rows.len(), "read range");
        Ok(rows)
    }

    fn write(&self, range: &RangeSpec, rows: &[Row], mode: WriteMode) -> Result<()> {
        self.client
            .write_range(&self.document_id, range, rows, mode)?;
        tracing::debug!(document = %self.document_id, range = %range, rows = rows.len(), ?mode, "wrote range");
        Ok(())
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{MemorySheetClient, RangeCall};
    use std::sync::Arc;

    const DOC: &str = "doc";
    const SHEET: &str = "Issues";

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn store() -> (Arc<MemorySheetClient>, IssueStore<Arc<MemorySheetClient>>) {
        let client = Arc::new(MemorySheetClient::new());
        let store = IssueStore::new(Arc::clone(&client), DOC, SHEET);
        (client, store)
    }

    fn seeded(statuses: &[&str]) -> (Arc<MemorySheetClient>, IssueStore<Arc<MemorySheetClient>>) {
        let (client, store) = store();
        let mut rows = vec![codec::header()];
        for (idx, status) in statuses.iter().enumerate() {
            let id = format!("AD-{}", idx + 1);
            rows.push(row(&[id.as_str(), "task", "", status, "2024-01-01T09:00:00"]));
        }
        client.seed(DOC, SHEET, rows);
        (client, store)
    }

    #[test]
    fn successive_saves_allocate_sequential_ids() {
        let (client, store) = store();
        let ids: Vec<String> = (0..3)
            .map(|n| store.save(Issue::new(format!("task {n}"), None)).unwrap().id)
            .collect();
        assert_eq!(ids, vec!["AD-1", "AD-2", "AD-3"]);

        let rows = client.rows(DOC, SHEET);
        assert_eq!(rows.len(), 4);
        assert!(codec::is_header(&rows[0]));
        assert_eq!(codec::id_cell(&rows[3]), "AD-3");
    }

    #[test]
    fn save_continues_after_highest_sequence() {
        let (client, store) = store();
        client.seed(
            DOC,
            SHEET,
            vec![
                codec::header(),
                row(&["AD-1"]),
                row(&["AD-5"]),
                row(&["malformed"]),
                row(&[""]),
            ],
        );
        let issue = store.save(Issue::new("next", None)).unwrap();
        assert_eq!(issue.id, "AD-6");
    }

    #[test]
    fn save_refuses_to_reuse_the_last_sequence_number() {
        let (client, store) = store();
        let last = format!("AD-{}", u64::MAX);
        client.seed(DOC, SHEET, vec![codec::header(), row(&[last.as_str()])]);

        let err = store.save(Issue::new("one too many", None)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(client.writes().is_empty());
        assert_eq!(client.rows(DOC, SHEET).len(), 2);
    }

    #[test]
    fn save_keeps_caller_supplied_fields() {
        let (_client, store) = store();
        let created = codec::parse_timestamp("2023-05-06T07:08:09").unwrap();
        let issue = Issue {
            id: "EXT-9".to_string(),
            created_at: Some(created),
            ..Issue::new("imported", Some("EXT-1".to_string()))
        };
        let saved = store.save(issue).unwrap();
        assert_eq!(saved.id, "EXT-9");
        assert_eq!(saved.created_at, Some(created));

        let listed = store.list_all().unwrap();
        assert_eq!(listed, vec![saved]);
    }

    #[test]
    fn save_appends_five_cells_for_fresh_issue() {
        let (client, store) = store();
        store.ensure_schema().unwrap();
        client.clear_calls();

        store.save(Issue::new("fix bug", None)).unwrap();
        let writes = client.writes();
        assert_eq!(writes.len(), 1);
        match &writes[0] {
            RangeCall::Write { range, rows, mode, .. } => {
                assert_eq!(range, "Issues!A:F");
                assert_eq!(*mode, WriteMode::Append);
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].len(), 5);
                assert_eq!(rows[0][3], "OPEN");
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn update_writes_exactly_one_row_range() {
        let (client, store) = seeded(&["OPEN", "OPEN", "OPEN"]);
        client.clear_calls();

        let updated = store.update_status("AD-2", Status::Closed).unwrap();
        assert_eq!(updated.id, "AD-2");
        assert_eq!(updated.status, Status::Closed);
        assert!(updated.updated_at.is_some());

        let writes = client.writes();
        assert_eq!(writes.len(), 1);
        match &writes[0] {
            RangeCall::Write { range, rows, mode, .. } => {
                assert_eq!(range, "Issues!A3:F3");
                assert_eq!(*mode, WriteMode::Overwrite);
                assert_eq!(rows[0].len(), codec::COLUMN_COUNT);
                assert_eq!(rows[0][3], "CLOSED");
            }
            other => panic!("unexpected call: {other:?}"),
        }

        let stored = client.rows(DOC, SHEET);
        assert_eq!(stored[1][3], "OPEN");
        assert_eq!(stored[2][3], "CLOSED");
        assert_eq!(stored[3][3], "OPEN");
    }

    #[test]
    fn update_normalises_short_rows() {
        let (client, store) = store();
        client.seed(DOC, SHEET, vec![codec::header(), row(&["AD-1", "short"])]);

        store.update_status("AD-1", Status::InProgress).unwrap();
        let stored = client.rows(DOC, SHEET);
        assert_eq!(stored[1].len(), codec::COLUMN_COUNT);
        assert_eq!(stored[1][2], "");
        assert_eq!(stored[1][3], "IN_PROGRESS");
        assert_eq!(stored[1][4], "");
        assert!(codec::parse_timestamp(&stored[1][5]).is_some());
    }

    #[test]
    fn update_first_duplicate_wins() {
        let (client, store) = store();
        client.seed(
            DOC,
            SHEET,
            vec![codec::header(), row(&["AD-1", "first"]), row(&["AD-1", "second"])],
        );
        let updated = store.update_status("AD-1", Status::Closed).unwrap();
        assert_eq!(updated.description, "first");
        assert_eq!(client.rows(DOC, SHEET)[2], row(&["AD-1", "second"]));
    }

    #[test]
    fn update_missing_issue_is_not_found() {
        let (client, store) = store();
        let err = store.update_status("AD-1", Status::Closed).unwrap_err();
        assert!(matches!(err, Error::NotFound(ref id) if id == "AD-1"));

        client.seed(DOC, SHEET, vec![codec::header()]);
        assert!(matches!(
            store.update_status("AD-1", Status::Closed),
            Err(Error::NotFound(_))
        ));

        let (client, store) = seeded(&["OPEN"]);
        assert!(matches!(
            store.update_status("AD-2", Status::Closed),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.update_status("ID", Status::Closed),
            Err(Error::NotFound(_))
        ));
        assert!(client.writes().is_empty());
    }

    #[test]
    fn list_by_status_preserves_sheet_order() {
        let (_client, store) = seeded(&["OPEN", "CLOSED", "OPEN", "IN_PROGRESS"]);
        let open: Vec<String> = store
            .list_by_status(Status::Open)
            .unwrap()
            .into_iter()
            .map(|issue| issue.id)
            .collect();
        assert_eq!(open, vec!["AD-1", "AD-3"]);

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].status, Status::InProgress);
    }

    #[test]
    fn list_tolerates_malformed_rows() {
        let (client, store) = store();
        client.seed(
            DOC,
            SHEET,
            vec![
                codec::header(),
                row(&[]),
                row(&["AD-1", "x", "", "bogus", "yesterday"]),
            ],
        );
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|issue| issue.status == Status::Open));
        assert!(all[1].created_at.is_none());
    }

    #[test]
    fn list_on_empty_store_is_empty() {
        let (client, store) = store();
        assert!(store.list_all().unwrap().is_empty());
        assert!(store.list_by_status(Status::Closed).unwrap().is_empty());
        assert!(client.writes().is_empty());
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let (client, store) = store();
        store.ensure_schema().unwrap();
        assert_eq!(client.writes().len(), 1);
        assert_eq!(client.rows(DOC, SHEET), vec![codec::header()]);

        client.clear_calls();
        store.ensure_schema().unwrap();
        assert!(client.writes().is_empty());
        assert_eq!(client.calls().len(), 1);
    }

    #[test]
    fn ensure_schema_accepts_lowercase_header() {
        let (client, store) = store();
        client.seed(DOC, SHEET, vec![row(&["id", "desc"])]);
        store.ensure_schema().unwrap();
        assert!(client.writes().is_empty());
    }

    #[test]
    fn ensure_schema_overwrites_only_row_one() {
        let (client, store) = store();
        client.seed(DOC, SHEET, vec![row(&["AD-1", "orphan"]), row(&["AD-2", "kept"])]);
        store.ensure_schema().unwrap();
        let rows = client.rows(DOC, SHEET);
        assert_eq!(rows[0], codec::header());
        assert_eq!(rows[1], row(&["AD-2", "kept"]));
    }

    #[test]
    fn header_read_failure_is_schema_unavailable() {
        let (client, store) = store();
        client.fail_next("quota exceeded");
        let err = store.save(Issue::new("x", None)).unwrap_err();
        match err {
            Error::SchemaUnavailable(inner) => {
                assert!(inner.to_string().contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(client.writes().is_empty());
    }

    #[test]
    fn append_failure_is_transport() {
        let (client, store) = store();
        store.ensure_schema().unwrap();
        // header read, id read, then the append fails
        client.fail_next_after(2, "backend down");
        let err = store.save(Issue::new("x", None)).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(client.rows(DOC, SHEET).len(), 1);
    }

    #[test]
    fn create_then_close_scenario() {
        let (_client, store) = store();
        let created = store.save(Issue::new("fix bug", None)).unwrap();
        assert_eq!(created.id, "AD-1");
        assert_eq!(created.status, Status::Open);
        assert!(created.created_at.is_some());
        assert!(created.updated_at.is_none());

        let closed = store.update_status("AD-1", Status::Closed).unwrap();
        assert_eq!(closed.id, "AD-1");
        assert!(closed.updated_at.is_some());

        let listed = store.list_by_status(Status::Closed).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "AD-1");
        assert_eq!(listed[0].description, "fix bug");
        assert_eq!(listed[0].updated_at, closed.updated_at);
    }

    #[test]
    fn concurrent_saves_get_distinct_ids() {
        let (_client, store) = store();
        let store = Arc::new(store);
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.save(Issue::new(format!("t{n}"), None)).unwrap().id)
            })
            .collect();
        let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_by_key(|id| id_alloc::sequence_number(id));
        let expected: Vec<String> = (1..=8).map(|n| format!("AD-{n}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn custom_prefix_is_used() {
        let (_client, store) = store();
        let store = store.with_id_prefix("OPS");
        assert_eq!(store.save(Issue::new("x", None)).unwrap().id, "OPS-1");
    }
}
