//! Issue operations as the CLI sees them.
//!
//! Thin layer over [`IssueStore`]: normalises user input, rejects blank
//! values, and picks the backing client from configuration.

use crate::config::{Backend, Config};
use crate::error::{Error, Result};
use crate::issue::{Issue, Status};
use crate::sheet::{FileSheetClient, GoogleSheetsClient, SheetClient};
use crate::store::IssueStore;

/// Client chosen at runtime from `store.backend`.
pub type DynSheetClient = Box<dyn SheetClient>;

#[derive(Debug)]
pub struct IssueService<C> {
    store: IssueStore<C>,
}

impl IssueService<DynSheetClient> {
    /// Build the service for the configured backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store_cfg = &config.store;
        let client: DynSheetClient = match store_cfg.backend {
            Backend::File => Box::new(FileSheetClient::new(&store_cfg.dir)),
            Backend::Sheets => Box::new(GoogleSheetsClient::new(
                store_cfg.access_token()?,
                store_cfg.timeout(),
            )),
        };
        tracing::debug!(
            backend = store_cfg.backend.as_str(),
            document = %store_cfg.document_id,
            sheet = %store_cfg.sheet_name,
            "opening issue store"
        );
        let store = IssueStore::new(client, &store_cfg.document_id, store_cfg.sheet_name.trim())
            .with_id_prefix(config.issues.id_prefix.trim());
        Ok(Self::new(store))
    }
}

impl<C: SheetClient> IssueService<C> {
    pub fn new(store: IssueStore<C>) -> Self {
        Self { store }
    }

    /// Create and persist an `OPEN` issue.
    pub fn create_issue(&self, description: &str, parent_id: Option<&str>) -> Result<Issue> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::InvalidArgument(
                "description cannot be empty".to_string(),
            ));
        }
        let parent_id = parent_id
            .map(str::trim)
            .filter(|parent| !parent.is_empty())
            .map(str::to_string);
        self.store.save(Issue::new(description, parent_id))
    }

    pub fn update_issue_status(&self, id: &str, status: Status) -> Result<Issue> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidArgument("issue id cannot be empty".to_string()));
        }
        self.store.update_status(id, status)
    }

    /// All issues, or only those with `status`.
    pub fn list_issues(&self, status: Option<Status>) -> Result<Vec<Issue>> {
        match status {
            Some(status) => self.store.list_by_status(status),
            None => self.store.list_all(),
        }
    }

    /// Write the header row if the sheet lacks one.
    pub fn init_store(&self) -> Result<()> {
        self.store.ensure_schema()
    }
}
