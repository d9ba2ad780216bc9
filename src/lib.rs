//! sitracker - Issue Tracking Library
//!
//! Persists issues as rows of a spreadsheet-like tabular store and provides
//! the core functionality behind the sitracker CLI.
//!
//! # Core Concepts
//!
//! - **Issue**: id, description, optional parent, status, timestamps
//! - **Sheet**: one header row (`A1:F1`) followed by one row per issue
//! - **Sheet client**: range reads and writes against a document
//! - **Issue store**: the create/update/list operations over one sheet
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `codec`: Issue <-> row mapping, total on decode
//! - `config`: Configuration loading from `.sitracker.toml`
//! - `error`: Error types and result aliases
//! - `id_alloc`: Sequential id allocation by table scan
//! - `issue`: Issue entity and status
//! - `lock`: File locking and atomic writes for the file backend
//! - `output`: Human and JSON output
//! - `range`: A1-notation ranges
//! - `service`: Input validation and backend selection
//! - `sheet`: Tabular store clients (memory, file, Google Sheets)
//! - `store`: The issue store

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod id_alloc;
pub mod issue;
pub mod lock;
pub mod output;
pub mod range;
pub mod service;
pub mod sheet;
pub mod store;

pub use error::{Error, Result};
pub use issue::{Issue, Status};
pub use store::IssueStore;
