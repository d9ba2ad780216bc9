//! Issue entity and status enumeration.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Issue lifecycle status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Open, Status::InProgress, Status::Closed];

    /// Canonical name as stored in the sheet.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::InProgress => "IN_PROGRESS",
            Status::Closed => "CLOSED",
        }
    }

    /// Match a stored token against the canonical names.
    ///
    /// Surrounding whitespace is ignored but case is not, so `closed` is no
    /// match. Anything else yields `None`; callers decide the fallback.
    pub fn from_token(token: &str) -> Option<Status> {
        let token = token.trim();
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == token)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}' (expected OPEN, IN_PROGRESS or CLOSED)")]
pub struct ParseStatusError(String);

impl FromStr for Status {
    type Err = ParseStatusError;

    /// Lenient parse for user input: any case, and `in-progress` for `IN_PROGRESS`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        Status::from_token(&normalized).ok_or_else(|| ParseStatusError(value.trim().to_string()))
    }
}

/// A tracked issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// `<prefix>-<n>`; empty until the store assigns one.
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Issue {
    /// A transient issue, not yet persisted.
    pub fn new(description: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            description: description.into(),
            parent_id,
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Current local wall-clock time, the clock all issue timestamps use.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
