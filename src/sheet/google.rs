//! Google Sheets v4 values API client.
//!
//! Blocking HTTP via `ureq`, authenticated with an OAuth bearer token the
//! caller already holds. Values are written with `valueInputOption=RAW` so
//! timestamps and ids are stored as typed, not reinterpreted by the sheet.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{SheetClient, WriteMode};
use crate::codec::Row;
use crate::error::{Error, Result};
use crate::range::RangeSpec;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Longest error body kept in a transport error message.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct GoogleSheetsClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for GoogleSheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GoogleSheetsClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
        }
    }

    /// Point the client at another endpoint (proxies, emulators).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn values_url(&self, document_id: &str, range: &RangeSpec) -> String {
        format!(
            "{}/{}/values/{}",
            self.base_url,
            urlencoding::encode(document_id),
            urlencoding::encode(&range.to_a1())
        )
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl SheetClient for GoogleSheetsClient {
    fn read_range(&self, document_id: &str, range: &RangeSpec) -> Result<Vec<Row>> {
        let url = self.values_url(document_id, range);
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &self.authorization())
            .query("majorDimension", "ROWS")
            .call()
            .map_err(transport_error)?;
        let body: ValueRange = response
            .into_json()
            .map_err(|err| Error::Transport(format!("invalid response for {range}: {err}")))?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    fn write_range(
        &self,
        document_id: &str,
        range: &RangeSpec,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<()> {
        let url = self.values_url(document_id, range);
        let request = match mode {
            WriteMode::Overwrite => self.agent.put(&url),
            WriteMode::Append => self
                .agent
                .post(&format!("{url}:append"))
                .query("insertDataOption", "INSERT_ROWS"),
        };
        request
            .set("Authorization", &self.authorization())
            .query("valueInputOption", "RAW")
            .send_json(json!({
                "range": range.to_a1(),
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .map_err(transport_error)?;
        Ok(())
    }
}

/// Cells come back as JSON values; anything that is not a string is
/// rendered the way it would print.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn transport_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(code, response) => {
            let mut body = response.into_string().unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            Error::Transport(format!("HTTP {code}: {}", body.trim()))
        }
        ureq::Error::Transport(transport) => Error::Transport(transport.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_url_encodes_document_and_range() {
        let client = GoogleSheetsClient::new("t", Duration::from_secs(1))
            .with_base_url("http://localhost:9000/v4/spreadsheets/");
        assert_eq!(
            client.values_url("abc123", &RangeSpec::row("Issues", 2)),
            "http://localhost:9000/v4/spreadsheets/abc123/values/Issues%21A2%3AF2"
        );
        assert_eq!(
            client.values_url("abc", &RangeSpec::all("Team Issues")),
            "http://localhost:9000/v4/spreadsheets/abc/values/%27Team%20Issues%27%21A%3AF"
        );
    }

    #[test]
    fn non_string_cells_are_stringified() {
        assert_eq!(cell_text(&json!("AD-1")), "AD-1");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn missing_values_field_means_empty_range() {
        let body: ValueRange =
            serde_json::from_str(r#"{"range":"Issues!A1:F1","majorDimension":"ROWS"}"#).unwrap();
        assert!(body.values.is_empty());
    }

    #[test]
    fn debug_output_hides_token() {
        let client = GoogleSheetsClient::new("secret-token", Duration::from_secs(1));
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
