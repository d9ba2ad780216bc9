//! Human and JSON output for sitracker commands.
//!
//! Every command prints either a short human report or, with `--json`, one
//! envelope object:
//!
//! ```json
//! { "schema_version": "sitracker.v1", "command": "create", "status": "success", "data": { ... } }
//! ```
//!
//! Failures use the same envelope with `"status": "error"` and an `error`
//! object in place of `data`.

use std::fmt;

use serde::Serialize;

use crate::codec;
use crate::error::{Error, JsonError, Result};
use crate::issue::Issue;

pub const SCHEMA_VERSION: &str = "sitracker.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human-readable report: a headline, `key: value` facts, then optional
/// bullet sections.
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    headline: String,
    facts: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            ..Self::default()
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.facts.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, line: impl Into<String>) {
        self.details.push(line.into());
    }

    pub fn push_warning(&mut self, line: impl Into<String>) {
        self.warnings.push(line.into());
    }

    pub fn push_next_step(&mut self, line: impl Into<String>) {
        self.next_steps.push(line.into());
    }

    /// Facts describing one issue, timestamps in sheet format.
    pub fn push_issue(&mut self, issue: &Issue) {
        self.push_summary("status", issue.status.as_str());
        self.push_summary("description", issue.description.as_str());
        if let Some(parent) = &issue.parent_id {
            self.push_summary("parent", parent.as_str());
        }
        if let Some(created_at) = issue.created_at {
            self.push_summary("created", codec::format_timestamp(created_at));
        }
        if let Some(updated_at) = issue.updated_at {
            self.push_summary("updated", codec::format_timestamp(updated_at));
        }
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.headline)?;
        for (key, value) in &self.facts {
            if value.is_empty() {
                write!(f, "\n  {key}")?;
            } else {
                write!(f, "\n  {key}: {value}")?;
            }
        }
        if !self.details.is_empty() {
            writeln!(f)?;
            for line in &self.details {
                write!(f, "\n  {line}")?;
            }
        }
        write_section(f, "Warnings", &self.warnings)?;
        write_section(f, "Next steps", &self.next_steps)
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(f, "\n\n{title}:")?;
    for item in items {
        write!(f, "\n- {item}")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
    #[serde(skip_serializing_if = "no_items")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "no_items")]
    next_steps: &'a [String],
}

fn no_items(items: &&[String]) -> bool {
    items.is_empty()
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: &HumanOutput,
) -> Result<()> {
    if options.json {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings: &human.warnings,
            next_steps: &human.next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if !options.quiet {
        println!("{human}");
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hints = error_hints(err);
    if json {
        let envelope: Envelope<'_, ()> = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            data: None,
            error: Some(JsonError::from(err)),
            warnings: &[],
            next_steps: &hints,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hints.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// One issue per line: `AD-2  IN_PROGRESS  sub task  (parent AD-1)`.
pub fn format_issue_line(issue: &Issue) -> String {
    match &issue.parent_id {
        Some(parent) => format!(
            "{}  {}  {}  (parent {parent})",
            issue.id, issue.status, issue.description
        ),
        None => format!("{}  {}  {}", issue.id, issue.status, issue.description),
    }
}

/// Subcommand name for error envelopes, read before clap has parsed.
pub fn infer_command_name_from_args() -> String {
    std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with('-'))
        .unwrap_or_else(|| "sitracker".to_string())
}

fn error_hints(err: &Error) -> Vec<String> {
    let hint = match err {
        Error::NotFound(_) => "sitracker list",
        Error::InvalidConfig(_) => "fix .sitracker.toml then retry",
        Error::SchemaUnavailable(_) => "check store.document_id, then run sitracker init",
        Error::LockFailed(_) => "retry once the other sitracker process finishes",
        _ => return Vec::new(),
    };
    vec![hint.to_string()]
}
