//! sitracker create/update/list command implementations

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::issue::{Issue, Status};
use crate::output::{emit_success, format_issue_line, HumanOutput, OutputOptions};
use crate::service::{DynSheetClient, IssueService};

pub struct CreateOptions {
    pub description: String,
    pub parent_id: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct UpdateOptions {
    pub id: String,
    pub status: Status,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub status: Option<Status>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ListReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
    total: usize,
    issues: &'a [Issue],
}

pub fn run_create(options: CreateOptions) -> Result<()> {
    let service = load_service(options.config)?;
    let issue = service.create_issue(&options.description, options.parent_id.as_deref())?;

    let mut human = HumanOutput::new(format!("sitracker create: {}", issue.id));
    human.push_issue(&issue);
    human.push_next_step(format!(
        "sitracker update {} --status IN_PROGRESS",
        issue.id
    ));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "create",
        &issue,
        &human,
    )
}

pub fn run_update(options: UpdateOptions) -> Result<()> {
    let service = load_service(options.config)?;
    let issue = service.update_issue_status(&options.id, options.status)?;

    let mut human = HumanOutput::new(format!("sitracker update: {} -> {}", issue.id, issue.status));
    human.push_issue(&issue);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "update",
        &issue,
        &human,
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let service = load_service(options.config)?;
    let issues = service.list_issues(options.status)?;

    let header = match options.status {
        Some(status) => format!("sitracker list: {} {} issue(s)", issues.len(), status),
        None => format!("sitracker list: {} issue(s)", issues.len()),
    };
    let mut human = HumanOutput::new(header);
    for issue in &issues {
        human.push_detail(format_issue_line(issue));
    }
    if issues.is_empty() && options.status.is_none() {
        human.push_next_step("sitracker create --description \"...\"");
    }

    let report = ListReport {
        status: options.status,
        total: issues.len(),
        issues: &issues,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &report,
        &human,
    )
}

fn load_service(config: Option<PathBuf>) -> Result<IssueService<DynSheetClient>> {
    let cwd = std::env::current_dir()?;
    let config = Config::resolve(config.as_deref(), &cwd)?;
    IssueService::from_config(&config)
}
