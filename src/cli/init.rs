//! sitracker init command implementation
//!
//! Writes a default `.sitracker.toml` unless one exists, then makes sure the
//! configured sheet carries the header row.

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::service::IssueService;

pub struct InitOptions {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct InitReport {
    config: PathBuf,
    created_config: bool,
    backend: &'static str,
    document_id: String,
    sheet_name: String,
}

pub fn run(options: InitOptions) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = match options.config {
        Some(path) => path,
        None => cwd.join(CONFIG_FILE),
    };

    // Never overwrite an existing file, even a broken one.
    let created_config = if config_path.exists() {
        false
    } else {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Config::default().save(&config_path)?;
        true
    };

    let config = Config::resolve(Some(&config_path), &cwd)?;
    let service = IssueService::from_config(&config)?;
    service.init_store()?;

    let report = InitReport {
        config: config_path.clone(),
        created_config,
        backend: config.store.backend.as_str(),
        document_id: config.store.document_id.clone(),
        sheet_name: config.store.sheet_name.clone(),
    };

    let header = if created_config {
        "sitracker init: wrote default config"
    } else {
        "sitracker init: config already present"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("config", config_path.display().to_string());
    human.push_summary("backend", report.backend);
    human.push_summary("document", report.document_id.clone());
    human.push_summary("sheet", report.sheet_name.clone());
    if !created_config {
        human.push_warning(format!("{} left unchanged", config_path.display()));
    }
    human.push_next_step("sitracker create --description \"...\"");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
        &human,
    )
}
