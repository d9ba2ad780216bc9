#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Scratch working directory for driving the `sitracker` binary.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".sitracker.toml", contents)
    }

    /// Default location of the file-backend workbook.
    pub fn workbook_path(&self) -> PathBuf {
        self.dir.path().join(".sitracker").join("issues.json")
    }

    /// Raw rows of `sheet` in the default workbook.
    pub fn sheet_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(self.workbook_path())?;
        let book: Value = serde_json::from_str(&content)?;
        let rows = serde_json::from_value(book["sheets"][sheet].clone())?;
        Ok(rows)
    }

    /// `sitracker` run inside this directory, isolated from the caller's env.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sitracker").expect("binary");
        cmd.current_dir(self.path())
            .env_remove("SITRACKER_CONFIG")
            .env_remove("SITRACKER_BACKEND")
            .env_remove("SITRACKER_DOCUMENT_ID")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run with `--json` and parse the envelope printed on stdout.
    pub fn json(&self, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self.cmd().args(args).arg("--json").output()?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
