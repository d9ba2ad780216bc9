//! Configuration loading and management
//!
//! Handles parsing of `.sitracker.toml` and the environment overrides that
//! select which tabular store the issues live in.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = ".sitracker.toml";

pub const ENV_CONFIG: &str = "SITRACKER_CONFIG";
pub const ENV_DOCUMENT_ID: &str = "SITRACKER_DOCUMENT_ID";
pub const ENV_BACKEND: &str = "SITRACKER_BACKEND";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Issue id settings
    #[serde(default)]
    pub issues: IssuesConfig,

    /// Where the issue sheet lives
    #[serde(default)]
    pub store: StoreConfig,
}

/// Issue-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuesConfig {
    /// Prefix of generated ids (`AD` -> `AD-1`)
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

fn default_id_prefix() -> String {
    "AD".to_string()
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
        }
    }
}

/// Backing store kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// JSON workbook on local disk
    #[default]
    File,
    /// Google Sheets spreadsheet
    Sheets,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::File => "file",
            Backend::Sheets => "sheets",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Backend::File),
            "sheets" => Ok(Backend::Sheets),
            other => Err(Error::InvalidConfig(format!(
                "store.backend: unknown backend '{other}' (expected file|sheets)"
            ))),
        }
    }
}

/// Tabular store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: Backend,

    /// Workbook file stem (file) or spreadsheet id (sheets)
    #[serde(default = "default_document_id")]
    pub document_id: String,

    /// Sheet (tab) holding the issues
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Directory holding local workbooks
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// HTTP timeout for the sheets backend
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the OAuth access token
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
}

fn default_document_id() -> String {
    "issues".to_string()
}

fn default_sheet_name() -> String {
    "Issues".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".sitracker")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_access_token_env() -> String {
    "SITRACKER_ACCESS_TOKEN".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            document_id: default_document_id(),
            sheet_name: default_sheet_name(),
            dir: default_dir(),
            timeout_secs: default_timeout_secs(),
            access_token_env: default_access_token_env(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the access token for the sheets backend.
    pub fn access_token(&self) -> Result<String> {
        let var = self.access_token_env.trim();
        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(Error::InvalidConfig(format!(
                "sheets backend needs an OAuth access token in ${var}"
            ))),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.document_id.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "store.document_id cannot be empty".to_string(),
            ));
        }
        let sheet = self.sheet_name.trim();
        if sheet.is_empty() {
            return Err(Error::InvalidConfig(
                "store.sheet_name cannot be empty".to_string(),
            ));
        }
        if sheet.contains('!') {
            return Err(Error::InvalidConfig(
                "store.sheet_name cannot contain '!'".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "store.timeout_secs must be > 0".to_string(),
            ));
        }
        if self.access_token_env.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "store.access_token_env cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl IssuesConfig {
    fn validate(&self) -> Result<()> {
        let prefix = self.id_prefix.trim();
        if prefix.is_empty() {
            return Err(Error::InvalidConfig(
                "issues.id_prefix cannot be empty".to_string(),
            ));
        }
        if !prefix.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(Error::InvalidConfig(
                "issues.id_prefix must be alphanumeric".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective configuration.
    ///
    /// Path precedence: `explicit`, then `$SITRACKER_CONFIG`, then
    /// `.sitracker.toml` under `cwd`. An explicitly named file must exist;
    /// the default one may be absent. Environment overrides apply last.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::load(&path)?,
            None => {
                let path = cwd.join(CONFIG_FILE);
                if path.exists() {
                    Self::load(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides()?;
        if config.store.dir.is_relative() {
            config.store.dir = cwd.join(&config.store.dir);
        }
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(backend) = std::env::var(ENV_BACKEND) {
            if !backend.trim().is_empty() {
                self.store.backend = Backend::parse(&backend)?;
            }
        }
        if let Ok(document_id) = std::env::var(ENV_DOCUMENT_ID) {
            if !document_id.trim().is_empty() {
                self.store.document_id = document_id.trim().to_string();
            }
        }
        self.validate()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.issues.validate()?;
        self.store.validate()?;
        Ok(())
    }
}
