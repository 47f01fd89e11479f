//! Configuration loading and data folder resolution
//!
//! Every setting is resolved with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or malformed TOML file is never fatal: a warning is logged
//! and the remaining tiers are consulted.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "GRADEDESK_API_URL";

/// Environment variable overriding the data folder
pub const ENV_DATA_FOLDER: &str = "GRADEDESK_DATA_FOLDER";

/// API base URL used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// File name of the persisted bearer token inside the data folder
pub const CREDENTIAL_FILE_NAME: &str = "credential";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the grading API (e.g. `http://127.0.0.1:8000`)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Folder holding the credential file
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line, all optional
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_base_url: Option<String>,
    pub data_folder: Option<PathBuf>,
    /// Explicit config file; replaces the platform search path
    pub config_file: Option<PathBuf>,
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without trailing slash
    pub api_base_url: String,
    pub data_folder: PathBuf,
    pub log_level: String,
}

impl ClientConfig {
    /// Resolve configuration from CLI overrides, environment, TOML and defaults
    pub fn resolve(overrides: &CliOverrides) -> Self {
        let toml_config = match overrides.config_file.clone().or_else(default_config_file) {
            Some(path) => match load_toml_config(&path) {
                Ok(config) => {
                    debug!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    TomlConfig::default()
                }
            },
            None => TomlConfig::default(),
        };

        Self::from_sources(overrides, &toml_config)
    }

    /// Apply the priority order against an already-loaded TOML config
    pub fn from_sources(overrides: &CliOverrides, toml_config: &TomlConfig) -> Self {
        let api_base_url = overrides
            .api_base_url
            .clone()
            .or_else(|| non_empty_env(ENV_API_URL))
            .or_else(|| toml_config.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let data_folder = overrides
            .data_folder
            .clone()
            .or_else(|| non_empty_env(ENV_DATA_FOLDER).map(PathBuf::from))
            .or_else(|| toml_config.data_folder.clone())
            .unwrap_or_else(get_default_data_folder);

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            data_folder,
            log_level: toml_config.logging.level.clone(),
        }
    }

    /// Location of the persisted credential
    pub fn credential_path(&self) -> PathBuf {
        self.data_folder.join(CREDENTIAL_FILE_NAME)
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Platform config file location, if one exists
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("gradedesk").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/gradedesk/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default data folder path
fn get_default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/gradedesk
        dirs::data_local_dir()
            .map(|d| d.join("gradedesk"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/gradedesk"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/gradedesk
        dirs::data_dir()
            .map(|d| d.join("gradedesk"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/gradedesk"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\gradedesk
        dirs::data_local_dir()
            .map(|d| d.join("gradedesk"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\gradedesk"))
    } else {
        PathBuf::from("./gradedesk_data")
    }
}
