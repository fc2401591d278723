//! Configuration management for culld
//!
//! This module handles loading, parsing, and managing configuration from:
//! 1. Embedded default_config.toml (compile-time defaults)
//! 2. User config at ~/.config/culld/config.toml (or the CULLD_CONFIG path)
//!
//! The directory API token may additionally come from the `CULLD_API_TOKEN`
//! environment variable, which takes precedence over the file value.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Default configuration embedded in binary
const DEFAULT_CONFIG: &str = include_str!("../../default_config.toml");

/// Environment variable overriding the configured API token
pub const TOKEN_ENV_VAR: &str = "CULLD_API_TOKEN";

/// Environment variable overriding the user config file location
pub const CONFIG_ENV_VAR: &str = "CULLD_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CullerConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub cull: CullConfig,
    #[serde(default)]
    pub tickets: TicketConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Session directory API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_url")]
    pub url: String,
    #[serde(default)]
    pub api_token: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: default_directory_url(),
            api_token: String::new(),
        }
    }
}

impl DirectoryConfig {
    /// Effective API token: environment variable first, file value second.
    pub fn resolve_token(&self) -> String {
        resolve_token(&self.api_token, std::env::var(TOKEN_ENV_VAR).ok())
    }
}

/// Cull policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CullConfig {
    /// Idle timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pass interval in seconds; 0 derives half the idle timeout
    #[serde(default)]
    pub interval_secs: u64,
    /// User homes are ephemeral/shared scratch space: skip ticket management
    #[serde(default)]
    pub local_home: bool,
    /// Container probe failure handling
    #[serde(default)]
    pub probe_failure: ProbeFailurePolicy,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            interval_secs: 0,
            local_home: false,
            probe_failure: ProbeFailurePolicy::default(),
        }
    }
}

impl CullConfig {
    /// Idle timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective pass interval; unset falls back to half the idle timeout.
    /// A zero interval would busy-loop, so the floor is one second.
    pub fn interval(&self) -> Duration {
        let secs = if self.interval_secs == 0 {
            self.timeout_secs / 2
        } else {
            self.interval_secs
        };
        Duration::from_secs(secs.max(1))
    }
}

/// What to do when the container-existence probe itself fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeFailurePolicy {
    /// Propagate the error and abort the pass; the next tick retries
    #[default]
    Abort,
    /// Log the error and treat the container as present, so the
    /// container-missing trigger never fires on uncertain data
    AssumePresent,
}

/// Access ticket helper settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Directory holding check_ticket.sh and delete_ticket.sh
    #[serde(default = "default_helper_dir")]
    pub helper_dir: PathBuf,
    /// Ticket path prefix passed to both scripts
    #[serde(default = "default_ticket_prefix")]
    pub prefix: String,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            helper_dir: default_helper_dir(),
            prefix: default_ticket_prefix(),
        }
    }
}

/// Record store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// The session manager's SQLite database
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_output: bool,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            file_path: None,
        }
    }
}

// ============================================================================
// Configuration loading
// ============================================================================

impl CullerConfig {
    /// Load configuration: embedded defaults, replaced by the user config
    /// file when one exists.
    pub fn load() -> ConfigResult<Self> {
        let mut config: CullerConfig = toml::from_str(DEFAULT_CONFIG)
            .map_err(|e| ConfigError::ParseError(format!("embedded defaults: {e}")))?;

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                config = Self::load_from_file(&user_config_path)?;
            }
        }

        config.expand_paths();
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_path_buf(),
        })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))
    }

    /// User config location: `CULLD_CONFIG` wins over the platform default.
    fn user_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("culld").join("config.toml"))
    }

    /// Reject configurations that cannot reach the directory at all.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.directory.resolve_token().is_empty() {
            return Err(ConfigError::MissingField {
                field: format!("directory.api_token (or {TOKEN_ENV_VAR})"),
            });
        }
        Ok(())
    }

    /// Expand `~` and environment references in user-supplied paths.
    fn expand_paths(&mut self) {
        self.tickets.helper_dir = expand_path(&self.tickets.helper_dir);
        self.store.db_path = expand_path(&self.store.db_path);
        if let Some(path) = self.logging.file_path.take() {
            self.logging.file_path = Some(expand_path(&path));
        }
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Env token wins over the configured one when present and non-empty.
fn resolve_token(configured: &str, env: Option<String>) -> String {
    match env {
        Some(token) if !token.is_empty() => token,
        _ => configured.to_string(),
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_directory_url() -> String {
    "http://127.0.0.1:8081/hub".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_helper_dir() -> PathBuf {
    PathBuf::from("/srv/jupyterhub/culler")
}

fn default_ticket_prefix() -> String {
    "/tmp/eos_".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/srv/jupyterhub/jupyterhub.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// Tests
// ============================================================================
