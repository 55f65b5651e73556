//! Configuration file (`~/.pgsp.yaml`).
//!
//! Every field is optional; missing fields take their defaults. Command-line
//! flags are applied on top by the binary.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerConfig;
use crate::tui::RenderConfig;

/// File name looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".pgsp.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// libpq connection string; PG* environment variables when absent.
    pub dsn: Option<String>,
    /// Connect over TLS.
    pub tls: bool,
    /// Tick interval in milliseconds.
    pub interval_ms: u64,
    /// Seconds a finished operation stays on screen.
    pub after_completion_secs: u64,
    /// Minimum terminal width for the tabular form.
    pub wide_threshold: u16,
    /// Lines reserved per entry in the vertical form.
    pub compact_line_budget: u16,
    /// Kinds to monitor; empty means all.
    pub targets: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dsn: None,
            tls: false,
            interval_ms: 500,
            after_completion_secs: 10,
            wide_threshold: 120,
            compact_line_budget: 15,
            targets: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// File is not valid YAML for [`Config`].
    Parse { path: PathBuf, message: String },
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "invalid config {}: {}", path.display(), message)
            }
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, `~/.pgsp.yaml` is read when
    /// present and defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid("interval_ms must be positive".into()));
        }
        if self.compact_line_budget == 0 {
            return Err(ConfigError::Invalid(
                "compact_line_budget must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_millis(self.interval_ms),
            retention: Duration::from_secs(self.after_completion_secs),
            render: RenderConfig {
                wide_threshold: self.wide_threshold,
                compact_line_budget: self.compact_line_budget,
            },
        }
    }
}

/// `~/.pgsp.yaml`, when the home directory is known.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}
