//! Configuration loading
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable default TOML file is not fatal: the remaining
//! tiers apply. Resolution usually runs before logging is set up, so what
//! happened to the file is returned as [`ConfigNote`]s for the caller to log
//! once its subscriber is installed.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name used under the platform config and data directories
pub const APP_DIR: &str = "candidate-intake";

pub const ENV_BIND: &str = "INTAKE_BIND";
pub const ENV_PORT: &str = "INTAKE_PORT";
pub const ENV_DATA_FILE: &str = "INTAKE_DATA_FILE";
pub const ENV_LOG_LEVEL: &str = "INTAKE_LOG_LEVEL";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub bind: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Path to the candidates JSON document
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Values given on the command line; `None` defers to lower tiers
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub data_file: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Explicit TOML path instead of the platform default location
    pub config_file: Option<PathBuf>,
}

/// What resolution did with a TOML config file
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNote {
    Loaded(PathBuf),
    /// Default-location file that failed to load and was skipped
    Ignored { path: PathBuf, reason: String },
}

impl ConfigNote {
    pub fn log(&self) {
        match self {
            ConfigNote::Loaded(path) => info!("Loaded config file: {}", path.display()),
            ConfigNote::Ignored { path, reason } => {
                warn!("Ignoring config file {}: {}", path.display(), reason)
            }
        }
    }
}

/// Resolved configuration plus the notes gathered on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub config: ServiceConfig,
    pub notes: Vec<ConfigNote>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub log_level: String,
}

impl ServiceConfig {
    /// Resolve every setting through the four tiers
    pub fn resolve(overrides: &Overrides) -> Result<Resolved> {
        let mut notes = Vec::new();
        let toml = match &overrides.config_file {
            // An explicitly requested file must load
            Some(path) => {
                let config = load_toml_config(path)?;
                notes.push(ConfigNote::Loaded(path.clone()));
                config
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => match load_toml_config(&path) {
                    Ok(config) => {
                        notes.push(ConfigNote::Loaded(path));
                        config
                    }
                    Err(e) => {
                        notes.push(ConfigNote::Ignored {
                            path,
                            reason: e.to_string(),
                        });
                        TomlConfig::default()
                    }
                },
                None => TomlConfig::default(),
            },
        };

        let port = match (&overrides.port, std::env::var(ENV_PORT).ok()) {
            (Some(port), _) => *port,
            (None, Some(raw)) => raw
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a valid port: {}", ENV_PORT, raw)))?,
            (None, None) => toml.port.unwrap_or(DEFAULT_PORT),
        };

        let bind = overrides
            .bind
            .clone()
            .or_else(|| std::env::var(ENV_BIND).ok())
            .or(toml.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let data_file = overrides
            .data_file
            .clone()
            .or_else(|| std::env::var(ENV_DATA_FILE).ok().map(PathBuf::from))
            .or(toml.data_file)
            .unwrap_or_else(default_data_file);

        let log_level = overrides
            .log_level
            .clone()
            .or_else(|| std::env::var(ENV_LOG_LEVEL).ok())
            .or(toml.logging.level)
            .unwrap_or_else(|| "info".to_string());

        Ok(Resolved {
            config: Self {
                bind,
                port,
                data_file,
                log_level,
            },
            notes,
        })
    }

    /// `bind:port` for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    Ok(config)
}

/// Platform config file location, e.g. `~/.config/candidate-intake/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Platform default for the candidates document
pub fn default_data_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./intake_data"))
        .join("candidates.json")
}
