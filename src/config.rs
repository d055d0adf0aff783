//! Configuration for the daemon.
//!
//! Two files are involved:
//! - the watch configuration (`server.yaml`), a YAML mapping from config key
//!   to the reload command and the paths that trigger it;
//! - the daemon settings (`settings.toml`), layered from defaults, an
//!   optional TOML file and environment variables.
//!
//! # Environment Variables
//!
//! Settings overrides use the `CONFIGWATCHD_` prefix and double underscores
//! to separate nested levels:
//! - `CONFIGWATCHD_SERVER__PORT=6000` sets `server.port`
//! - `CONFIGWATCHD_QUEUE__FLUSH_INTERVAL_MS=250` sets `queue.flush_interval_ms`
//! - `CONFIGWATCHD_SHELL=zsh` sets `shell`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name under the user config dir.
pub const APP_DIR: &str = "configwatchd";

/// Default loopback port for the queue service.
pub const DEFAULT_PORT: u16 = 53673;

/// Errors from loading either configuration surface.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Must provide a config file")]
    Missing,

    #[error("Config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to open {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode yaml from {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid settings: {0}")]
    Settings(#[from] Box<figment::Error>),
}

/// One watched command and the paths that trigger it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigEntry {
    /// Shell command run on reload.
    pub command: String,

    /// Watch paths, optionally starting with `~` for the home directory.
    #[serde(default)]
    pub watch: Vec<String>,
}

/// Config key -> entry, in file order.
pub type ConfigMap = IndexMap<String, ConfigEntry>;

/// Default location of the watch configuration.
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("server.yaml"))
}

/// Default location of the daemon settings file.
pub fn default_settings_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("settings.toml"))
}

/// Load the watch configuration from a YAML file.
///
/// An empty document yields an empty map.
pub fn load_config_map(path: &Path) -> Result<ConfigMap, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_map(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn parse_config_map(content: &str) -> Result<ConfigMap, serde_yaml::Error> {
    let parsed: Option<ConfigMap> = serde_yaml::from_str(content)?;
    Ok(parsed.unwrap_or_default())
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Queue service endpoint
    #[serde(default)]
    pub server: ServerConfig,

    /// Queue behaviour
    #[serde(default)]
    pub queue: QueueConfig,

    /// Program that runs reload commands as `<shell> -c <command>`
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Log filtering
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Interface the queue service binds to (loopback only by default)
    #[serde(default = "default_bind")]
    pub bind: String,

    /// TCP port shared by the server and the client commands
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueueConfig {
    /// Drain interval in immediate mode
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `"configwatchd::watcher" = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_shell() -> String {
    "bash".to_string()
}
fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_flush_interval_ms() -> u64 {
    500
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            queue: QueueConfig::default(),
            shell: default_shell(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding and dialing.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Settings {
    /// Load settings from defaults, the settings file and the environment.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Some(path.to_path_buf())
            }
            None => default_settings_file(),
        };

        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }

        figment
            .merge(Env::prefixed("CONFIGWATCHD_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".") // Double underscore becomes dot
                    .into()
            }))
            .extract()
            .map_err(|e| ConfigError::Settings(Box::new(e)))
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
