//! Configuration loading and data folder resolution
//!
//! Bootstrap configuration comes from a TOML file. Every field is optional:
//! a missing file degrades to compiled defaults with a warning, a malformed
//! file is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "AMPLIFY_DATA_FOLDER";

/// Default HTTP port (same port the dashboard has always targeted)
pub const DEFAULT_PORT: u16 = 8000;

/// Default persistence file name, relative to the data folder
pub const DEFAULT_GRAPH_FILE: &str = "Grafo.txt";

/// Bootstrap configuration loaded from `amplify.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Folder holding persisted graph files
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Address the HTTP server binds to
    #[serde(default)]
    pub bind_address: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Default file for save/load, relative to the data folder
    #[serde(default)]
    pub graph_file: Option<String>,

    /// Restore `graph_file` at startup if it exists
    #[serde(default)]
    pub load_on_startup: Option<bool>,

    /// Origins allowed by CORS
    #[serde(default)]
    pub cors_origins: Option<Vec<String>>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Spotify catalog credentials and tuning
    #[serde(default)]
    pub spotify: SpotifyConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
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

/// Spotify section of the TOML file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Market used for top-track lookups (ISO 3166-1 alpha-2)
    #[serde(default)]
    pub market: Option<String>,
    /// Whole-import timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    pub fn bind_address(&self) -> String {
        self.bind_address
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn graph_file(&self) -> String {
        self.graph_file
            .clone()
            .unwrap_or_else(|| DEFAULT_GRAPH_FILE.to_string())
    }

    pub fn load_on_startup(&self) -> bool {
        self.load_on_startup.unwrap_or(true)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins.clone().unwrap_or_else(|| {
            vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ]
        })
    }
}

/// Load TOML configuration with graceful degradation
///
/// A missing file yields `TomlConfig::default()` and a warning; unreadable
/// or unparsable files are errors.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Default config file location: `<config_dir>/amplify/amplify.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("amplify").join("amplify.toml"))
        .unwrap_or_else(|| PathBuf::from("amplify.toml"))
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("amplify"))
        .unwrap_or_else(|| PathBuf::from("./amplify_data"))
}

/// Data folder resolution, priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable `AMPLIFY_DATA_FOLDER`
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// Create the data folder if missing
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        info!("Creating data folder: {}", path.display());
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
