//! Configuration loading and resolution
//!
//! Settings come from, in priority order:
//! 1. Command-line arguments
//! 2. Environment variables (handled by clap `env` attributes in the binaries)
//! 3. TOML bootstrap file
//! 4. Compiled defaults
//!
//! A missing TOML file is not an error: defaults apply and a warning is logged.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::pattern::DEFAULT_GRID_SIZE;
use crate::{Error, Result};

/// Default HTTP port for the collection service
pub const DEFAULT_PORT: u16 = 5780;

/// Default request body cap (bytes) for pattern submissions
pub const DEFAULT_MAX_BODY_BYTES: usize = 50_000;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional in the file; absent fields fall back to defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to SQLite database file
    pub database_path: Option<PathBuf>,

    /// Bind address
    pub host: Option<String>,

    /// HTTP server port
    pub port: Option<u16>,

    /// Grid edge length (cells per side)
    pub grid_size: Option<u32>,

    /// Token required in `x-admin-token` for admin routes; admin routes are
    /// refused when unset
    pub admin_token: Option<String>,

    /// Maximum accepted request body in bytes
    pub max_body_bytes: Option<usize>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }

    /// Load `path` (or the platform default path) if it exists, else defaults
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!("Config file not found: {} (using defaults)", path.display());
            return Ok(Self::default());
        }

        info!("Loading config: {}", path.display());
        Self::from_file(&path)
    }
}

/// Values supplied on the command line or via environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub admin_token: Option<String>,
}

/// Fully resolved settings used at runtime
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub grid_size: u32,
    pub admin_token: Option<String>,
    pub max_body_bytes: usize,
    pub log_level: String,
}

impl Settings {
    /// Merge overrides over file values over compiled defaults
    pub fn resolve(overrides: Overrides, file: TomlConfig) -> Result<Self> {
        let grid_size = file.grid_size.unwrap_or(DEFAULT_GRID_SIZE);
        if grid_size == 0 {
            return Err(Error::Config("grid_size must be at least 1".to_string()));
        }

        // Blank token disables admin routes
        let admin_token = overrides
            .admin_token
            .or(file.admin_token)
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or_else(default_database_path),
            host: overrides
                .host
                .or(file.host)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            grid_size,
            admin_token,
            max_body_bytes: file.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES),
            log_level: file.logging.level,
        })
    }
}

/// Platform config file location (`<config_dir>/dotgrid/dotgrid.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dotgrid").join("dotgrid.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("dotgrid"))
        .unwrap_or_else(|| PathBuf::from("./dotgrid_data"))
        .join("data.db")
}
