// src/config/loader.rs
//! Configuration loader with validation

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::MonitorConfig;
use crate::utils::validation::ValidationError;

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    /// Configured path does not exist
    FileNotFound(String),
    /// File exists but is not valid TOML for [`MonitorConfig`]
    ParseError(String),
    /// Parsed config failed range or cross-field validation
    ValidationError(ValidationError),
    /// Underlying filesystem failure
    IoError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Configuration file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Configuration parse error: {}", msg),
            ConfigError::ValidationError(err) => write!(f, "Configuration validation error: {}", err),
            ConfigError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::ValidationError(err)
    }
}

/// Loads and validates monitoring configuration from TOML files
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader with no configured path; `load` returns defaults
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader reading from a specific path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load the configuration, falling back to defaults when no path is set.
    /// The result is always validated before being returned.
    pub fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let config = match &self.config_path {
            Some(path) => Self::load_file(path)?,
            None => MonitorConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<MonitorConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
