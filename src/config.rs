// ABOUTME: Configuration management for the IN450 viewer
// ABOUTME: Persists the last connection profile and preferences as JSON, never the password

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::DEFAULT_ROW_LIMIT;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

/// Connection parameters for the PostgreSQL server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionProfile {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

pub fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "in450db".to_string()
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_port(),
            database: default_database(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Values supplied from outside the config file (environment, command line).
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionProfile {
    pub fn apply(&mut self, overrides: &ProfileOverrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(database) = &overrides.database {
            self.database = database.clone();
        }
        if let Some(username) = &overrides.username {
            self.username = username.clone();
        }
        if let Some(password) = &overrides.password {
            self.password = password.clone();
        }
    }

    /// Fill the user field with the OS account name when nothing was configured
    pub fn with_login_user_fallback(mut self) -> Self {
        if self.username.trim().is_empty() {
            self.username = whoami::username();
        }
        self
    }

    /// `user@host:port/database`, safe for logs and titles
    pub fn display_target(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}

/// Application preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,
}

fn default_row_limit() -> u32 {
    DEFAULT_ROW_LIMIT
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            row_limit: default_row_limit(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub profile: ConnectionProfile,
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_version() -> u32 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            profile: ConnectionProfile::default(),
            preferences: Preferences::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path based on OS
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirFound)?;
        let app_dir = config_dir.join("IN450 Viewer");
        Ok(app_dir.join("config.json"))
    }

    /// Load config from the default location, or create it if it does not exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from `path`, writing defaults there first if the file is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` (or the default location), falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let loaded = match path {
            Some(p) => Self::load_from(p),
            None => Self::load(),
        };
        loaded.unwrap_or_else(|e| {
            log::warn!("Using default configuration: {}", e);
            Self::default()
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Remember a profile that just logged in successfully
    pub fn remember_profile(&mut self, profile: &ConnectionProfile) {
        self.profile = ConnectionProfile {
            password: String::new(),
            ..profile.clone()
        };
    }
}
