//! Process configuration.
//!
//! Ports, storage paths, and expiry intervals are collaborator concerns
//! rather than game rules, so they live here at the binary edge: a TOML
//! file with an environment-variable override for the database path.

use crate::games::tictactoe::Difficulty;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {}", message)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Runtime configuration for the room server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database holding game records.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Seconds of inactivity after which a room is expired.
    #[serde(default = "default_idle_expiry_secs")]
    pub idle_expiry_secs: u64,

    /// Difficulty used when a request does not specify one.
    #[serde(default)]
    pub default_difficulty: Difficulty,
}

fn default_db_path() -> String {
    "noughts.db".to_string()
}

fn default_idle_expiry_secs() -> u64 {
    // One hour of silence before a room is reclaimed.
    3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            idle_expiry_secs: default_idle_expiry_secs(),
            default_difficulty: Difficulty::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file, falling back to defaults if
    /// the file does not exist. `NOUGHTS_DB` overrides the database path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            debug!("loading config from file");
            let content = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?
        } else {
            debug!("config file absent, using defaults");
            Self::default()
        };

        if let Ok(db_path) = std::env::var("NOUGHTS_DB") {
            config.db_path = db_path;
        }

        info!(db_path = %config.db_path, idle_expiry_secs = config.idle_expiry_secs, "config loaded");
        Ok(config)
    }
}
