//! Bot configuration loaded from TOML and the environment.

use derive_getters::Getters;
use derive_more::{Display, Error};
use gamebot_tictactoe::Difficulty;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding the inactivity window, in seconds.
pub const SESSION_TIMEOUT_ENV: &str = "GAMEBOT_SESSION_TIMEOUT_SECS";

/// Runtime settings for game sessions.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct BotConfig {
    /// Seconds without an accepted move before a game times out.
    #[serde(default = "default_session_timeout_secs")]
    session_timeout_secs: u64,

    /// Seconds between sweeps for idle games.
    #[serde(default = "default_reaper_interval_secs")]
    reaper_interval_secs: u64,

    /// Computer strength when a game request names none.
    #[serde(default)]
    default_difficulty: Difficulty,
}

fn default_session_timeout_secs() -> u64 {
    180
}

fn default_reaper_interval_secs() -> u64 {
    5
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: default_session_timeout_secs(),
            reaper_interval_secs: default_reaper_interval_secs(),
            default_difficulty: Difficulty::default(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(
            session_timeout_secs = config.session_timeout_secs,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup (the environment in
    /// production, a map in tests).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(SESSION_TIMEOUT_ENV) {
            self.session_timeout_secs = raw.trim().parse().map_err(|e| {
                ConfigError::new(format!("Invalid {}={:?}: {}", SESSION_TIMEOUT_ENV, raw, e))
            })?;
            debug!(secs = self.session_timeout_secs, "Session timeout overridden");
        }
        self.validate()?;
        Ok(self)
    }

    /// Inactivity window as a duration.
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    /// Reaper interval as a duration.
    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session_timeout_secs == 0 {
            warn!("Rejecting zero session timeout");
            return Err(ConfigError::new(
                "session_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.reaper_interval_secs == 0 {
            warn!("Rejecting zero reaper interval");
            return Err(ConfigError::new(
                "reaper_interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
