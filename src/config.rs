//! Application configuration
//!
//! Provides centralized configuration for all components, optionally loaded
//! from a TOML file.

use crate::session::SessionConfig;
use crate::speech::TTSConfig;
use crate::{BreatheError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV_VAR: &str = "BREATHE_CONFIG";

/// Configuration for the complete application
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Countdown and tick timing
    pub session: SessionConfig,

    /// Voice model configuration
    pub speech: TTSConfig,

    /// Whether to speak cues at all
    pub enable_speech: bool,

    /// Whether to keep the display awake during sessions
    pub enable_wake_lock: bool,

    /// Where history and preferences are stored (platform data dir if unset)
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            speech: TTSConfig::default(),
            enable_speech: true,
            enable_wake_lock: true,
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Create a new configuration with voice model paths
    pub fn with_voice(tts_model: impl Into<String>, tts_tokens: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.speech.model_path = tts_model.into();
        config.speech.tokens_path = tts_tokens.into();
        config
    }

    /// Set the session timing
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Set the storage directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Disable spoken cues (text-only mode)
    pub fn without_speech(mut self) -> Self {
        self.enable_speech = false;
        self
    }

    /// Never take a wake lock
    pub fn without_wake_lock(mut self) -> Self {
        self.enable_wake_lock = false;
        self
    }

    /// Check if spoken cues should be attempted
    pub fn speech_enabled(&self) -> bool {
        self.enable_speech && self.speech.is_configured()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.session.tick_interval_ms == 0 || self.session.tick_interval_ms > 100 {
            return Err(BreatheError::ConfigError(format!(
                "tick_interval_ms must be between 1 and 100, got {}",
                self.session.tick_interval_ms
            )));
        }

        if self.speech_enabled() {
            self.speech.validate()?;
        }

        Ok(())
    }

    /// Parse a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the config from `$BREATHE_CONFIG` or the platform config dir.
    ///
    /// A missing file means defaults. A broken file is reported and ignored.
    pub fn load() -> Self {
        let path = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Some(PathBuf::from(path)),
            None => default_config_path(),
        };

        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// `config.toml` inside the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("just-breathe").join("config.toml"))
}
