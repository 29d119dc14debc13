//! Just Breathe - a guided breathing app with spoken cues
//!
//! The interesting part lives in [`session`]: a cancellable countdown followed by
//! an inhale/exhale cycle driven by elapsed wall-clock time. Everything it talks
//! to (speech, wake lock, view, history) sits behind a small trait so the
//! controller can be exercised without a window or a sound card.

pub mod config;
pub mod session;
pub mod speech;
pub mod storage;
pub mod ui;
pub mod utils;
pub mod wake_lock;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BreatheError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("TTS error: {0}")]
    TTSError(String),

    #[error("Wake lock error: {0}")]
    WakeLockError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for BreatheError {
    fn from(e: std::io::Error) -> Self {
        BreatheError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for BreatheError {
    fn from(e: serde_json::Error) -> Self {
        BreatheError::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for BreatheError {
    fn from(e: toml::de::Error) -> Self {
        BreatheError::ConfigError(e.to_string())
    }
}

impl BreatheError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            BreatheError::AudioDeviceError(_) => false,
            // Model errors require restarting
            BreatheError::ModelLoadError(_) => false,
            // A failed utterance only costs one spoken cue
            BreatheError::TTSError(_) => true,
            BreatheError::WakeLockError(_) => true,
            BreatheError::StorageError(_) => true,
            BreatheError::SerializationError(_) => true,
            BreatheError::IOError(_) => false,
            BreatheError::ConfigError(_) => false,
            BreatheError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            BreatheError::AudioDeviceError(_) => {
                "Audio device error. Please check your speakers.".to_string()
            }
            BreatheError::ModelLoadError(_) => {
                "Failed to load the voice model. Cues will be shown as text only.".to_string()
            }
            BreatheError::TTSError(_) => {
                "Text-to-speech failed. Cues will be shown as text.".to_string()
            }
            BreatheError::WakeLockError(_) => {
                "Could not keep the screen awake during the session.".to_string()
            }
            BreatheError::StorageError(_) => "Could not access saved data.".to_string(),
            BreatheError::SerializationError(_) => "Saved data could not be read.".to_string(),
            BreatheError::IOError(_) => "File system error occurred.".to_string(),
            BreatheError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            BreatheError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BreatheError>;
