//! Spoken cues
//!
//! This module provides:
//! - The [`Announcer`] seam the session controller speaks through
//! - Text-to-speech (TTS) using VITS models via sherpa-rs
//! - A silent fallback for when no voice is available

pub mod tts;
pub mod voice;

pub use tts::{normalize_text_for_tts, TTSConfig, TTSEngine, VITS_SAMPLE_RATE};
pub use voice::{VoiceAnnouncer, VoiceCommand};

use tokio::sync::oneshot;
use tracing::debug;

/// Speaks short phrases.
///
/// Implementations must never fail loudly: when speech is unavailable `speak`
/// returns `None` and `cancel` does nothing.
pub trait Announcer: Send + Sync {
    /// Start speaking `text`, silencing anything still playing.
    ///
    /// Returns a signal that resolves once the utterance has finished, or
    /// `None` if the caller should fall back to a fixed delay.
    fn speak(&self, text: &str) -> Option<CompletionSignal>;

    /// Silence any in-flight utterance
    fn cancel(&self);
}

/// Resolves when an utterance finished playing or was cut off
#[derive(Debug)]
pub struct CompletionSignal {
    rx: oneshot::Receiver<()>,
}

impl CompletionSignal {
    /// Create a signal and the sender that completes it
    pub fn channel() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A signal that is already complete
    pub fn completed() -> Self {
        let (tx, signal) = Self::channel();
        let _ = tx.send(());
        signal
    }

    /// Wait for the utterance to end.
    ///
    /// A dropped sender counts as finished.
    pub async fn finished(self) {
        let _ = self.rx.await;
    }
}

/// Announcer used when no voice is configured or available
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn speak(&self, text: &str) -> Option<CompletionSignal> {
        debug!("Speech unavailable, not speaking: {}", text);
        None
    }

    fn cancel(&self) {}
}
