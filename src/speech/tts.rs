//! Text-to-speech implementation with sherpa-rs (VITS models)
//!
//! Synthesizes the short cue phrases into mono f32 samples. Playback lives in
//! [`super::voice`].

use crate::{BreatheError, Result};
use serde::{Deserialize, Serialize};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use tracing::{debug, info};

/// Default sample rate for VITS TTS output (22050 Hz typical for Piper models)
pub const VITS_SAMPLE_RATE: u32 = 22050;

/// Speaking rate for cues; a little slower than conversational speech
pub const CUE_SPEED: f32 = 0.85;

/// Configuration for the TTS engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TTSConfig {
    /// Path to the ONNX model file
    pub model_path: String,

    /// Path to the tokens file
    pub tokens_path: String,

    /// Path to the lexicon file (optional for some models)
    pub lexicon_path: Option<String>,

    /// Path to the espeak-ng data directory (optional)
    pub data_dir: Option<String>,

    /// Length scale for speech rate (1.0 = normal, >1.0 = slower)
    pub length_scale: f32,

    /// Noise scale for variation
    pub noise_scale: f32,

    /// Noise scale width
    pub noise_scale_w: f32,

    /// Speaker ID for multi-speaker models
    pub speaker_id: i32,

    /// Output volume (0.0 to 1.0)
    pub volume: f32,

    /// Maximum number of pending commands for the voice worker
    pub queue_size: usize,
}

impl Default for TTSConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            tokens_path: String::new(),
            lexicon_path: None,
            data_dir: None,
            length_scale: 1.0 / CUE_SPEED,
            noise_scale: 0.667,
            noise_scale_w: 0.8,
            speaker_id: 0,
            volume: 0.9,
            queue_size: 16,
        }
    }
}

impl TTSConfig {
    /// Create a new TTS config with required paths
    pub fn new(model_path: impl Into<String>, tokens_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            tokens_path: tokens_path.into(),
            ..Default::default()
        }
    }

    /// Set the lexicon path
    pub fn with_lexicon(mut self, lexicon_path: impl Into<String>) -> Self {
        self.lexicon_path = Some(lexicon_path.into());
        self
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<String>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Set the speaker ID for multi-speaker models
    pub fn with_speaker(mut self, speaker_id: i32) -> Self {
        self.speaker_id = speaker_id;
        self
    }

    /// Set the speech rate (length scale)
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.length_scale = 1.0 / speed.max(0.1); // Invert: higher speed = lower length_scale
        self
    }

    /// Set the playback volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Check if a model has been configured at all
    pub fn is_configured(&self) -> bool {
        !self.model_path.is_empty() && !self.tokens_path.is_empty()
    }

    /// Check that the model files exist
    pub fn validate(&self) -> Result<()> {
        if self.model_path.is_empty() {
            return Err(BreatheError::ConfigError("Model path is required".into()));
        }

        if self.tokens_path.is_empty() {
            return Err(BreatheError::ConfigError("Tokens path is required".into()));
        }

        if !Path::new(&self.model_path).exists() {
            return Err(BreatheError::ModelLoadError(format!(
                "Model not found: {}",
                self.model_path
            )));
        }

        if !Path::new(&self.tokens_path).exists() {
            return Err(BreatheError::ModelLoadError(format!(
                "Tokens file not found: {}",
                self.tokens_path
            )));
        }

        Ok(())
    }
}

/// TTS Engine wrapping sherpa-rs VitsTts
pub struct TTSEngine {
    tts: VitsTts,
    config: TTSConfig,
}

impl TTSEngine {
    /// Create a new TTS engine
    pub fn new(config: TTSConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading VITS TTS model from: {}", config.model_path);

        let vits_config = VitsTtsConfig {
            model: config.model_path.clone(),
            tokens: config.tokens_path.clone(),
            lexicon: config.lexicon_path.clone().unwrap_or_default(),
            data_dir: config.data_dir.clone().unwrap_or_default(),
            length_scale: config.length_scale,
            noise_scale: config.noise_scale,
            noise_scale_w: config.noise_scale_w,
            ..Default::default()
        };

        let tts = VitsTts::new(vits_config);

        info!("TTS engine initialized successfully");

        Ok(Self { tts, config })
    }

    /// Synthesize text to audio samples
    pub fn synthesize(&mut self, text: &str) -> Result<(Vec<f32>, u32)> {
        let normalized = normalize_text_for_tts(text);
        if normalized.is_empty() {
            return Ok((Vec::new(), VITS_SAMPLE_RATE));
        }

        debug!("Synthesizing: {}", normalized);

        let audio = self
            .tts
            .create(&normalized, self.config.speaker_id, 1.0)
            .map_err(|e| BreatheError::TTSError(format!("Synthesis failed: {}", e)))?;

        let sample_rate = audio.sample_rate as u32;

        debug!(
            "Synthesized {} samples ({:.2}s)",
            audio.samples.len(),
            audio.samples.len() as f32 / sample_rate as f32
        );

        Ok((audio.samples, sample_rate))
    }

    pub fn config(&self) -> &TTSConfig {
        &self.config
    }
}

/// Normalize text for TTS synthesis
///
/// VITS models read digits poorly, so numbers are spelled out. Whitespace is
/// collapsed and characters the tokenizer does not know are dropped.
pub fn normalize_text_for_tts(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            let mut num = String::from(c);
            while let Some(&next) = chars.peek() {
                if !next.is_ascii_digit() {
                    break;
                }
                num.push(next);
                chars.next();
            }
            result.push_str(&number_to_words(&num));
        } else {
            result.push(c);
        }
    }

    let result: String = result
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,!?;:'-".contains(*c))
        .collect();

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convert a number string to words (simple implementation)
fn number_to_words(num_str: &str) -> String {
    let num: u32 = match num_str.parse() {
        Ok(n) => n,
        Err(_) => return num_str.to_string(),
    };

    let ones = [
        "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
        "eighteen", "nineteen",
    ];

    let tens = [
        "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    ];

    match num {
        0 => "zero".to_string(),
        1..=19 => ones[num as usize].to_string(),
        20..=99 => {
            let t = (num / 10) as usize;
            let o = (num % 10) as usize;
            if o == 0 {
                tens[t].to_string()
            } else {
                format!("{}-{}", tens[t], ones[o])
            }
        }
        100..=999 => {
            let h = (num / 100) as usize;
            let rem = num % 100;
            if rem == 0 {
                format!("{} hundred", ones[h])
            } else {
                format!("{} hundred {}", ones[h], number_to_words(&rem.to_string()))
            }
        }
        _ => num_str.to_string(), // Fall back for large numbers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tts_config_default() {
        let config = TTSConfig::default();
        assert_eq!(config.speaker_id, 0);
        assert!(config.lexicon_path.is_none());
        assert!(!config.is_configured());
        assert!((config.length_scale - 1.0 / CUE_SPEED).abs() < 0.001);
    }

    #[test]
    fn test_tts_config_builder() {
        let config = TTSConfig::new("model.onnx", "tokens.txt")
            .with_lexicon("lexicon.txt")
            .with_speaker(5)
            .with_volume(1.5)
            .with_speed(1.5);

        assert_eq!(config.model_path, "model.onnx");
        assert_eq!(config.tokens_path, "tokens.txt");
        assert_eq!(config.lexicon_path, Some("lexicon.txt".to_string()));
        assert_eq!(config.speaker_id, 5);
        assert_eq!(config.volume, 1.0);
        assert!(config.is_configured());
        assert!((config.length_scale - 0.667).abs() < 0.01); // 1.0 / 1.5
    }

    #[test]
    fn test_validate_missing_files() {
        assert!(matches!(
            TTSConfig::default().validate(),
            Err(BreatheError::ConfigError(_))
        ));
        assert!(matches!(
            TTSConfig::new("/nonexistent/model.onnx", "/nonexistent/tokens.txt").validate(),
            Err(BreatheError::ModelLoadError(_))
        ));
    }

    #[test]
    fn test_engine_rejects_missing_model() {
        assert!(TTSEngine::new(TTSConfig::new("/nonexistent.onnx", "/nonexistent.txt")).is_err());
    }

    #[test]
    fn test_normalize_countdown_cues() {
        assert_eq!(normalize_text_for_tts("Starting in 3"), "Starting in three");
        assert_eq!(normalize_text_for_tts("2"), "two");
        assert_eq!(normalize_text_for_tts("1"), "one");
        assert_eq!(normalize_text_for_tts("Breathe in"), "Breathe in");
    }

    #[test]
    fn test_normalize_whitespace_and_symbols() {
        assert_eq!(normalize_text_for_tts("  All   done ✨ "), "All done");
        assert_eq!(normalize_text_for_tts(""), "");
    }

    #[test]
    fn test_number_to_words() {
        assert_eq!(number_to_words("0"), "zero");
        assert_eq!(number_to_words("1"), "one");
        assert_eq!(number_to_words("15"), "fifteen");
        assert_eq!(number_to_words("20"), "twenty");
        assert_eq!(number_to_words("42"), "forty-two");
        assert_eq!(number_to_words("100"), "one hundred");
        assert_eq!(number_to_words("123"), "one hundred twenty-three");
    }
}
