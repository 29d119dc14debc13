//! Saved breathing preferences for the form

use super::{KeyValueStore, PREFS_KEY};
use crate::session::SessionParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, warn};

/// Durations offered in the form's drop-down, in minutes
pub const STANDARD_DURATIONS: [u32; 6] = [5, 10, 15, 20, 25, 30];

/// Accepted inhale/exhale length in seconds
pub const BREATH_RANGE: RangeInclusive<f64> = 1.0..=15.0;
/// Accepted session length in minutes
pub const DURATION_RANGE: RangeInclusive<u32> = 1..=180;

/// Check if `duration` needs the custom input rather than the drop-down
pub fn is_custom_duration(duration: u32) -> bool {
    !STANDARD_DURATIONS.contains(&duration)
}

/// Form values remembered between runs
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefs {
    pub in_sec: f64,
    pub out_sec: f64,
    /// Minutes
    pub duration: u32,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            in_sec: 4.5,
            out_sec: 4.5,
            duration: 10,
        }
    }
}

impl Prefs {
    pub fn params(&self) -> SessionParams {
        SessionParams::new(self.in_sec, self.out_sec, self.duration as f64)
    }

    /// Build prefs from stored JSON, replacing each missing or out-of-range
    /// field with its default
    fn from_json(value: &Value) -> Self {
        let defaults = Self::default();

        let breath = |key: &str, fallback: f64| {
            value
                .get(key)
                .and_then(Value::as_f64)
                .filter(|v| BREATH_RANGE.contains(v))
                .unwrap_or(fallback)
        };

        let duration = value
            .get("duration")
            .and_then(Value::as_u64)
            .and_then(|d| u32::try_from(d).ok())
            .filter(|d| DURATION_RANGE.contains(d))
            .unwrap_or(defaults.duration);

        Self {
            in_sec: breath("inSec", defaults.in_sec),
            out_sec: breath("outSec", defaults.out_sec),
            duration,
        }
    }
}

/// Preferences on top of a [`KeyValueStore`]
#[derive(Clone)]
pub struct PrefsStore {
    store: Arc<dyn KeyValueStore>,
}

impl PrefsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load saved prefs, falling back to defaults on any problem
    pub fn load(&self) -> Prefs {
        let raw = match self.store.get(PREFS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Prefs::default(),
            Err(e) => {
                warn!("Failed to read preferences: {}", e);
                return Prefs::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Prefs::from_json(&value),
            Err(e) => {
                warn!("Preferences are corrupt, using defaults: {}", e);
                Prefs::default()
            }
        }
    }

    pub fn save(&self, prefs: &Prefs) {
        let json = match serde_json::to_string(prefs) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize preferences: {}", e);
                return;
            }
        };

        match self.store.set(PREFS_KEY, &json) {
            Ok(()) => debug!("Saved preferences: {:?}", prefs),
            Err(e) => warn!("Failed to save preferences: {}", e),
        }
    }
}

impl std::fmt::Debug for PrefsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefsStore").finish_non_exhaustive()
    }
}
