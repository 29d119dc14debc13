//! Application state management
//!
//! This module provides the central state for the Just Breathe UI. It holds
//! no runtime resources, so components can be rendered and tested on their own.

use super::view::SharedSessionView;
use crate::storage::prefs::{BREATH_RANGE, DURATION_RANGE};
use crate::storage::{is_custom_duration, HistoryEntry, Prefs, STANDARD_DURATIONS};

/// Top-level tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Home,
    History,
    About,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Home, Tab::History, Tab::About];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::History => "History",
            Tab::About => "About",
        }
    }
}

/// What the Home tab is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HomeScreen {
    /// The breathing form
    #[default]
    Form,
    /// A running (or just finished) session
    Session,
}

/// Selected entry of the duration drop-down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationChoice {
    Standard(u32),
    Custom,
}

impl DurationChoice {
    pub fn label(&self) -> String {
        match self {
            DurationChoice::Standard(minutes) => minutes.to_string(),
            DurationChoice::Custom => "Custom".to_string(),
        }
    }

    /// All drop-down entries in display order
    pub fn options() -> Vec<DurationChoice> {
        STANDARD_DURATIONS
            .iter()
            .map(|&m| DurationChoice::Standard(m))
            .chain(std::iter::once(DurationChoice::Custom))
            .collect()
    }
}

/// Values being edited in the breathing form
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub in_sec: f64,
    pub out_sec: f64,
    pub duration: DurationChoice,
    /// Raw text of the custom duration field
    pub custom_duration: String,
    /// Validation message shown under the form
    pub error: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::from_prefs(&Prefs::default())
    }
}

impl FormState {
    pub fn from_prefs(prefs: &Prefs) -> Self {
        let (duration, custom_duration) = if is_custom_duration(prefs.duration) {
            (DurationChoice::Custom, prefs.duration.to_string())
        } else {
            (DurationChoice::Standard(prefs.duration), String::new())
        };

        Self {
            in_sec: prefs.in_sec,
            out_sec: prefs.out_sec,
            duration,
            custom_duration,
            error: None,
        }
    }

    /// Load values from a past session
    pub fn prefill(&mut self, entry: &HistoryEntry) {
        let minutes = entry.duration.round().clamp(
            *DURATION_RANGE.start() as f64,
            *DURATION_RANGE.end() as f64,
        ) as u32;

        *self = Self::from_prefs(&Prefs {
            in_sec: entry.in_sec.clamp(*BREATH_RANGE.start(), *BREATH_RANGE.end()),
            out_sec: entry.out_sec.clamp(*BREATH_RANGE.start(), *BREATH_RANGE.end()),
            duration: minutes,
        });
    }

    /// Turn the form into prefs, or explain what is wrong
    pub fn to_prefs(&self) -> Result<Prefs, String> {
        if !BREATH_RANGE.contains(&self.in_sec) {
            return Err("Breathe in must be between 1 and 15 seconds".to_string());
        }
        if !BREATH_RANGE.contains(&self.out_sec) {
            return Err("Breathe out must be between 1 and 15 seconds".to_string());
        }

        let duration = match self.duration {
            DurationChoice::Standard(minutes) => minutes,
            DurationChoice::Custom => self
                .custom_duration
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|m| DURATION_RANGE.contains(m))
                .ok_or_else(|| "Enter a custom duration between 1 and 180 minutes".to_string())?,
        };

        let prefs = Prefs {
            in_sec: self.in_sec,
            out_sec: self.out_sec,
            duration,
        };
        prefs.params().validate()?;
        Ok(prefs)
    }
}

/// Central application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Selected tab
    pub tab: Tab,

    /// Form or session on the Home tab
    pub home: HomeScreen,

    /// Breathing form values
    pub form: FormState,

    /// History entries, newest first, as last loaded
    pub history: Vec<HistoryEntry>,

    /// Live view of the current session
    pub session_view: SharedSessionView,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from saved prefs and history
    pub fn with_saved(prefs: &Prefs, history: Vec<HistoryEntry>) -> Self {
        Self {
            form: FormState::from_prefs(prefs),
            history,
            ..Self::default()
        }
    }

    /// Go back to the form on the Home tab
    pub fn show_form(&mut self) {
        self.tab = Tab::Home;
        self.home = HomeScreen::Form;
        self.form.error = None;
    }
}
