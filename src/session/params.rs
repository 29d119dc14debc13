//! Session parameters, phases and cues

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Breathing pace and target length of one session
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Seconds per inhale
    pub in_sec: f64,
    /// Seconds per exhale
    pub out_sec: f64,
    /// Target session length in minutes
    pub duration_min: f64,
}

impl SessionParams {
    pub fn new(in_sec: f64, out_sec: f64, duration_min: f64) -> Self {
        Self {
            in_sec,
            out_sec,
            duration_min,
        }
    }

    /// Total breathing time, excluding the countdown and the final grace exhale
    pub fn total(&self) -> Duration {
        Duration::from_secs_f64(self.duration_min * 60.0)
    }

    pub fn inhale(&self) -> Duration {
        Duration::from_secs_f64(self.in_sec)
    }

    pub fn exhale(&self) -> Duration {
        Duration::from_secs_f64(self.out_sec)
    }

    /// Reject values the controller cannot run with.
    ///
    /// The controller itself trusts its caller; the form calls this before starting.
    pub fn validate(&self) -> Result<(), String> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.in_sec) {
            return Err(format!("Inhale length must be positive, got {}", self.in_sec));
        }
        if !positive(self.out_sec) {
            return Err(format!("Exhale length must be positive, got {}", self.out_sec));
        }
        if !positive(self.duration_min) {
            return Err(format!(
                "Session duration must be positive, got {}",
                self.duration_min
            ));
        }
        Ok(())
    }
}

/// Where a session currently is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    CountingDown,
    Inhaling,
    Exhaling,
    /// Breathing time is over, waiting for the last exhale to complete
    Finishing,
    Done,
    Aborted,
}

impl Phase {
    /// Check if the session has ended, either way
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Aborted)
    }

    /// Check if the inhale/exhale cycle is running
    pub fn is_breathing(&self) -> bool {
        matches!(self, Phase::Inhaling | Phase::Exhaling)
    }

    /// Check if a session is in progress
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::Idle) && !self.is_terminal()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::CountingDown => write!(f, "Counting down"),
            Phase::Inhaling => write!(f, "Inhaling"),
            Phase::Exhaling => write!(f, "Exhaling"),
            Phase::Finishing => write!(f, "Finishing"),
            Phase::Done => write!(f, "Done"),
            Phase::Aborted => write!(f, "Aborted"),
        }
    }
}

/// A spoken phrase together with the label shown while it plays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cue {
    pub spoken: &'static str,
    pub label: &'static str,
}

impl Cue {
    pub const STARTING: Cue = Cue {
        spoken: "Starting in 3",
        label: "Starting in 3...",
    };
    pub const TWO: Cue = Cue {
        spoken: "2",
        label: "2...",
    };
    pub const ONE: Cue = Cue {
        spoken: "1",
        label: "1...",
    };
    pub const BREATHE_IN: Cue = Cue {
        spoken: "Breathe in",
        label: "Breathe in",
    };
    pub const BREATHE_OUT: Cue = Cue {
        spoken: "Breathe out",
        label: "Breathe out",
    };
    pub const ALL_DONE: Cue = Cue {
        spoken: "All done",
        label: "All done!",
    };

    /// Cue announcing the given breathing phase
    pub fn for_phase(phase: Phase) -> Option<Cue> {
        match phase {
            Phase::Inhaling => Some(Cue::BREATHE_IN),
            Phase::Exhaling => Some(Cue::BREATHE_OUT),
            Phase::Done => Some(Cue::ALL_DONE),
            _ => None,
        }
    }
}
