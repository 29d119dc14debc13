//! Where the controller reports what the user should see

use super::params::Phase;

/// Receives the visible state of a running session.
///
/// Called from the session task, so implementations must be thread-safe.
pub trait ViewSink: Send + Sync {
    /// Show the label for the current cue ("Breathe in", "2...", ...)
    fn show_label(&self, label: &str);

    /// Show overall progress as a fraction in `[0, 1]`
    fn show_progress(&self, fraction: f32);

    /// Phase changed
    fn show_phase(&self, _phase: Phase) {}
}
