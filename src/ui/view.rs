//! Session state as seen by the UI

use crate::session::{Phase, ViewSink};
use parking_lot::RwLock;
use std::sync::Arc;

/// What the session panel renders
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionView {
    pub label: String,
    pub progress: f32,
    pub phase: Phase,
    /// `Some(completed)` once the session has ended
    pub outcome: Option<bool>,
}

/// [`ViewSink`] shared between the session task and the UI thread.
///
/// Every update asks egui for a repaint so cues show up without waiting for
/// input events.
#[derive(Clone, Default)]
pub struct SharedSessionView {
    inner: Arc<RwLock<SessionView>>,
    ctx: Arc<RwLock<Option<egui::Context>>>,
}

impl SharedSessionView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repaint `ctx` whenever the session changes
    pub fn attach(&self, ctx: egui::Context) {
        *self.ctx.write() = Some(ctx);
    }

    /// Start blank for a new session.
    ///
    /// Clones taken earlier keep the old state, so a session that is still
    /// winding down cannot write into its successor.
    pub fn reset(&mut self) {
        self.inner = Arc::new(RwLock::new(SessionView::default()));
        self.repaint();
    }

    /// Record how the session ended
    pub fn finish(&self, completed: bool) {
        self.inner.write().outcome = Some(completed);
        self.repaint();
    }

    pub fn snapshot(&self) -> SessionView {
        self.inner.read().clone()
    }

    fn repaint(&self) {
        if let Some(ctx) = self.ctx.read().as_ref() {
            ctx.request_repaint();
        }
    }
}

impl ViewSink for SharedSessionView {
    fn show_label(&self, label: &str) {
        self.inner.write().label = label.to_string();
        self.repaint();
    }

    fn show_progress(&self, fraction: f32) {
        self.inner.write().progress = fraction.clamp(0.0, 1.0);
        self.repaint();
    }

    fn show_phase(&self, phase: Phase) {
        self.inner.write().phase = phase;
        self.repaint();
    }
}

impl std::fmt::Debug for SharedSessionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSessionView")
            .field("view", &*self.inner.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_are_visible_to_clones() {
        let view = SharedSessionView::new();
        let sink = view.clone();

        sink.show_label("Breathe in");
        sink.show_phase(Phase::Inhaling);
        sink.show_progress(0.25);

        let snapshot = view.snapshot();
        assert_eq!(snapshot.label, "Breathe in");
        assert_eq!(snapshot.phase, Phase::Inhaling);
        assert_eq!(snapshot.progress, 0.25);
        assert_eq!(snapshot.outcome, None);
    }

    #[test]
    fn test_finish_and_reset() {
        let view = SharedSessionView::new();
        view.show_progress(2.0);
        assert_eq!(view.snapshot().progress, 1.0);

        view.finish(true);
        assert_eq!(view.snapshot().outcome, Some(true));

        let mut view = view;
        view.reset();
        assert_eq!(view.snapshot(), SessionView::default());
    }

    #[test]
    fn test_reset_detaches_earlier_clones() {
        let mut view = SharedSessionView::new();
        let previous = view.clone();

        view.reset();
        previous.show_label("Breathe out");
        previous.finish(false);

        assert_eq!(view.snapshot(), SessionView::default());
        assert_eq!(previous.snapshot().outcome, Some(false));
    }
}
