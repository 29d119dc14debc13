//! Session controller
//!
//! Runs one breathing session as a single tokio task:
//!
//! ```text
//! Idle -> CountingDown -> Inhaling <-> Exhaling -> Finishing -> Done
//!              \______________\____________\___________\_____-> Aborted
//! ```
//!
//! The task owns all session state. The only thing shared with the caller is
//! a cancellation token and a read-only view of the current phase, both held
//! by the returned [`SessionHandle`]. Every await point races the token, and
//! every continuation checks it before doing more work, so `stop()` takes
//! effect at the next scheduling boundary without preempting anything.

use super::params::{Cue, Phase, SessionParams};
use super::view::ViewSink;
use crate::speech::Announcer;
use crate::storage::HistoryStore;
use crate::wake_lock::{WakeLock, WakeLockHandle};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Timing knobs for the countdown and the breathing loop
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pause after "Starting in 3"
    pub countdown_start_pause_ms: u64,

    /// Pause after "2" and after "1"
    pub countdown_step_pause_ms: u64,

    /// How often the breathing loop re-reads the clock (~60 Hz by default)
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_start_pause_ms: 1800,
            countdown_step_pause_ms: 1000,
            tick_interval_ms: 16,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pause after the first countdown cue
    pub fn with_countdown_start_pause_ms(mut self, ms: u64) -> Self {
        self.countdown_start_pause_ms = ms;
        self
    }

    /// Set the pause after each countdown number
    pub fn with_countdown_step_pause_ms(mut self, ms: u64) -> Self {
        self.countdown_step_pause_ms = ms;
        self
    }

    /// Set the breathing loop tick interval
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Countdown cues and the pause that follows each
    fn countdown(&self) -> [(Cue, Duration); 3] {
        let step = Duration::from_millis(self.countdown_step_pause_ms);
        [
            (Cue::STARTING, Duration::from_millis(self.countdown_start_pause_ms)),
            (Cue::TWO, step),
            (Cue::ONE, step),
        ]
    }

    fn tick_interval(&self) -> Duration {
        // tokio rejects a zero period
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Starts breathing sessions against a fixed set of collaborators
#[derive(Clone)]
pub struct SessionController {
    config: SessionConfig,
    runtime: Handle,
    announcer: Arc<dyn Announcer>,
    wake_lock: Arc<dyn WakeLock>,
    history: HistoryStore,
}

impl SessionController {
    /// Create a controller that spawns sessions on `runtime`
    pub fn new(
        runtime: Handle,
        announcer: Arc<dyn Announcer>,
        wake_lock: Arc<dyn WakeLock>,
        history: HistoryStore,
    ) -> Self {
        Self {
            config: SessionConfig::default(),
            runtime,
            announcer,
            wake_lock,
            history,
        }
    }

    /// Set the timing configuration
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Start a session and return immediately.
    ///
    /// `on_done` runs exactly once on the session task with `true` for a
    /// natural finish and `false` after [`SessionHandle::stop`].
    pub fn start<F>(&self, params: SessionParams, view: Arc<dyn ViewSink>, on_done: F) -> SessionHandle
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let phase = Arc::new(RwLock::new(Phase::Idle));

        let run = SessionRun {
            id,
            params,
            config: self.config.clone(),
            announcer: Arc::clone(&self.announcer),
            wake_lock: Arc::clone(&self.wake_lock),
            history: self.history.clone(),
            view,
            cancel: cancel.clone(),
            shared_phase: Arc::clone(&phase),
            state: SessionState::default(),
        };

        info!(
            "Starting session {}: in {}s, out {}s, {} min",
            id, params.in_sec, params.out_sec, params.duration_min
        );

        let task = self.runtime.spawn(run.execute(on_done));

        SessionHandle {
            id,
            cancel,
            phase,
            task,
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Caller's side of a running session
#[derive(Debug)]
pub struct SessionHandle {
    id: Uuid,
    cancel: CancellationToken,
    phase: Arc<RwLock<Phase>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Request cancellation. Safe to call any number of times.
    pub fn stop(&self) {
        if self.phase().is_terminal() || self.cancel.is_cancelled() {
            return;
        }
        info!("Stop requested for session {}", self.id);
        self.cancel.cancel();
    }

    /// Current phase as last published by the session task
    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    /// Check if the session task has run to completion
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session task to end
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// The session was cancelled while waiting
#[derive(Debug)]
struct Cancelled;

type Step<T = ()> = std::result::Result<T, Cancelled>;

/// Mutable state owned by the session task
#[derive(Debug, Default)]
struct SessionState {
    phase: Phase,
    /// Set once the countdown completes; decides whether history is written
    breathing_started: bool,
    session_start: Option<Instant>,
    phase_start: Option<Instant>,
    progress: f32,
    wake_lock: Option<WakeLockHandle>,
}

struct SessionRun {
    id: Uuid,
    params: SessionParams,
    config: SessionConfig,
    announcer: Arc<dyn Announcer>,
    wake_lock: Arc<dyn WakeLock>,
    history: HistoryStore,
    view: Arc<dyn ViewSink>,
    cancel: CancellationToken,
    shared_phase: Arc<RwLock<Phase>>,
    state: SessionState,
}

impl SessionRun {
    async fn execute<F>(mut self, on_done: F)
    where
        F: FnOnce(bool),
    {
        self.state.wake_lock = self.wake_lock.acquire();

        let completed = match self.drive().await {
            Ok(()) => {
                self.complete();
                true
            }
            Err(Cancelled) => {
                self.abort();
                false
            }
        };

        if self.state.breathing_started {
            self.record_history().await;
        }
        self.release_wake_lock().await;
        on_done(completed);
    }

    async fn drive(&mut self) -> Step {
        self.count_down().await?;
        self.begin_breathing();
        self.breathe().await?;

        self.set_phase(Phase::Finishing);
        // Grace period so the final exhale is not cut short
        let grace = self.params.exhale();
        self.wait(grace).await?;
        self.check_cancelled()
    }

    async fn count_down(&mut self) -> Step {
        self.set_phase(Phase::CountingDown);

        for (cue, pause) in self.config.countdown() {
            self.check_cancelled()?;
            if let Some(signal) = self.announce(cue) {
                self.until(signal.finished()).await?;
            }
            self.wait(pause).await?;
        }

        self.check_cancelled()
    }

    fn begin_breathing(&mut self) {
        let now = Instant::now();
        self.state.breathing_started = true;
        self.state.session_start = Some(now);
        self.enter_phase(Phase::Inhaling, now);
    }

    async fn breathe(&mut self) -> Step {
        let total = self.params.total();
        let session_start = self.state.session_start.unwrap_or_else(Instant::now);

        let mut ticker = tokio::time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            self.until(ticker.tick()).await?;
            self.check_cancelled()?;

            let now = Instant::now();
            let elapsed = now.duration_since(session_start);
            self.report_progress(fraction(elapsed, total));

            if elapsed >= total {
                if self.state.phase == Phase::Inhaling {
                    // Never end mid-inhale; give the user one last exhale
                    self.enter_phase(Phase::Exhaling, now);
                }
                return Ok(());
            }

            let phase_len = match self.state.phase {
                Phase::Inhaling => self.params.inhale(),
                _ => self.params.exhale(),
            };
            let phase_start = self.state.phase_start.unwrap_or(now);

            if now.duration_since(phase_start) >= phase_len {
                let next = match self.state.phase {
                    Phase::Inhaling => Phase::Exhaling,
                    _ => Phase::Inhaling,
                };
                self.enter_phase(next, now);
            }
        }
    }

    fn complete(&mut self) {
        self.set_phase(Phase::Done);
        self.announce(Cue::ALL_DONE);
        self.state.progress = 1.0;
        self.view.show_progress(1.0);
        info!("Session {} completed", self.id);
    }

    fn abort(&mut self) {
        self.set_phase(Phase::Aborted);
        self.announcer.cancel();

        if self.state.breathing_started {
            info!("Session {} stopped early, recording it in history", self.id);
        } else {
            info!("Session {} stopped during countdown, nothing recorded", self.id);
        }
    }

    /// Save the session off the async workers; the store may fsync
    async fn record_history(&self) {
        let history = self.history.clone();
        let params = self.params;
        if let Err(e) = tokio::task::spawn_blocking(move || history.record(&params)).await {
            warn!("Session {}: saving history failed: {}", self.id, e);
        }
    }

    /// Release may wait on a child process, so it runs on the blocking pool
    async fn release_wake_lock(&mut self) {
        let Some(handle) = self.state.wake_lock.take() else {
            return;
        };
        let wake_lock = Arc::clone(&self.wake_lock);
        if let Err(e) = tokio::task::spawn_blocking(move || wake_lock.release(handle)).await {
            warn!("Session {}: releasing the wake lock failed: {}", self.id, e);
        }
    }

    /// Switch to a breathing phase and cue it
    fn enter_phase(&mut self, phase: Phase, now: Instant) {
        self.set_phase(phase);
        self.state.phase_start = Some(now);
        if let Some(cue) = Cue::for_phase(phase) {
            // Breathing cues follow the clock, not the voice
            let _ = self.announce(cue);
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!("Session {}: {} -> {}", self.id, self.state.phase, phase);
        self.state.phase = phase;
        *self.shared_phase.write() = phase;
        self.view.show_phase(phase);
    }

    /// Show the label and start speaking it in the same step
    fn announce(&self, cue: Cue) -> Option<crate::speech::CompletionSignal> {
        debug!("Session {} cue: {}", self.id, cue.spoken);
        self.view.show_label(cue.label);
        self.announcer.speak(cue.spoken)
    }

    fn report_progress(&mut self, fraction: f32) {
        let fraction = fraction.clamp(0.0, 1.0).max(self.state.progress);
        self.state.progress = fraction;
        self.view.show_progress(fraction);
    }

    fn check_cancelled(&self) -> Step {
        if self.cancel.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Await `fut` unless the session is cancelled first
    async fn until<F: Future>(&self, fut: F) -> Step<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Cancelled),
            out = fut => Ok(out),
        }
    }

    async fn wait(&self, duration: Duration) -> Step {
        self.until(tokio::time::sleep(duration)).await
    }
}

fn fraction(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.countdown_start_pause_ms, 1800);
        assert_eq!(config.countdown_step_pause_ms, 1000);
        assert_eq!(config.tick_interval_ms, 16);
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::new()
            .with_countdown_start_pause_ms(1000)
            .with_countdown_step_pause_ms(500)
            .with_tick_interval_ms(0);

        let steps = config.countdown();
        assert_eq!(steps[0], (Cue::STARTING, Duration::from_millis(1000)));
        assert_eq!(steps[1], (Cue::TWO, Duration::from_millis(500)));
        assert_eq!(steps[2], (Cue::ONE, Duration::from_millis(500)));
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_fraction() {
        let total = Duration::from_secs(10);
        assert_eq!(fraction(Duration::ZERO, total), 0.0);
        assert!((fraction(Duration::from_secs(5), total) - 0.5).abs() < f32::EPSILON);
        assert_eq!(fraction(Duration::from_secs(20), total), 1.0);
        assert_eq!(fraction(Duration::from_secs(1), Duration::ZERO), 1.0);
    }
}
