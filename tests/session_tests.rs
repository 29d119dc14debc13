//! Session controller tests
//!
//! These drive complete sessions on a paused tokio clock with recording fakes
//! for speech, wake lock and view, so minutes of breathing run instantly and
//! deterministically.

use breathe::session::{Phase, SessionConfig, SessionController, SessionHandle, SessionParams, ViewSink};
use breathe::speech::{Announcer, CompletionSignal};
use breathe::storage::{HistoryEntry, HistoryStore, MemoryStore};
use breathe::wake_lock::{WakeLock, WakeLockHandle};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;

const BREATHING_CUES: [&str; 2] = ["Breathe in", "Breathe out"];

/// Records every phrase and when it was spoken
#[derive(Default)]
struct RecordingAnnouncer {
    spoken: Mutex<Vec<(Instant, String)>>,
    cancels: AtomicUsize,
    /// Length of each utterance; `None` behaves like an absent voice
    utterance: Option<Duration>,
}

impl RecordingAnnouncer {
    fn silent() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_utterance(length: Duration) -> Arc<Self> {
        Arc::new(Self {
            utterance: Some(length),
            ..Self::default()
        })
    }

    fn texts(&self) -> Vec<String> {
        self.spoken.lock().iter().map(|(_, text)| text.clone()).collect()
    }

    fn spoken_at(&self, text: &str) -> Option<Instant> {
        self.spoken
            .lock()
            .iter()
            .find(|(_, spoken)| spoken == text)
            .map(|(at, _)| *at)
    }

    fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl Announcer for RecordingAnnouncer {
    fn speak(&self, text: &str) -> Option<CompletionSignal> {
        self.spoken.lock().push((Instant::now(), text.to_string()));

        let length = self.utterance?;
        if length.is_zero() {
            return Some(CompletionSignal::completed());
        }

        let (done, signal) = CompletionSignal::channel();
        tokio::spawn(async move {
            tokio::time::sleep(length).await;
            let _ = done.send(());
        });
        Some(signal)
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out numbered locks and counts releases
#[derive(Default)]
struct CountingWakeLock {
    next_id: AtomicU64,
    released: Mutex<Vec<u64>>,
}

impl CountingWakeLock {
    fn acquired(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    fn released(&self) -> Vec<u64> {
        self.released.lock().clone()
    }
}

impl WakeLock for CountingWakeLock {
    fn acquire(&self) -> Option<WakeLockHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Some(WakeLockHandle::new(id))
    }

    fn release(&self, handle: WakeLockHandle) {
        self.released.lock().push(handle.id());
    }
}

/// Keeps every update the session makes
#[derive(Default)]
struct RecordingView {
    labels: Mutex<Vec<String>>,
    progress: Mutex<Vec<f32>>,
    phases: Mutex<Vec<Phase>>,
}

impl RecordingView {
    fn labels(&self) -> Vec<String> {
        self.labels.lock().clone()
    }

    fn progress(&self) -> Vec<f32> {
        self.progress.lock().clone()
    }

    fn phases(&self) -> Vec<Phase> {
        self.phases.lock().clone()
    }
}

impl ViewSink for RecordingView {
    fn show_label(&self, label: &str) {
        self.labels.lock().push(label.to_string());
    }

    fn show_progress(&self, fraction: f32) {
        self.progress.lock().push(fraction);
    }

    fn show_phase(&self, phase: Phase) {
        self.phases.lock().push(phase);
    }
}

/// Everything one test needs
struct Fixture {
    controller: SessionController,
    announcer: Arc<RecordingAnnouncer>,
    wake_lock: Arc<CountingWakeLock>,
    view: Arc<RecordingView>,
    history: HistoryStore,
    outcomes: Arc<Mutex<Vec<bool>>>,
}

impl Fixture {
    fn new(announcer: Arc<RecordingAnnouncer>) -> Self {
        let wake_lock = Arc::new(CountingWakeLock::default());
        let history = HistoryStore::new(Arc::new(MemoryStore::new()));

        let controller = SessionController::new(
            Handle::current(),
            announcer.clone(),
            wake_lock.clone(),
            history.clone(),
        );

        Self {
            controller,
            announcer,
            wake_lock,
            view: Arc::new(RecordingView::default()),
            history,
            outcomes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn silent() -> Self {
        Self::new(RecordingAnnouncer::silent())
    }

    fn start(&self, params: SessionParams) -> SessionHandle {
        let outcomes = Arc::clone(&self.outcomes);
        self.controller
            .start(params, self.view.clone(), move |completed| {
                outcomes.lock().push(completed)
            })
    }

    fn outcomes(&self) -> Vec<bool> {
        self.outcomes.lock().clone()
    }

    fn entries(&self) -> Vec<HistoryEntry> {
        self.history.list()
    }

    fn breathing_cues(&self) -> Vec<String> {
        self.announcer
            .texts()
            .into_iter()
            .filter(|text| BREATHING_CUES.contains(&text.as_str()))
            .collect()
    }
}

/// One second of breathing
fn one_second(in_sec: f64, out_sec: f64) -> SessionParams {
    SessionParams::new(in_sec, out_sec, 1.0 / 60.0)
}

/// Countdown length with the default timing and no voice
const COUNTDOWN: Duration = Duration::from_millis(1800 + 1000 + 1000);

/// Timer deadlines round to whole milliseconds
fn assert_about(actual: Duration, expected: Duration) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= Duration::from_millis(5),
        "expected about {:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn test_short_session_speaks_every_cue_in_order() {
    let fixture = Fixture::silent();
    let params = one_second(3.0, 4.0);

    fixture.start(params).wait().await;

    assert_eq!(
        fixture.announcer.texts(),
        vec!["Starting in 3", "2", "1", "Breathe in", "Breathe out", "All done"]
    );
    assert_eq!(fixture.outcomes(), vec![true]);

    let entries = fixture.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].params(), params);
}

#[tokio::test(start_paused = true)]
async fn test_labels_match_cues() {
    let fixture = Fixture::silent();

    fixture.start(one_second(3.0, 4.0)).wait().await;

    assert_eq!(
        fixture.view.labels(),
        vec![
            "Starting in 3...",
            "2...",
            "1...",
            "Breathe in",
            "Breathe out",
            "All done!"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_phase_sequence_of_completed_session() {
    let fixture = Fixture::silent();

    let handle = fixture.start(one_second(3.0, 4.0));
    let phase_at_start = handle.phase();
    handle.wait().await;

    assert!(matches!(phase_at_start, Phase::Idle | Phase::CountingDown));
    assert_eq!(
        fixture.view.phases(),
        vec![
            Phase::CountingDown,
            Phase::Inhaling,
            Phase::Exhaling,
            Phase::Finishing,
            Phase::Done
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_final_inhale_is_followed_by_exhale() {
    let fixture = Fixture::silent();

    fixture.start(one_second(3.0, 4.0)).wait().await;

    // The session ran out mid-inhale, so the out-breath was forced
    let texts = fixture.announcer.texts();
    let exhale = texts.iter().position(|t| t == "Breathe out");
    let done = texts.iter().position(|t| t == "All done");
    assert!(exhale.is_some());
    assert!(exhale < done);
}

#[tokio::test(start_paused = true)]
async fn test_finishing_waits_one_exhale() {
    let fixture = Fixture::silent();
    let started = Instant::now();

    fixture.start(one_second(3.0, 4.0)).wait().await;

    let exhale = fixture.announcer.spoken_at("Breathe out").unwrap();
    let done = fixture.announcer.spoken_at("All done").unwrap();
    assert_about(done - exhale, Duration::from_secs(4));
    assert!(exhale - started >= COUNTDOWN + Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_ending_on_exhale_finishes_without_extra_cue() {
    let fixture = Fixture::silent();

    // Two seconds: one inhale and one exhale, ending right on the exhale
    fixture
        .start(SessionParams::new(1.0, 1.0, 2.0 / 60.0))
        .wait()
        .await;

    assert_eq!(fixture.breathing_cues(), vec!["Breathe in", "Breathe out"]);
    assert_eq!(fixture.outcomes(), vec![true]);
}

#[tokio::test(start_paused = true)]
async fn test_breathing_cues_alternate() {
    let fixture = Fixture::silent();

    fixture
        .start(SessionParams::new(1.0, 1.0, 5.0 / 60.0))
        .wait()
        .await;

    let cues = fixture.breathing_cues();
    assert!(cues.len() >= 4, "expected several breaths, got {:?}", cues);
    assert_eq!(cues.first().map(String::as_str), Some("Breathe in"));
    assert_eq!(cues.last().map(String::as_str), Some("Breathe out"));
    for pair in cues.windows(2) {
        assert_ne!(pair[0], pair[1], "cues must alternate: {:?}", cues);
    }
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_monotonic_and_ends_at_one() {
    let fixture = Fixture::silent();

    fixture
        .start(SessionParams::new(1.0, 2.0, 3.0 / 60.0))
        .wait()
        .await;

    let progress = fixture.view.progress();
    assert!(!progress.is_empty());
    for pair in progress.windows(2) {
        assert!(pair[0] <= pair[1], "progress went backwards: {:?}", pair);
    }
    assert!(progress.iter().all(|p| (0.0..=1.0).contains(p)));
    assert_eq!(progress.last(), Some(&1.0));
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_countdown_records_nothing() {
    let fixture = Fixture::silent();

    let handle = fixture.start(SessionParams::new(4.5, 4.5, 10.0));

    // Between "2" and "1"
    tokio::time::sleep(Duration::from_millis(2000)).await;
    handle.stop();
    handle.wait().await;

    assert_eq!(fixture.announcer.texts(), vec!["Starting in 3", "2"]);
    assert_eq!(fixture.outcomes(), vec![false]);
    assert!(fixture.entries().is_empty());
    assert_eq!(fixture.announcer.cancels(), 1);
    assert_eq!(fixture.view.phases().last(), Some(&Phase::Aborted));
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_breathing_records_requested_params() {
    let fixture = Fixture::silent();
    let params = SessionParams::new(3.0, 4.0, 1.0);

    let handle = fixture.start(params);

    tokio::time::sleep(COUNTDOWN + Duration::from_millis(2500)).await;
    assert!(handle.phase().is_breathing());
    handle.stop();
    handle.wait().await;

    assert_eq!(fixture.outcomes(), vec![false]);
    assert!(!fixture.announcer.texts().contains(&"All done".to_string()));

    let entries = fixture.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].in_sec, 3.0);
    assert_eq!(entries[0].out_sec, 4.0);
    assert_eq!(entries[0].duration, 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_finishing_counts_as_cancelled() {
    let fixture = Fixture::silent();

    let handle = fixture.start(one_second(3.0, 4.0));

    // Breathing is over, the final exhale grace period is running
    tokio::time::sleep(COUNTDOWN + Duration::from_secs(2)).await;
    assert_eq!(handle.phase(), Phase::Finishing);
    handle.stop();
    handle.wait().await;

    assert_eq!(fixture.outcomes(), vec![false]);
    assert_eq!(fixture.entries().len(), 1);
    assert_eq!(fixture.view.phases().last(), Some(&Phase::Aborted));
}

#[tokio::test(start_paused = true)]
async fn test_no_speech_after_stop() {
    let fixture = Fixture::silent();

    let handle = fixture.start(SessionParams::new(2.0, 2.0, 1.0));

    tokio::time::sleep(COUNTDOWN + Duration::from_millis(500)).await;
    handle.stop();
    let spoken_before = fixture.announcer.texts().len();

    handle.wait().await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(fixture.announcer.texts().len(), spoken_before);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let fixture = Fixture::silent();

    let handle = fixture.start(SessionParams::new(2.0, 2.0, 1.0));

    tokio::time::sleep(COUNTDOWN + Duration::from_secs(1)).await;
    handle.stop();
    handle.stop();
    handle.stop();
    handle.wait().await;

    assert_eq!(fixture.outcomes(), vec![false]);
    assert_eq!(fixture.entries().len(), 1);
    assert_eq!(fixture.wake_lock.released(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_after_completion_is_a_no_op() {
    let fixture = Fixture::silent();

    let handle = fixture.start(one_second(1.0, 1.0));
    while !handle.is_finished() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    handle.stop();

    assert_eq!(handle.phase(), Phase::Done);
    assert_eq!(fixture.outcomes(), vec![true]);
    assert_eq!(fixture.announcer.cancels(), 0);
    assert_eq!(fixture.entries().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wake_lock_held_for_whole_session() {
    let fixture = Fixture::silent();

    let handle = fixture.start(one_second(3.0, 4.0));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fixture.wake_lock.acquired(), 1);
    assert!(fixture.wake_lock.released().is_empty());

    handle.wait().await;
    assert_eq!(fixture.wake_lock.acquired(), 1);
    assert_eq!(fixture.wake_lock.released(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_wake_lock_released_on_cancel() {
    let fixture = Fixture::silent();

    let handle = fixture.start(SessionParams::new(4.5, 4.5, 10.0));
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.stop();
    handle.wait().await;

    assert_eq!(fixture.wake_lock.released(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_waits_for_utterances() {
    let utterance = Duration::from_millis(700);
    let fixture = Fixture::new(RecordingAnnouncer::with_utterance(utterance));
    let started = Instant::now();

    fixture.start(one_second(3.0, 4.0)).wait().await;

    let two = fixture.announcer.spoken_at("2").unwrap();
    let one = fixture.announcer.spoken_at("1").unwrap();
    let inhale = fixture.announcer.spoken_at("Breathe in").unwrap();

    assert_about(two - started, utterance + Duration::from_millis(1800));
    assert_about(one - two, utterance + Duration::from_millis(1000));
    assert_about(inhale - one, utterance + Duration::from_millis(1000));
    assert_eq!(fixture.outcomes(), vec![true]);
}

#[tokio::test(start_paused = true)]
async fn test_completed_signal_behaves_like_fixed_delay() {
    let fixture = Fixture::new(RecordingAnnouncer::with_utterance(Duration::ZERO));
    let started = Instant::now();

    fixture.start(one_second(3.0, 4.0)).wait().await;

    let inhale = fixture.announcer.spoken_at("Breathe in").unwrap();
    assert_about(inhale - started, COUNTDOWN);
    assert_eq!(
        fixture.announcer.texts(),
        vec!["Starting in 3", "2", "1", "Breathe in", "Breathe out", "All done"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_interrupts_pending_utterance() {
    let fixture = Fixture::new(RecordingAnnouncer::with_utterance(Duration::from_secs(30)));

    let handle = fixture.start(SessionParams::new(4.5, 4.5, 10.0));
    tokio::time::sleep(Duration::from_secs(1)).await;

    let stopped_at = Instant::now();
    handle.stop();
    handle.wait().await;

    assert!(Instant::now() - stopped_at < Duration::from_millis(100));
    assert_eq!(fixture.announcer.texts(), vec!["Starting in 3"]);
    assert_eq!(fixture.outcomes(), vec![false]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_countdown_timing() {
    let fixture = Fixture::silent();
    let controller = fixture.controller.clone().with_config(
        SessionConfig::new()
            .with_countdown_start_pause_ms(300)
            .with_countdown_step_pause_ms(200),
    );
    let started = Instant::now();

    controller
        .start(one_second(1.0, 1.0), fixture.view.clone(), |_| {})
        .wait()
        .await;

    let inhale = fixture.announcer.spoken_at("Breathe in").unwrap();
    assert_about(inhale - started, Duration::from_millis(700));
}

#[tokio::test(start_paused = true)]
async fn test_history_keeps_newest_first() {
    let fixture = Fixture::silent();

    for minutes in [1.0, 2.0, 3.0] {
        let params = SessionParams::new(1.0, 1.0, minutes / 60.0);
        fixture.start(params).wait().await;
    }

    let durations: Vec<f64> = fixture.entries().iter().map(|e| e.duration * 60.0).collect();
    assert_eq!(durations.len(), 3);
    assert!((durations[0] - 3.0).abs() < 1e-9);
    assert!((durations[2] - 1.0).abs() < 1e-9);
    assert_eq!(fixture.outcomes(), vec![true, true, true]);
}

#[tokio::test(start_paused = true)]
async fn test_independent_controllers_run_side_by_side() {
    let first = Fixture::silent();
    let second = Fixture::silent();

    let a = first.start(one_second(1.0, 1.0));
    let b = second.start(SessionParams::new(4.5, 4.5, 10.0));

    tokio::time::sleep(Duration::from_secs(2)).await;
    b.stop();

    a.wait().await;
    b.wait().await;

    assert_eq!(first.outcomes(), vec![true]);
    assert_eq!(second.outcomes(), vec![false]);
    assert_eq!(first.entries().len(), 1);
    assert!(second.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_history_and_wake_lock_settled_before_on_done() {
    let fixture = Fixture::silent();
    let seen = Arc::new(Mutex::new(None));

    let history = fixture.history.clone();
    let wake_lock = Arc::clone(&fixture.wake_lock);
    let observed = Arc::clone(&seen);
    let handle = fixture
        .controller
        .start(one_second(1.0, 1.0), fixture.view.clone(), move |completed| {
            *observed.lock() = Some((completed, history.list().len(), wake_lock.released()));
        });
    handle.wait().await;

    assert_eq!(*seen.lock(), Some((true, 1, vec![1])));
}
