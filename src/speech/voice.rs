//! Spoken cues through a dedicated voice worker
//!
//! The sherpa-rs engine and the rodio output stream both live on one worker
//! thread, commanded over a crossbeam channel. A new phrase always silences the
//! previous one, and each phrase reports completion through a
//! [`CompletionSignal`].

use super::tts::{TTSConfig, TTSEngine};
use super::{Announcer, CompletionSignal};
use crate::{BreatheError, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How often the worker checks whether the current phrase has finished playing
const PLAYBACK_POLL: Duration = Duration::from_millis(20);

/// Command sent to the voice worker
#[derive(Debug)]
pub enum VoiceCommand {
    /// Speak a phrase, replacing whatever is playing
    Speak {
        id: Uuid,
        text: String,
        done: oneshot::Sender<()>,
    },

    /// Silence the current phrase
    Cancel,

    /// Shutdown the worker
    Shutdown,
}

/// [`Announcer`] backed by a VITS voice
pub struct VoiceAnnouncer {
    command_tx: Sender<VoiceCommand>,
    available: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl VoiceAnnouncer {
    /// Start the voice worker thread.
    ///
    /// Model loading happens on the worker; if it fails (or there is no output
    /// device) the announcer reports itself unavailable and stops speaking.
    pub fn spawn(config: TTSConfig) -> Self {
        let (command_tx, command_rx) = bounded(config.queue_size.max(1));
        let available = Arc::new(AtomicBool::new(true));

        let worker_available = Arc::clone(&available);
        let worker = thread::Builder::new()
            .name("voice".into())
            .spawn(move || run_worker(config, command_rx, worker_available));

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to start voice worker: {}", e);
                available.store(false, Ordering::SeqCst);
                None
            }
        };

        Self {
            command_tx,
            available,
            worker: Mutex::new(worker),
        }
    }

    /// Check if phrases are actually being spoken
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn send(&self, cmd: VoiceCommand) -> Result<()> {
        self.command_tx.try_send(cmd).map_err(|e| match e {
            // Costs one cue
            TrySendError::Full(_) => BreatheError::TTSError("voice worker is backed up".into()),
            TrySendError::Disconnected(_) => {
                BreatheError::ChannelError("voice worker has stopped".into())
            }
        })
    }

    fn command_failed(&self, e: BreatheError) {
        if e.is_recoverable() {
            warn!("Dropping voice command: {}", e);
        } else {
            error!("Speech disabled: {}", e);
            self.available.store(false, Ordering::SeqCst);
        }
    }
}

impl Announcer for VoiceAnnouncer {
    fn speak(&self, text: &str) -> Option<CompletionSignal> {
        if !self.is_available() {
            return None;
        }

        let (done, signal) = CompletionSignal::channel();
        let sent = self.send(VoiceCommand::Speak {
            id: Uuid::new_v4(),
            text: text.to_string(),
            done,
        });

        match sent {
            Ok(()) => Some(signal),
            Err(e) => {
                self.command_failed(e);
                None
            }
        }
    }

    fn cancel(&self) {
        if !self.is_available() {
            return;
        }
        if let Err(e) = self.send(VoiceCommand::Cancel) {
            self.command_failed(e);
        }
    }
}

impl Drop for VoiceAnnouncer {
    fn drop(&mut self) {
        let _ = self.command_tx.send(VoiceCommand::Shutdown);
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

/// The phrase currently playing
struct Playing {
    id: Uuid,
    done: oneshot::Sender<()>,
}

impl Playing {
    fn finish(self) {
        debug!("Utterance {} finished", self.id);
        let _ = self.done.send(());
    }
}

fn run_worker(config: TTSConfig, command_rx: Receiver<VoiceCommand>, available: Arc<AtomicBool>) {
    info!("Voice worker starting");

    let mut engine = match TTSEngine::new(config.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            warn!("Speech unavailable: {}", e);
            available.store(false, Ordering::SeqCst);
            drain_unavailable(command_rx);
            return;
        }
    };

    // The stream must stay alive for as long as the sink plays
    let (_stream, sink) = match open_output() {
        Ok(output) => output,
        Err(e) => {
            warn!("Speech unavailable: {}", e);
            available.store(false, Ordering::SeqCst);
            drain_unavailable(command_rx);
            return;
        }
    };
    sink.set_volume(config.volume);

    info!("Voice worker ready");

    let mut playing: Option<Playing> = None;

    loop {
        match command_rx.recv_timeout(PLAYBACK_POLL) {
            Ok(VoiceCommand::Speak { id, text, done }) => {
                sink.clear();
                if let Some(previous) = playing.take() {
                    previous.finish();
                }

                match engine.synthesize(&text) {
                    Ok((samples, sample_rate)) if !samples.is_empty() => {
                        debug!("Speaking utterance {}: {}", id, text);
                        sink.append(SamplesBuffer::new(1, sample_rate, samples));
                        sink.play();
                        playing = Some(Playing { id, done });
                    }
                    Ok(_) => {
                        let _ = done.send(());
                    }
                    Err(e) => {
                        warn!("Failed to speak \"{}\": {}", text, e);
                        let _ = done.send(());
                    }
                }
            }

            Ok(VoiceCommand::Cancel) => {
                sink.clear();
                if let Some(current) = playing.take() {
                    debug!("Utterance {} cancelled", current.id);
                    current.finish();
                }
            }

            Ok(VoiceCommand::Shutdown) => {
                info!("Voice worker shutting down");
                break;
            }

            Err(RecvTimeoutError::Timeout) => {}

            Err(RecvTimeoutError::Disconnected) => break,
        }

        if playing.is_some() && sink.empty() {
            if let Some(current) = playing.take() {
                current.finish();
            }
        }
    }

    sink.stop();
    if let Some(current) = playing.take() {
        current.finish();
    }

    info!("Voice worker stopped");
}

fn open_output() -> Result<(OutputStream, Sink)> {
    let (stream, handle) = OutputStream::try_default()
        .map_err(|e| BreatheError::AudioDeviceError(format!("no audio output: {}", e)))?;
    let sink = Sink::try_new(&handle)
        .map_err(|e| BreatheError::AudioDeviceError(format!("failed to open sink: {}", e)))?;
    Ok((stream, sink))
}

/// Keep answering commands so nobody waits on a voice that will never speak
fn drain_unavailable(command_rx: Receiver<VoiceCommand>) {
    while let Ok(cmd) = command_rx.recv() {
        match cmd {
            VoiceCommand::Speak { done, .. } => {
                let _ = done.send(());
            }
            VoiceCommand::Cancel => {}
            VoiceCommand::Shutdown => break,
        }
    }
    info!("Voice worker stopped");
}
