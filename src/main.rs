//! Just Breathe - guided breathing with spoken cues
//!
//! Main entry point: loads the config, wires the session controller to its
//! collaborators and opens the window.

use anyhow::Result;
use breathe::config::AppConfig;
use breathe::session::{SessionConfig, SessionController};
use breathe::speech::{Announcer, SilentAnnouncer, VoiceAnnouncer};
use breathe::storage::{HistoryStore, JsonFileStore, KeyValueStore, MemoryStore, PrefsStore};
use breathe::wake_lock::{InhibitWakeLock, NoWakeLock, WakeLock};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breathe=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Just Breathe");

    let mut config = AppConfig::load();
    if let Err(e) = config.validate() {
        warn!("{} ({})", e.user_message(), e);
        config = config.without_speech();
        if config.validate().is_err() {
            config = config.with_session(SessionConfig::default());
        }
    }

    // Sessions run as tasks on this runtime; the UI owns the main thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("session")
        .enable_time()
        .build()?;

    let store = open_store(&config);

    let announcer: Arc<dyn Announcer> = if config.speech_enabled() {
        Arc::new(VoiceAnnouncer::spawn(config.speech.clone()))
    } else {
        info!("Spoken cues disabled, showing text only");
        Arc::new(SilentAnnouncer)
    };

    let wake_lock: Arc<dyn WakeLock> = if config.enable_wake_lock {
        Arc::new(InhibitWakeLock::new())
    } else {
        Arc::new(NoWakeLock)
    };

    let controller = SessionController::new(
        runtime.handle().clone(),
        announcer,
        wake_lock,
        HistoryStore::new(Arc::clone(&store)),
    )
    .with_config(config.session.clone());

    breathe::ui::run(controller, PrefsStore::new(store))
        .map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    runtime.shutdown_timeout(std::time::Duration::from_secs(1));
    Ok(())
}

/// Storage on disk, or in memory if no data directory is available
fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let store = match &config.data_dir {
        Some(dir) => Ok(JsonFileStore::in_dir(dir)),
        None => JsonFileStore::default_location(),
    };

    match store {
        Ok(store) => {
            info!("Storing history in {}", store.path().display());
            Arc::new(store)
        }
        Err(e) => {
            warn!("{}; history will not be kept", e);
            Arc::new(MemoryStore::new())
        }
    }
}
