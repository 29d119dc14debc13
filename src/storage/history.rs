//! Capped, newest-first log of past sessions

use super::{KeyValueStore, HISTORY_KEY};
use crate::session::SessionParams;
use crate::Result;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Number of sessions kept; older ones are dropped
pub const HISTORY_LIMIT: usize = 10;

/// One recorded session.
///
/// Records the requested pace and duration, not how long the user actually
/// kept going.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Epoch milliseconds at save time
    pub timestamp: i64,
    pub in_sec: f64,
    pub out_sec: f64,
    /// Minutes
    pub duration: f64,
}

impl HistoryEntry {
    pub fn new(timestamp: i64, params: &SessionParams) -> Self {
        Self {
            timestamp,
            in_sec: params.in_sec,
            out_sec: params.out_sec,
            duration: params.duration_min,
        }
    }

    /// Entry stamped with the current time
    pub fn now(params: &SessionParams) -> Self {
        Self::new(Utc::now().timestamp_millis(), params)
    }

    /// The parameters needed to run this session again
    pub fn params(&self) -> SessionParams {
        SessionParams::new(self.in_sec, self.out_sec, self.duration)
    }
}

/// Session history on top of a [`KeyValueStore`].
///
/// Storage problems never reach the caller: reads degrade to an empty list
/// and failed writes are logged and skipped.
///
/// Clones share one write lock, so sessions ending together never drop each
/// other's entries.
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All entries, newest first
    pub fn list(&self) -> Vec<HistoryEntry> {
        match self.load() {
            Ok(history) => history,
            Err(e) => {
                warn!("Failed to read session history: {}", e);
                Vec::new()
            }
        }
    }

    /// Stored entries; corrupt data reads as empty, storage errors are returned
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(values) => Ok(values
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect()),
            Err(e) => {
                warn!("Session history is corrupt, ignoring it: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Put `entry` at the front, dropping whatever falls past the limit
    pub fn append(&self, entry: HistoryEntry) {
        let _guard = self.write_lock.lock();

        let mut history = match self.load() {
            Ok(history) => history,
            Err(e) => {
                // Writing now would replace entries we could not read
                warn!("Skipping history save, failed to read it: {}", e);
                return;
            }
        };
        history.insert(0, entry);
        history.truncate(HISTORY_LIMIT);

        let json = match serde_json::to_string(&history) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize session history: {}", e);
                return;
            }
        };

        match self.store.set(HISTORY_KEY, &json) {
            Ok(()) => debug!("Session history now holds {} entries", history.len()),
            Err(e) => warn!("Failed to save session history: {}", e),
        }
    }

    /// Record a session run with `params`, stamped now
    pub fn record(&self, params: &SessionParams) {
        self.append(HistoryEntry::now(params));
    }

    pub fn clear(&self) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!("Failed to clear session history: {}", e);
        }
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish_non_exhaustive()
    }
}
