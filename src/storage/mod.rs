//! Local persistence
//!
//! A namespaced key-value store (the desktop stand-in for browser local
//! storage) plus the two typed stores built on it: session history and form
//! preferences. Values are JSON documents stored as strings.

pub mod file;
pub mod history;
pub mod memory;
pub mod prefs;

pub use file::JsonFileStore;
pub use history::{HistoryEntry, HistoryStore, HISTORY_LIMIT};
pub use memory::MemoryStore;
pub use prefs::{is_custom_duration, Prefs, PrefsStore, STANDARD_DURATIONS};

use crate::Result;

/// Namespace shared by every key this app writes
pub const NAMESPACE: &str = "justBreathe";
/// Key holding the session history array
pub const HISTORY_KEY: &str = "justBreathe:history";
/// Key holding the saved form preferences
pub const PREFS_KEY: &str = "justBreathe:prefs";

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
