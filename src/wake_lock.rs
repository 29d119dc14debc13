//! Best-effort display wake lock
//!
//! Keeps the screen from blanking while a session runs. Nothing depends on it
//! succeeding: every failure is logged and turned into "no lock".

use crate::{BreatheError, Result};
use parking_lot::Mutex;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// A held wake lock. Give it back through [`WakeLock::release`].
#[derive(Debug)]
pub struct WakeLockHandle {
    id: u64,
    inhibitor: Option<Child>,
}

impl WakeLockHandle {
    /// Create a handle that is not backed by a process
    pub fn new(id: u64) -> Self {
        Self {
            id,
            inhibitor: None,
        }
    }

    fn with_inhibitor(id: u64, child: Child) -> Self {
        Self {
            id,
            inhibitor: Some(child),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Platform facility that prevents the display from sleeping
pub trait WakeLock: Send + Sync {
    /// Try to take the lock; `None` if the capability is absent or refused
    fn acquire(&self) -> Option<WakeLockHandle>;

    /// Give the lock back
    fn release(&self, handle: WakeLockHandle);
}

/// Wake lock for platforms (or configs) without one
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWakeLock;

impl WakeLock for NoWakeLock {
    fn acquire(&self) -> Option<WakeLockHandle> {
        None
    }

    fn release(&self, _handle: WakeLockHandle) {}
}

/// Holds an idle inhibitor process for as long as the lock is held.
///
/// Linux uses `systemd-inhibit`, macOS uses `caffeinate`.
#[derive(Debug)]
pub struct InhibitWakeLock {
    program: Option<(&'static str, Vec<&'static str>)>,
    next_id: AtomicU64,
    held: Mutex<usize>,
}

impl InhibitWakeLock {
    /// Create a wake lock using the inhibitor native to this platform
    pub fn new() -> Self {
        Self {
            program: Self::platform_command(),
            next_id: AtomicU64::new(1),
            held: Mutex::new(0),
        }
    }

    /// Create a wake lock that holds `program` running while locked
    pub fn with_command(program: &'static str, args: Vec<&'static str>) -> Self {
        Self {
            program: Some((program, args)),
            next_id: AtomicU64::new(1),
            held: Mutex::new(0),
        }
    }

    #[cfg(target_os = "linux")]
    fn platform_command() -> Option<(&'static str, Vec<&'static str>)> {
        Some((
            "systemd-inhibit",
            vec![
                "--what=idle",
                "--who=Just Breathe",
                "--why=Breathing session in progress",
                "--mode=block",
                "sleep",
                "infinity",
            ],
        ))
    }

    #[cfg(target_os = "macos")]
    fn platform_command() -> Option<(&'static str, Vec<&'static str>)> {
        Some(("caffeinate", vec!["-d"]))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn platform_command() -> Option<(&'static str, Vec<&'static str>)> {
        None
    }

    /// Check if this platform has an inhibitor at all
    pub fn is_supported(&self) -> bool {
        self.program.is_some()
    }

    /// Number of locks currently held
    pub fn held(&self) -> usize {
        *self.held.lock()
    }
}

impl Default for InhibitWakeLock {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeLock for InhibitWakeLock {
    fn acquire(&self) -> Option<WakeLockHandle> {
        let (program, args) = self.program.as_ref()?;

        match spawn_inhibitor(program, args) {
            Ok(child) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                *self.held.lock() += 1;
                info!("Wake lock {} acquired via {} (pid {})", id, program, child.id());
                Some(WakeLockHandle::with_inhibitor(id, child))
            }
            Err(e) => {
                warn!("{} ({})", e.user_message(), e);
                None
            }
        }
    }

    fn release(&self, mut handle: WakeLockHandle) {
        if let Some(mut child) = handle.inhibitor.take() {
            if let Err(e) = child.kill() {
                debug!("Inhibitor for wake lock {} already gone: {}", handle.id, e);
            }
            let _ = child.wait();
        }

        let mut held = self.held.lock();
        *held = held.saturating_sub(1);
        info!("Wake lock {} released", handle.id);
    }
}

fn spawn_inhibitor(program: &str, args: &[&str]) -> Result<Child> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| BreatheError::WakeLockError(format!("{} failed to start: {}", program, e)))
}
