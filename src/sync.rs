//! Sync activity tracking.
//!
//! A sync service writes into the vault behind our back. While it is busy,
//! rewriting the settings file risks clobbering a version that is being
//! downloaded, so writers consult a [`SyncGuard`] first. [`SyncMonitor`]
//! derives activity from the sync service's status text: any download or
//! local delete marks sync as active, and it falls back to idle once no such
//! status was seen for the inactivity reset period.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};

use crate::error::{Error, Result};

/// Longest wait offered to callers of [`SyncMonitor::await_sync_inactive`]
pub const WAIT_FOR_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tells writers whether persisting now would race an external writer
pub trait SyncGuard: Send + Sync {
    fn should_defer_write(&self) -> bool;
}

/// Guard for vaults without a sync service
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSyncGuard;

impl SyncGuard for NoSyncGuard {
    fn should_defer_write(&self) -> bool {
        false
    }
}

/// State shared with the reset task and handed out as the write guard
#[derive(Debug)]
struct SyncShared {
    active: watch::Sender<bool>,
    enabled: AtomicBool,
}

impl SyncGuard for SyncShared {
    fn should_defer_write(&self) -> bool {
        self.enabled.load(Ordering::Relaxed) && *self.active.borrow()
    }
}

/// Tracks whether the sync service is currently writing into the vault
pub struct SyncMonitor {
    shared: Arc<SyncShared>,
    inactivity_reset: Duration,
    reset_task: Option<JoinHandle<()>>,
    reset_at: Option<Instant>,
    last_status: String,
}

impl SyncMonitor {
    /// Creates an idle monitor
    ///
    /// # Arguments
    /// * `inactivity_reset` - Quiet period after which sync counts as idle
    /// * `enabled` - Whether writes are deferred while sync is active
    pub fn new(inactivity_reset: Duration, enabled: bool) -> Self {
        let (active, _) = watch::channel(false);
        Self {
            shared: Arc::new(SyncShared {
                active,
                enabled: AtomicBool::new(enabled),
            }),
            inactivity_reset,
            reset_task: None,
            reset_at: None,
            last_status: String::new(),
        }
    }

    /// Starts monitoring.
    ///
    /// Sync usually runs right after the vault opens, so the monitor starts
    /// out active.
    pub fn start(&mut self) {
        log::info!("Sync monitor started");
        self.set_active();
    }

    /// Stops monitoring and reports idle from now on
    pub fn stop(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
        self.reset_at = None;
        self.shared.active.send_replace(false);
        log::info!("Sync monitor stopped");
    }

    /// Write guard backed by this monitor
    pub fn guard(&self) -> Arc<dyn SyncGuard> {
        self.shared.clone()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Relaxed)
    }

    pub fn set_inactivity_reset(&mut self, inactivity_reset: Duration) {
        self.inactivity_reset = inactivity_reset;
    }

    pub fn is_sync_active(&self) -> bool {
        *self.shared.active.borrow()
    }

    /// Marks sync as active and restarts the inactivity countdown
    pub fn set_active(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("No async runtime available, sync activity is not tracked");
                return;
            }
        };

        let was_active = self.shared.active.send_replace(true);
        if !was_active {
            log::info!("Sync became active");
        }

        let delay = self.inactivity_reset;
        self.reset_at = Some(Instant::now() + delay);
        let shared = Arc::clone(&self.shared);
        self.reset_task = Some(handle.spawn(async move {
            sleep(delay).await;
            shared.active.send_replace(false);
            log::info!("Sync idle after {:?} without activity", delay);
        }));
    }

    /// Hands an external "unsafe to write" signal to the monitor
    pub fn notify_unsafe_to_write(&mut self) {
        self.set_active();
    }

    /// Feeds the sync service's status text into the monitor.
    ///
    /// Only changes of the status count. Downloads and local deletes mark
    /// sync as active; uploads and remote deletes are our own changes
    /// leaving the vault and don't.
    ///
    /// # Returns
    /// `true` if the status marked sync as active
    pub fn on_sync_status_changed(&mut self, status: &str) -> bool {
        let status = status.to_lowercase();
        if status == self.last_status {
            return false;
        }

        let incoming = status.contains("downloading")
            || (status.contains("deleting") && !status.contains("remote"));
        if incoming {
            self.set_active();
        }
        log::info!("syncStatus: {}, syncActive: {}", status, self.is_sync_active());
        self.last_status = status;
        incoming
    }

    /// Waits until sync is idle.
    ///
    /// # Errors
    /// [`Error::SyncTimeout`] if sync is still active after `wait`
    pub async fn await_sync_inactive(&self, wait: Duration) -> Result<()> {
        let mut active = self.shared.active.subscribe();
        let waited = timeout(wait, active.wait_for(|active| !*active))
            .await
            .map(|_| ());
        match waited {
            Ok(()) => Ok(()),
            Err(_) => {
                log::warn!("Timeout waiting for sync to become inactive");
                Err(Error::SyncTimeout(wait))
            }
        }
    }

    /// Status line: `Sync: Idle`, or `Sync: Active (Ns)` with the seconds
    /// left until the monitor falls back to idle
    pub fn status_text(&self) -> String {
        if !self.is_sync_active() {
            return "Sync: Idle".to_string();
        }
        let remaining = self
            .reset_at
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or_default();
        let seconds = remaining.as_millis().div_ceil(1000);
        if seconds > 0 {
            format!("Sync: Active ({}s)", seconds)
        } else {
            "Sync: Active".to_string()
        }
    }
}

impl Drop for SyncMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESET: Duration = Duration::from_millis(2000);

    async fn settle(duration: Duration) {
        sleep(duration).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_resets_after_quiet_period() {
        let mut monitor = SyncMonitor::new(RESET, true);
        monitor.start();
        assert!(monitor.is_sync_active());
        assert!(monitor.guard().should_defer_write());
        assert_eq!(monitor.status_text(), "Sync: Active (2s)");

        settle(Duration::from_millis(1500)).await;
        assert_eq!(monitor.status_text(), "Sync: Active (1s)");
        // fresh activity restarts the countdown
        monitor.notify_unsafe_to_write();
        settle(Duration::from_millis(1500)).await;
        assert!(monitor.is_sync_active());

        settle(Duration::from_millis(600)).await;
        assert!(!monitor.is_sync_active());
        assert_eq!(monitor.status_text(), "Sync: Idle");
        assert!(!monitor.guard().should_defer_write());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_text_classification() {
        let mut monitor = SyncMonitor::new(RESET, true);

        assert!(!monitor.on_sync_status_changed("Uploading file"));
        assert!(!monitor.on_sync_status_changed("Deleting remote file"));
        assert!(!monitor.is_sync_active());

        assert!(monitor.on_sync_status_changed("Downloading notes/a.md"));
        assert!(monitor.is_sync_active());
        // unchanged status text is ignored
        assert!(!monitor.on_sync_status_changed("downloading NOTES/A.MD"));
        assert!(monitor.on_sync_status_changed("Deleting notes/b.md"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_sync_inactive() {
        let mut monitor = SyncMonitor::new(RESET, true);
        assert!(monitor.await_sync_inactive(Duration::from_millis(10)).await.is_ok());

        monitor.set_active();
        let result = monitor.await_sync_inactive(Duration::from_millis(500)).await;
        assert!(matches!(result, Err(Error::SyncTimeout(_))));

        assert!(monitor.await_sync_inactive(WAIT_FOR_IDLE_TIMEOUT).await.is_ok());
        assert!(!monitor.is_sync_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_monitor_never_defers() {
        let mut monitor = SyncMonitor::new(RESET, false);
        monitor.set_active();
        assert!(monitor.is_sync_active());
        assert!(!monitor.guard().should_defer_write());

        monitor.set_enabled(true);
        assert!(monitor.guard().should_defer_write());
        monitor.stop();
        assert!(!monitor.guard().should_defer_write());
    }

    #[test]
    fn test_without_runtime_stays_idle() {
        let mut monitor = SyncMonitor::new(RESET, true);
        monitor.start();
        assert!(!monitor.is_sync_active());
        assert!(!NoSyncGuard.should_defer_write());
    }
}
