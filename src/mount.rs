//! Readiness of the host's file explorer.
//!
//! The explorer may be created after the plugin loads and may be torn down
//! and re-created while it runs. Work that needs the explorer either waits
//! for it with [`MountWatcher::wait_for_mount`] or registers a callback with
//! [`MountWatcher::on_mount`].

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct MountWatcher {
    mounted: Arc<watch::Sender<bool>>,
}

impl Default for MountWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MountWatcher {
    pub fn new() -> Self {
        let (mounted, _) = watch::channel(false);
        Self {
            mounted: Arc::new(mounted),
        }
    }

    pub fn is_mounted(&self) -> bool {
        *self.mounted.borrow()
    }

    pub fn notify_mounted(&self) {
        if !self.mounted.send_replace(true) {
            log::info!("File explorer mounted");
        }
    }

    pub fn notify_unmounted(&self) {
        if self.mounted.send_replace(false) {
            log::info!("File explorer unmounted");
        }
    }

    /// Resolves once the explorer is mounted; immediately if it already is
    pub async fn wait_for_mount(&self) {
        let mut mounted = self.mounted.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = mounted.wait_for(|mounted| *mounted).await;
    }

    /// Runs `callback` once the explorer is mounted.
    ///
    /// Runs it right away when already mounted. Otherwise the callback waits
    /// on the runtime until the next mount, unless the returned subscription
    /// is dropped first.
    pub fn on_mount<F>(&self, callback: F) -> MountSubscription
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_mounted() {
            callback();
            return MountSubscription { task: None };
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("No async runtime available, mount callback dropped");
                return MountSubscription { task: None };
            }
        };

        let mut mounted = self.mounted.subscribe();
        let task = handle.spawn(async move {
            if mounted.wait_for(|mounted| *mounted).await.is_ok() {
                callback();
            }
        });
        MountSubscription { task: Some(task) }
    }
}

/// Pending [`MountWatcher::on_mount`] callback, cancelled on drop
#[derive(Debug)]
pub struct MountSubscription {
    task: Option<JoinHandle<()>>,
}

impl MountSubscription {
    /// True while the callback has not run yet
    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for MountSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
