//! Keeps the custom order in step with storage events.
//!
//! Events may be caused by the user, by sync or by our own drag commits; a
//! commit updates the order first, so the rename event it triggers later
//! finds the order already in its final state and changes nothing.

use crate::order::OrderStore;
use crate::paths;
use crate::tree::VaultEvent;

impl OrderStore<'_> {
    /// Applies one storage event to the order.
    ///
    /// # Returns
    /// `true` if the order changed and should be persisted
    pub fn apply(&mut self, event: &VaultEvent) -> bool {
        match event {
            VaultEvent::Created { path, is_dir } => self.add(path, *is_dir),
            VaultEvent::Deleted { path } => self.remove(path),
            VaultEvent::Renamed {
                old_path,
                new_path,
                is_dir,
            } => self.apply_rename(old_path, new_path, *is_dir),
        }
    }

    fn apply_rename(&mut self, old_path: &str, new_path: &str, is_dir: bool) -> bool {
        let old_ignored = self.is_ignored(paths::parent_dir(old_path));
        let new_ignored = self.is_ignored(paths::parent_dir(new_path));

        match (old_ignored, new_ignored) {
            (true, true) => {
                log::debug!("Ignoring rename inside ignored paths: '{}' -> '{}'", old_path, new_path);
                false
            }
            // Moved out of an ignored folder, so the order sees it for the first time
            (true, false) => self.add(new_path, is_dir),
            // Moved into an ignored folder
            (false, true) => self.remove(old_path),
            (false, false) => {
                let renamed = if self.already_applied(old_path, new_path) {
                    log::debug!("Rename '{}' -> '{}' already reflected in the order", old_path, new_path);
                    false
                } else {
                    self.rename(old_path, new_path)
                };
                // A folder leaving the ignore set has no entry to carry over
                let tracked = is_dir && self.ensure_folder_entry(new_path);
                renamed || tracked
            }
        }
    }

    fn already_applied(&self, old_path: &str, new_path: &str) -> bool {
        let new_listed = self
            .children(paths::parent_dir(new_path))
            .is_some_and(|children| children.iter().any(|p| p == new_path));
        let old_listed = self
            .children(paths::parent_dir(old_path))
            .is_some_and(|children| children.iter().any(|p| p == old_path));
        new_listed && !old_listed && !self.order().contains_key(old_path)
    }
}
