//! Coordinator tying settings, the order and the host vault together.

use std::time::Duration;

use crate::config::{SaveOutcome, SettingsManager};
use crate::dnd::ExplorerView;
use crate::error::{Error, Result};
use crate::logging;
use crate::models::{DirectoryOrder, NewItemPlacement, Settings, CUSTOM_SORT_ORDER};
use crate::mount::MountWatcher;
use crate::order::{self, OrderStore};
use crate::sync::SyncMonitor;
use crate::tree::{EventSource, TreeEntry, TreeProvider, VaultEvent};

/// Builds an order store over the settings' order, ignore set and placement
pub(crate) fn order_store(settings: &mut Settings) -> OrderStore<'_> {
    let Settings {
        custom_order,
        ignore_paths,
        new_item_placement,
        ..
    } = settings;
    OrderStore::new(custom_order, ignore_paths, *new_item_placement)
}

/// Manual sorting for one vault.
///
/// Owns the settings and the vault adapter. Every state change that touches
/// the custom order goes through here so that persistence is requested
/// consistently.
pub struct ManualSorting<V> {
    settings: SettingsManager,
    vault: V,
    sync_monitor: SyncMonitor,
    explorer: MountWatcher,
}

impl<V: TreeProvider> ManualSorting<V> {
    pub fn new(mut settings: SettingsManager, vault: V) -> Self {
        let current = settings.get();
        let sync_monitor = SyncMonitor::new(
            Duration::from_millis(current.sync_inactivity_reset_ms),
            current.sync_monitor,
        );
        settings.set_guard(sync_monitor.guard());
        Self {
            settings,
            vault,
            sync_monitor,
            explorer: MountWatcher::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn settings_manager(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    pub fn sync_monitor(&self) -> &SyncMonitor {
        &self.sync_monitor
    }

    pub fn sync_monitor_mut(&mut self) -> &mut SyncMonitor {
        &mut self.sync_monitor
    }

    /// Readiness of the host's file explorer
    pub fn explorer(&self) -> &MountWatcher {
        &self.explorer
    }

    /// Mutable view over the custom order
    pub fn order_store(&mut self) -> OrderStore<'_> {
        order_store(self.settings.get_mut())
    }

    pub fn is_custom_sorting_active(&self) -> bool {
        self.settings().is_custom_sorting_active()
    }

    /// True when rows can be dragged
    pub fn is_dragging_enabled(&self) -> bool {
        self.is_custom_sorting_active() && self.settings().dragging_enabled
    }

    /// Brings the order up to date with the vault after the layout is ready
    pub fn initialize(&mut self) {
        log::info!("Initializing manual sorting");
        logging::set_debug_mode(self.settings().debug_mode);
        if self.sync_monitor.is_enabled() {
            self.sync_monitor.start();
        }
        self.reconcile_order();
        self.request_save();
    }

    /// Called by the host once its file explorer exists
    pub fn on_explorer_mounted(&mut self, view: &mut dyn ExplorerView) {
        self.explorer.notify_mounted();
        self.refresh_explorer(view);
    }

    /// Re-derives the order from the vault and re-sorts the explorer
    pub fn refresh_explorer(&mut self, view: &mut dyn ExplorerView) {
        if !self.is_custom_sorting_active() {
            return;
        }
        self.reconcile_order();
        view.request_resort();
    }

    /// Reconciles the saved order with the live tree. Does not persist.
    pub fn reconcile_order(&mut self) {
        order_store(self.settings.get_mut()).reconcile(&self.vault);
    }

    /// Persists the settings unless sync defers the write
    pub fn request_save(&mut self) -> SaveOutcome {
        self.settings.request_save()
    }

    /// Switches the explorer's sort mode.
    ///
    /// Entering custom mode reconciles the order first.
    ///
    /// # Returns
    /// `true` if custom sorting is now active, which is also when dragging
    /// may be enabled
    pub fn set_sort_order(&mut self, sort_order: &str, view: &mut dyn ExplorerView) -> bool {
        log::info!("Sort order changed to '{}'", sort_order);
        self.settings
            .update(|settings| settings.sort_order = sort_order.to_string());
        if self.is_custom_sorting_active() {
            self.reconcile_order();
        }
        view.request_resort();
        self.request_save();
        self.is_custom_sorting_active()
    }

    pub fn enable_custom_sorting(&mut self, view: &mut dyn ExplorerView) -> bool {
        self.set_sort_order(CUSTOM_SORT_ORDER, view)
    }

    /// Drops the custom order and rebuilds it from the native order
    pub fn reset_order(&mut self, view: &mut dyn ExplorerView) {
        let mut store = order_store(self.settings.get_mut());
        store.reset();
        store.reconcile(&self.vault);
        if self.is_custom_sorting_active() {
            view.request_resort();
        }
        self.request_save();
    }

    /// Flips whether rows can be dragged
    ///
    /// # Returns
    /// The new setting
    pub fn toggle_dragging(&mut self) -> bool {
        self.settings
            .update(|settings| settings.dragging_enabled = !settings.dragging_enabled);
        let enabled = self.settings().dragging_enabled;
        log::info!("Dragging {}", if enabled { "enabled" } else { "disabled" });
        self.request_save();
        enabled
    }

    pub fn set_new_item_placement(&mut self, placement: NewItemPlacement) {
        self.settings
            .update(|settings| settings.new_item_placement = placement);
        self.request_save();
    }

    /// Adds `path` to, or removes it from, the ignore set.
    ///
    /// The order is reconciled afterwards: newly ignored folders lose their
    /// entries, folders no longer ignored get theirs back.
    pub fn set_ignored(&mut self, path: &str, ignored: bool) {
        let changed = {
            let ignore = &mut self.settings.get_mut().ignore_paths;
            if ignored {
                ignore.insert(path)
            } else {
                ignore.remove(path)
            }
        };
        if !changed {
            return;
        }
        log::info!("Path '{}' {}", path, if ignored { "ignored" } else { "no longer ignored" });
        self.reconcile_order();
        self.request_save();
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.settings.update(|settings| settings.debug_mode = enabled);
        logging::set_debug_mode(enabled);
        self.request_save();
    }

    /// Turns write deferral during sync on or off
    pub fn set_sync_monitor(&mut self, enabled: bool) {
        self.settings.update(|settings| settings.sync_monitor = enabled);
        self.sync_monitor.set_enabled(enabled);
        if enabled {
            self.sync_monitor.start();
        } else {
            self.sync_monitor.stop();
        }
        self.request_save();
    }

    pub fn set_sync_inactivity_reset(&mut self, reset_ms: u64) {
        self.settings
            .update(|settings| settings.sync_inactivity_reset_ms = reset_ms);
        self.sync_monitor
            .set_inactivity_reset(Duration::from_millis(reset_ms));
        self.request_save();
    }

    /// Applies a storage event to the order and persists if it changed
    pub fn handle_vault_event(&mut self, event: &VaultEvent) -> bool {
        log::debug!("Vault event: {:?}", event);
        let changed = order_store(self.settings.get_mut()).apply(event);
        if changed {
            self.request_save();
        }
        changed
    }

    /// Children of `dir` in display order
    pub fn sorted_children(&self, dir: &str) -> Vec<TreeEntry> {
        let items = self.vault.list_children(dir);
        if !self.is_custom_sorting_active() {
            return items;
        }
        let settings = self.settings();
        order::sort_by_custom_order(
            &settings.custom_order,
            dir,
            items,
            settings.new_item_placement,
        )
    }

    pub fn flatten_paths(&self) -> Vec<String> {
        order::flatten_paths(&self.settings().custom_order)
    }

    pub fn items_between(&self, start: &str, end: &str) -> Vec<String> {
        order::items_between(&self.settings().custom_order, start, end)
    }

    /// Saved order of `dir`
    ///
    /// # Errors
    /// [`Error::IgnoredPath`] for ignored directories, [`Error::StaleReference`]
    /// for directories the order doesn't track
    pub fn directory_order(&self, dir: &str) -> Result<&DirectoryOrder> {
        let settings = self.settings();
        if settings.ignore_paths.is_ignored(dir) {
            return Err(Error::IgnoredPath(dir.to_string()));
        }
        settings
            .custom_order
            .get(dir)
            .ok_or_else(|| Error::StaleReference(dir.to_string()))
    }

    /// Picks up settings written by someone else, e.g. a sync service.
    ///
    /// The file is reloaded, reconciled against the vault and written back.
    pub fn on_external_settings_change(&mut self, view: &mut dyn ExplorerView) -> Result<()> {
        self.settings.reload()?;
        log::warn!("Settings changed externally");

        let settings = self.settings();
        let debug_mode = settings.debug_mode;
        let sync_enabled = settings.sync_monitor;
        let reset = Duration::from_millis(settings.sync_inactivity_reset_ms);
        logging::set_debug_mode(debug_mode);
        self.sync_monitor.set_enabled(sync_enabled);
        self.sync_monitor.set_inactivity_reset(reset);

        self.refresh_explorer(view);
        self.request_save();
        Ok(())
    }

    /// Writes pending settings and stops background work
    pub fn shutdown(&mut self) -> Result<()> {
        self.settings.flush()?;
        self.sync_monitor.stop();
        self.explorer.notify_unmounted();
        log::info!("Manual sorting stopped");
        Ok(())
    }
}

impl<V: TreeProvider + EventSource> ManualSorting<V> {
    /// Feeds the events the vault recorded since the last call into the
    /// order
    ///
    /// # Returns
    /// Number of events that changed the order
    pub fn process_vault_events(&mut self) -> usize {
        let events = self.vault.take_events();
        events
            .iter()
            .filter(|event| self.handle_vault_event(event))
            .count()
    }
}
