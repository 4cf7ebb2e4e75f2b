use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::error::{Error, Result};
use crate::models::{
    CustomOrder, DirectoryOrder, IgnoreSet, NewItemPlacement, Settings, CUSTOM_SORT_ORDER,
};
use crate::paths::ROOT;
use crate::sync::{NoSyncGuard, SyncGuard};

/// Debounce delay for settings saves
const SAVE_DEBOUNCE_MS: u64 = 1000;

/// Name of the settings file inside the plugin's data directory
pub const SETTINGS_FILE_NAME: &str = "data.json";

/// What became of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A debounced write is pending on the runtime
    Scheduled,
    /// Written synchronously
    Saved,
    /// Skipped because sync is writing into the vault
    Deferred,
    /// The synchronous write failed; the error was logged
    Failed,
}

/// SettingsManager owns the plugin settings and their file.
///
/// Features:
/// - Merges the saved file over defaults key by key, so missing or
///   malformed keys fall back to their defaults
/// - Debounced saving to avoid excessive disk writes
/// - Defers writes while the sync guard reports activity
pub struct SettingsManager {
    settings: Settings,
    settings_path: PathBuf,
    save_handle: Option<JoinHandle<()>>,
    guard: Arc<dyn SyncGuard>,
}

impl SettingsManager {
    /// Creates a manager for the given settings file.
    ///
    /// Loads existing settings from disk, merging with defaults for any
    /// missing fields.
    ///
    /// # Errors
    /// Fails if the file exists but can't be read or isn't JSON.
    pub fn new(settings_path: PathBuf) -> Result<Self> {
        Self::with_guard(settings_path, Arc::new(NoSyncGuard))
    }

    /// Like [`SettingsManager::new`], consulting `guard` before every write
    pub fn with_guard(settings_path: PathBuf, guard: Arc<dyn SyncGuard>) -> Result<Self> {
        let settings = Self::load_from_file(&settings_path)?;
        Ok(Self {
            settings,
            settings_path,
            save_handle: None,
            guard,
        })
    }

    /// Creates a manager holding `settings` that has not been read from disk
    pub fn in_memory(settings: Settings, settings_path: PathBuf) -> Self {
        Self {
            settings,
            settings_path,
            save_handle: None,
            guard: Arc::new(NoSyncGuard),
        }
    }

    /// Default settings file location: `{data_dir}/manual-sorting/data.json`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or(Error::NoDataDir)?;
        Ok(data_dir.join("manual-sorting").join(SETTINGS_FILE_NAME))
    }

    /// Loads settings from file, merging with defaults.
    ///
    /// A missing file yields the default settings.
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            log::info!("No settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)?;
        let settings = merge_settings_with_defaults(&content)?;
        log::info!("Settings loaded from {}", path.display());
        log::debug!("Custom order: {:?}", settings.custom_order);
        Ok(settings)
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access for callers that need split borrows of the settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Updates the settings using a closure. Does not persist.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
    }

    pub fn set_guard(&mut self, guard: Arc<dyn SyncGuard>) {
        self.guard = guard;
    }

    /// Requests that the current settings be persisted.
    ///
    /// Inside a tokio runtime the write is debounced: a pending save is
    /// cancelled and a new one scheduled after `SAVE_DEBOUNCE_MS`. Without a
    /// runtime the settings are written immediately. Either way the write is
    /// skipped while the sync guard defers writes.
    pub fn request_save(&mut self) -> SaveOutcome {
        if self.guard.should_defer_write() {
            log::info!("Sync is active, deferring settings save");
            return SaveOutcome::Deferred;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return match self.save_sync() {
                Ok(()) => SaveOutcome::Saved,
                Err(e) => {
                    log::error!("Failed to save settings: {}", e);
                    SaveOutcome::Failed
                }
            };
        };

        // Cancel any existing save task
        if let Some(handle) = self.save_handle.take() {
            handle.abort();
        }

        let settings = self.settings.clone();
        let path = self.settings_path.clone();
        let guard = Arc::clone(&self.guard);
        let handle = runtime.spawn(async move {
            sleep(Duration::from_millis(SAVE_DEBOUNCE_MS)).await;

            if guard.should_defer_write() {
                log::info!("Sync became active, deferring settings save");
                return;
            }
            if let Err(e) = write_settings(&path, &settings) {
                log::error!("Failed to save settings: {}", e);
            }
        });
        self.save_handle = Some(handle);
        SaveOutcome::Scheduled
    }

    /// True while a debounced save is waiting to run
    pub fn has_pending_save(&self) -> bool {
        self.save_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Writes a pending debounced save right away
    ///
    /// # Returns
    /// `true` if a pending save was written
    pub fn flush(&mut self) -> Result<bool> {
        let Some(handle) = self.save_handle.take() else {
            return Ok(false);
        };
        if handle.is_finished() {
            return Ok(false);
        }
        handle.abort();
        if self.guard.should_defer_write() {
            log::info!("Sync is active, dropping pending settings save");
            return Ok(false);
        }
        self.save_sync()?;
        Ok(true)
    }

    /// Saves the settings to disk immediately
    pub fn save_sync(&self) -> Result<()> {
        write_settings(&self.settings_path, &self.settings)
    }

    /// Re-reads the settings file, replacing the in-memory settings.
    ///
    /// Used when the file was changed by someone else, e.g. a sync service.
    pub fn reload(&mut self) -> Result<()> {
        if let Some(handle) = self.save_handle.take() {
            handle.abort();
        }
        self.settings = Self::load_from_file(&self.settings_path)?;
        log::warn!("Settings reloaded from {}", self.settings_path.display());
        Ok(())
    }

    /// Returns the settings file path.
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }
}

impl Drop for SettingsManager {
    fn drop(&mut self) {
        if let Some(handle) = self.save_handle.take() {
            handle.abort();
        }
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content)?;
    log::info!("Settings saved to {}", path.display());
    log::debug!("Custom order: {:?}", settings.custom_order);
    Ok(())
}

/// Merges a partial settings JSON with defaults.
///
/// Reads the current key layout as well as the earlier one, where the order
/// was stored as `customFileOrder` with bare child arrays and the sort mode
/// as `selectedSortOrder`. The root entry is always present afterwards.
///
/// # Errors
/// Fails only if `partial_json` isn't valid JSON.
pub fn merge_settings_with_defaults(partial_json: &str) -> Result<Settings> {
    if partial_json.trim().is_empty() {
        return Ok(Settings::default());
    }

    let json_value: Value = serde_json::from_str(partial_json)?;
    let mut settings = Settings::default();

    if let Some(obj) = json_value.as_object() {
        let order = obj
            .get("customOrder")
            .or_else(|| obj.get("customFileOrder"))
            .and_then(Value::as_object);
        if let Some(v) = order {
            settings.custom_order = parse_custom_order(v);
        }
        let sort_order = obj
            .get("sortOrder")
            .or_else(|| obj.get("selectedSortOrder"))
            .and_then(Value::as_str);
        if let Some(v) = sort_order {
            settings.sort_order = v.to_string();
        }
        if let Some(v) = obj.get("ignorePaths") {
            match serde_json::from_value::<IgnoreSet>(v.clone()) {
                Ok(ignore) => settings.ignore_paths = ignore,
                Err(e) => log::warn!("Malformed ignorePaths, using defaults: {}", e),
            }
        }
        if let Some(v) = obj.get("newItemPlacement") {
            match serde_json::from_value::<NewItemPlacement>(v.clone()) {
                Ok(placement) => settings.new_item_placement = placement,
                Err(e) => log::warn!("Malformed newItemPlacement, using default: {}", e),
            }
        }
        if let Some(v) = obj.get("draggingEnabled").and_then(Value::as_bool) {
            settings.dragging_enabled = v;
        }
        if let Some(v) = obj.get("debugMode").and_then(Value::as_bool) {
            settings.debug_mode = v;
        }
        if let Some(v) = obj.get("syncMonitor").and_then(Value::as_bool) {
            settings.sync_monitor = v;
        }
        if let Some(v) = obj.get("syncInactivityResetMs").and_then(Value::as_u64) {
            settings.sync_inactivity_reset_ms = v;
        }
    }

    Ok(settings)
}

fn parse_custom_order(obj: &Map<String, Value>) -> CustomOrder {
    let mut order = CustomOrder::new();

    for (dir, entry) in obj {
        let parsed = match entry {
            Value::Array(children) => Some(DirectoryOrder::new(string_list(children))),
            Value::Object(fields) => fields
                .get("children")
                .and_then(Value::as_array)
                .map(|children| DirectoryOrder {
                    children: string_list(children),
                    sort_order: fields
                        .get("sortOrder")
                        .and_then(Value::as_str)
                        .unwrap_or(CUSTOM_SORT_ORDER)
                        .to_string(),
                }),
            _ => None,
        };
        match parsed {
            Some(parsed) => {
                order.insert(dir.clone(), parsed);
            }
            None => log::warn!("Dropping malformed order entry for '{}'", dir),
        }
    }

    if !order.contains_key(ROOT) {
        log::warn!("Saved order has no root entry, re-creating it");
        order.insert(ROOT.to_string(), DirectoryOrder::empty());
    }
    order
}

fn string_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|item| item.as_str().map(|s| s.to_string()))
        .collect()
}
