use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::paths::{self, ROOT};

/// Sort order id that activates manual sorting in the file explorer
pub const CUSTOM_SORT_ORDER: &str = "custom";

/// Default delay of no sync activity before the vault counts as idle again
pub const DEFAULT_SYNC_INACTIVITY_RESET_MS: u64 = 2000;

/// Persisted order of one directory's immediate children
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryOrder {
    pub children: Vec<String>,
    pub sort_order: String,
}

impl DirectoryOrder {
    /// Creates a custom-sorted entry with the given children
    pub fn new(children: Vec<String>) -> Self {
        Self {
            children,
            sort_order: CUSTOM_SORT_ORDER.to_string(),
        }
    }

    /// Creates an empty custom-sorted entry
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Directory path -> ordered children
pub type CustomOrder = BTreeMap<String, DirectoryOrder>;

/// Returns the order of a freshly initialised vault: the root with no children.
pub fn default_custom_order() -> CustomOrder {
    let mut order = CustomOrder::new();
    order.insert(ROOT.to_string(), DirectoryOrder::empty());
    order
}

/// Where new items land in their directory's order
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NewItemPlacement {
    #[default]
    Top,
    Bottom,
}

/// Side of the target sibling that a dragged item is dropped on
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}

/// Paths excluded from custom ordering, inherited by their descendants.
///
/// Persisted as `{ "path": true }`; entries set to `false` are dropped.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct IgnoreSet {
    paths: BTreeSet<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `path` or any of its ancestor directories is listed
    pub fn is_ignored(&self, path: &str) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        if self.paths.contains(path) {
            log::debug!("Path '{}' is explicitly ignored", path);
            return true;
        }
        if let Some(ancestor) = paths::ancestors(path).find(|a| self.paths.contains(*a)) {
            log::debug!("Path '{}' is ignored because parent '{}' is ignored", path, ancestor);
            return true;
        }
        false
    }

    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl From<BTreeMap<String, bool>> for IgnoreSet {
    fn from(map: BTreeMap<String, bool>) -> Self {
        Self {
            paths: map
                .into_iter()
                .filter_map(|(path, ignored)| ignored.then_some(path))
                .collect(),
        }
    }
}

impl From<IgnoreSet> for BTreeMap<String, bool> {
    fn from(set: IgnoreSet) -> Self {
        set.paths.into_iter().map(|path| (path, true)).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Persisted plugin settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub custom_order: CustomOrder,
    pub sort_order: String,
    pub ignore_paths: IgnoreSet,
    pub new_item_placement: NewItemPlacement,
    pub dragging_enabled: bool,
    pub debug_mode: bool,
    pub sync_monitor: bool,
    pub sync_inactivity_reset_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            custom_order: default_custom_order(),
            sort_order: CUSTOM_SORT_ORDER.to_string(),
            ignore_paths: IgnoreSet::new(),
            new_item_placement: NewItemPlacement::Top,
            dragging_enabled: true,
            debug_mode: cfg!(debug_assertions),
            sync_monitor: false,
            sync_inactivity_reset_ms: DEFAULT_SYNC_INACTIVITY_RESET_MS,
        }
    }
}

impl Settings {
    /// True when the explorer is sorted by the custom order
    pub fn is_custom_sorting_active(&self) -> bool {
        self.sort_order == CUSTOM_SORT_ORDER
    }
}
