use std::collections::btree_map::Entry;
use std::collections::HashSet;

use crate::models::{
    default_custom_order, CustomOrder, DirectoryOrder, DropPosition, IgnoreSet, NewItemPlacement,
};
use crate::order::reconcile;
use crate::paths::{self, ROOT};
use crate::tree::TreeProvider;

/// Result of [`OrderStore::move_item`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Source, destination and sibling were identical; nothing changed
    Unchanged,
    /// The order was updated. `resort_required` is set when the item stayed
    /// in its directory, because the host will not re-render on its own when
    /// no file actually changed directory.
    Moved { resort_required: bool },
}

/// Mutable view over the persisted custom order.
///
/// Borrowed from [`Settings`](crate::models::Settings) together with the
/// ignore set and the new item placement, so every operation sees the same
/// configuration as the rest of the plugin. No I/O happens here.
///
/// Operations on ignored or untracked paths are logged no-ops. The order may
/// lag behind the live tree between external changes; [`OrderStore::reconcile`]
/// restores consistency.
pub struct OrderStore<'a> {
    order: &'a mut CustomOrder,
    ignore: &'a IgnoreSet,
    placement: NewItemPlacement,
}

impl<'a> OrderStore<'a> {
    pub fn new(
        order: &'a mut CustomOrder,
        ignore: &'a IgnoreSet,
        placement: NewItemPlacement,
    ) -> Self {
        Self {
            order,
            ignore,
            placement,
        }
    }

    /// Read access to the underlying order
    pub fn order(&self) -> &CustomOrder {
        &*self.order
    }

    /// Children of `dir`, if the directory is tracked
    pub fn children(&self, dir: &str) -> Option<&[String]> {
        self.order.get(dir).map(|entry| entry.children.as_slice())
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignore.is_ignored(path)
    }

    pub fn placement(&self) -> NewItemPlacement {
        self.placement
    }

    /// Inserts a new item into its parent's order.
    ///
    /// New folders also get an empty entry of their own.
    ///
    /// # Returns
    /// `true` if the order changed
    pub fn add(&mut self, path: &str, is_dir: bool) -> bool {
        log::info!("Inserting new item: '{}'", path);
        let dir = paths::parent_dir(path);
        if self.ignore.is_ignored(dir) {
            return false;
        }

        let mut changed = false;
        if is_dir && !self.ignore.is_ignored(path) && !self.order.contains_key(path) {
            self.order.insert(path.to_string(), DirectoryOrder::empty());
            changed = true;
        }

        let placement = self.placement;
        let entry = self.dir_entry(dir);
        if !entry.children.iter().any(|p| p == path) {
            insert_by_placement(&mut entry.children, path.to_string(), placement);
            changed = true;
        }

        self.log_order("Updated order after adding new item:");
        changed
    }

    /// Removes an item from its parent's order, together with the entries of
    /// a removed folder and everything below it.
    pub fn remove(&mut self, path: &str) -> bool {
        log::info!("Removing item: '{}'", path);
        if path == ROOT {
            log::warn!("Refusing to remove the vault root from the order");
            return false;
        }
        let dir = paths::parent_dir(path);
        if self.ignore.is_ignored(dir) {
            return false;
        }

        let mut changed = false;
        match self.order.get_mut(dir) {
            Some(entry) => {
                let before = entry.children.len();
                entry.children.retain(|p| p != path);
                changed = entry.children.len() != before;
            }
            None => log::warn!("Directory '{}' is not tracked, nothing to remove", dir),
        }

        changed |= self.remove_folder(path);
        self.log_order("Updated order after removing item:");
        changed
    }

    /// Renames an item in place, or moves it to the new parent when the
    /// directory changed.
    ///
    /// A renamed folder rewrites its own entry and every descendant path.
    /// Cross-directory renames insert the item according to the placement
    /// policy since no sibling target is known; use [`OrderStore::move_item`]
    /// for positional moves.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> bool {
        if old_path == new_path {
            return false;
        }
        log::info!("Renaming '{}' to '{}'", old_path, new_path);
        let old_dir = paths::parent_dir(old_path);
        let new_dir = paths::parent_dir(new_path);
        if self.ignore.is_ignored(old_dir) || self.ignore.is_ignored(new_dir) {
            return false;
        }

        let placement = self.placement;
        if old_dir == new_dir {
            let entry = self.dir_entry(old_dir);
            if entry.children.iter().any(|p| p == new_path) {
                entry.children.retain(|p| p != old_path);
            } else if let Some(slot) = entry.children.iter_mut().find(|p| *p == old_path) {
                *slot = new_path.to_string();
            } else {
                log::warn!("'{}' was not tracked in '{}', inserting '{}'", old_path, old_dir, new_path);
                insert_by_placement(&mut entry.children, new_path.to_string(), placement);
            }
        } else {
            match self.order.get_mut(old_dir) {
                Some(entry) => entry.children.retain(|p| p != old_path),
                None => log::warn!("Directory '{}' is not tracked", old_dir),
            }
            let entry = self.dir_entry(new_dir);
            if !entry.children.iter().any(|p| p == new_path) {
                insert_by_placement(&mut entry.children, new_path.to_string(), placement);
            }
        }

        self.carry_folder(old_path, new_path);
        self.log_order("Updated order after renaming item:");
        true
    }

    /// Moves an item next to a sibling, possibly into another directory.
    ///
    /// # Arguments
    /// * `old_path` - Current path of the item
    /// * `new_path` - Path after the move (the parent may differ)
    /// * `sibling` - Item to drop next to, or `None` to drop into an empty
    ///   directory
    /// * `position` - Side of the sibling to drop on
    pub fn move_item(
        &mut self,
        old_path: &str,
        new_path: &str,
        sibling: Option<&str>,
        position: DropPosition,
    ) -> MoveOutcome {
        if old_path == new_path && sibling == Some(new_path) {
            log::info!("No move needed: '{}' is already at the target position", old_path);
            return MoveOutcome::Unchanged;
        }
        log::info!(
            "Moving '{}' to '{}' ({:?} '{}')",
            old_path,
            new_path,
            position,
            sibling.unwrap_or_default()
        );

        let old_dir = paths::parent_dir(old_path).to_string();
        let new_dir = paths::parent_dir(new_path).to_string();

        if !self.ignore.is_ignored(&old_dir) {
            match self.order.get_mut(&old_dir) {
                Some(entry) => entry.children.retain(|p| p != old_path),
                None => log::warn!("Directory '{}' is not tracked", old_dir),
            }
        }

        if !self.ignore.is_ignored(&new_dir) {
            let placement = self.placement;
            let entry = self.dir_entry(&new_dir);
            entry.children.retain(|p| p != new_path);

            let index = match sibling {
                Some(sibling) => match entry.children.iter().position(|p| p == sibling) {
                    Some(idx) => match position {
                        DropPosition::Before => idx,
                        DropPosition::After => idx + 1,
                    },
                    None => {
                        log::warn!(
                            "Sibling '{}' is not tracked in '{}', placing '{}' by default",
                            sibling,
                            new_dir,
                            new_path
                        );
                        placement_index(entry.children.len(), placement)
                    }
                },
                None => placement_index(entry.children.len(), placement),
            };
            entry.children.insert(index, new_path.to_string());
        }

        self.carry_folder(old_path, new_path);
        self.log_order("Updated order after moving item:");

        let resort_required = old_dir == new_dir;
        if resort_required {
            log::info!("Directory did not change, the explorer has to be re-sorted manually");
        }
        MoveOutcome::Moved { resort_required }
    }

    /// Replaces the order with one reconciled against the live tree
    pub fn reconcile<T: TreeProvider + ?Sized>(&mut self, tree: &T) {
        log::info!("Updating order...");
        *self.order = reconcile::reconcile(tree, &*self.order, self.ignore, self.placement);
        self.log_order("Order updated:");
    }

    /// Discards all entries, leaving only an empty root
    pub fn reset(&mut self) {
        log::info!("Resetting custom order");
        *self.order = default_custom_order();
    }

    fn dir_entry(&mut self, dir: &str) -> &mut DirectoryOrder {
        self.order.entry(dir.to_string()).or_insert_with(|| {
            log::warn!("Directory '{}' missing from the order, re-initialising it", dir);
            DirectoryOrder::empty()
        })
    }

    fn is_tracked_folder(&self, path: &str) -> bool {
        self.order.contains_key(path)
    }

    /// Moves a tracked folder's subtree to its new location, or drops it when
    /// the destination is ignored.
    fn carry_folder(&mut self, old_path: &str, new_path: &str) {
        if old_path == new_path || !self.is_tracked_folder(old_path) {
            return;
        }
        if self.ignore.is_ignored(new_path) {
            self.remove_folder(old_path);
        } else {
            self.rename_folder(old_path, new_path);
        }
    }

    fn rename_folder(&mut self, old_path: &str, new_path: &str) {
        let keys: Vec<String> = self
            .order
            .keys()
            .filter(|key| paths::is_same_or_descendant(key, old_path))
            .cloned()
            .collect();

        for key in keys {
            let Some(mut entry) = self.order.remove(&key) else {
                continue;
            };
            let mut seen = HashSet::new();
            entry.children = entry
                .children
                .into_iter()
                .map(|child| paths::replace_prefix(&child, old_path, new_path).unwrap_or(child))
                .filter(|child| seen.insert(child.clone()))
                .collect();
            let new_key = paths::replace_prefix(&key, old_path, new_path).unwrap_or(key);
            match self.order.entry(new_key) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(mut slot) => {
                    log::warn!("'{}' is already tracked, merging the moved children into it", slot.key());
                    let existing = &mut slot.get_mut().children;
                    for child in entry.children {
                        if !existing.contains(&child) {
                            existing.push(child);
                        }
                    }
                }
            }
        }
    }

    /// Gives a folder that is not ignored an empty entry if it has none.
    ///
    /// # Returns
    /// `true` if an entry was created
    pub(crate) fn ensure_folder_entry(&mut self, path: &str) -> bool {
        if self.ignore.is_ignored(path) || self.order.contains_key(path) {
            return false;
        }
        log::info!("Tracking folder '{}'", path);
        self.order.insert(path.to_string(), DirectoryOrder::empty());
        true
    }

    fn remove_folder(&mut self, path: &str) -> bool {
        let before = self.order.len();
        self.order
            .retain(|key, _| key == ROOT || !paths::is_same_or_descendant(key, path));
        self.order.len() != before
    }

    fn log_order(&self, message: &str) {
        if log::log_enabled!(log::Level::Debug) {
            let dump = serde_json::to_string_pretty(&*self.order).unwrap_or_default();
            log::debug!("{}\n{}", message, dump);
        }
    }
}

fn placement_index(len: usize, placement: NewItemPlacement) -> usize {
    match placement {
        NewItemPlacement::Top => 0,
        NewItemPlacement::Bottom => len,
    }
}

fn insert_by_placement(children: &mut Vec<String>, path: String, placement: NewItemPlacement) {
    let index = placement_index(children.len(), placement);
    children.insert(index, path);
}
