use std::collections::HashSet;

use crate::models::{CustomOrder, DirectoryOrder, IgnoreSet, NewItemPlacement};
use crate::paths::ROOT;
use crate::tree::TreeProvider;

/// Captures the live tree as an order map.
///
/// Walks top-down from the root. Every visited directory records its
/// children in the host's native order. Ignored directories are neither
/// recorded nor descended into, but they still show up in their parent's
/// child list so they can be positioned.
pub fn snapshot<T: TreeProvider + ?Sized>(tree: &T, ignore: &IgnoreSet) -> CustomOrder {
    let mut current = CustomOrder::new();
    let mut pending = vec![ROOT.to_string()];

    while let Some(dir) = pending.pop() {
        if ignore.is_ignored(&dir) || current.contains_key(&dir) {
            continue;
        }
        let children = tree.list_children(&dir);
        // Reverse so the first child folder is visited first
        for child in children.iter().rev() {
            if child.is_dir && !ignore.is_ignored(&child.path) {
                pending.push(child.path.clone());
            }
        }
        let paths = children.into_iter().map(|child| child.path).collect();
        current.insert(dir, DirectoryOrder::new(paths));
    }

    current
}

/// Merges a freshly captured order with the saved one.
///
/// For directories known to both, children that still exist keep their
/// saved relative order and new children are added at the top or bottom
/// according to `placement`. Directories that are no longer present are
/// dropped.
///
/// # Arguments
/// * `current` - Order captured from the live tree
/// * `saved` - Last persisted order
/// * `placement` - Where children missing from `saved` are placed
pub fn merge_saved_order(
    current: &CustomOrder,
    saved: &CustomOrder,
    placement: NewItemPlacement,
) -> CustomOrder {
    let mut result = CustomOrder::new();

    for (dir, live) in current {
        let merged = match saved.get(dir) {
            Some(prev) => {
                let live_set: HashSet<&str> = live.children.iter().map(String::as_str).collect();
                let prev_set: HashSet<&str> = prev.children.iter().map(String::as_str).collect();

                let kept = prev
                    .children
                    .iter()
                    .filter(|path| live_set.contains(path.as_str()));
                let fresh = live
                    .children
                    .iter()
                    .filter(|path| !prev_set.contains(path.as_str()));

                let children = match placement {
                    NewItemPlacement::Top => dedup(fresh.chain(kept)),
                    NewItemPlacement::Bottom => dedup(kept.chain(fresh)),
                };
                DirectoryOrder {
                    children,
                    sort_order: prev.sort_order.clone(),
                }
            }
            None => DirectoryOrder::new(dedup(live.children.iter())),
        };
        result.insert(dir.clone(), merged);
    }

    result
}

/// Re-derives the custom order from the live tree and the saved order.
///
/// Idempotent: reconciling an already reconciled order against an unchanged
/// tree returns it unchanged.
pub fn reconcile<T: TreeProvider + ?Sized>(
    tree: &T,
    saved: &CustomOrder,
    ignore: &IgnoreSet,
    placement: NewItemPlacement,
) -> CustomOrder {
    let current = snapshot(tree, ignore);
    merge_saved_order(&current, saved, placement)
}

fn dedup<'a>(paths: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .filter(|path| seen.insert(path.as_str()))
        .cloned()
        .collect()
}
