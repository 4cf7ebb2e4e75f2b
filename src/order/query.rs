//! Read-only views over the custom order used by the explorer.

use std::collections::{HashMap, HashSet};

use crate::models::{CustomOrder, NewItemPlacement};
use crate::paths::ROOT;
use crate::tree::TreeEntry;

/// Sorts the children of `dir` by their position in the custom order.
///
/// Items the order doesn't know yet keep their relative input order and go
/// to the top or bottom according to `placement`, matching where they will
/// land once the order catches up.
pub fn sort_by_custom_order(
    order: &CustomOrder,
    dir: &str,
    mut items: Vec<TreeEntry>,
    placement: NewItemPlacement,
) -> Vec<TreeEntry> {
    let Some(entry) = order.get(dir) else {
        log::debug!("Directory '{}' has no custom order, keeping native order", dir);
        return items;
    };

    let rank: HashMap<&str, usize> = entry
        .children
        .iter()
        .enumerate()
        .map(|(idx, path)| (path.as_str(), idx))
        .collect();
    let unknown = match placement {
        NewItemPlacement::Top => None,
        NewItemPlacement::Bottom => Some(usize::MAX),
    };

    // stable sort keeps the input order among unknown items
    items.sort_by_key(|item| match rank.get(item.path.as_str()) {
        Some(&idx) => Some(idx),
        None => unknown,
    });
    items
}

/// Every path in the order, depth first in display order.
///
/// Used to resolve shift-click ranges across folders.
pub fn flatten_paths(order: &CustomOrder) -> Vec<String> {
    let mut result = Vec::new();
    let mut visited = HashSet::new();
    let mut pending: Vec<&str> = vec![ROOT];

    while let Some(path) = pending.pop() {
        if path != ROOT {
            result.push(path.to_string());
        }
        let Some(entry) = order.get(path) else {
            continue;
        };
        if !visited.insert(path) {
            continue;
        }
        pending.extend(entry.children.iter().rev().map(String::as_str));
    }

    result
}

/// Paths shown between `start` and `end`, both included, in display order.
///
/// Returns an empty list when either end is not part of the order.
pub fn items_between(order: &CustomOrder, start: &str, end: &str) -> Vec<String> {
    let flat = flatten_paths(order);
    let start_idx = flat.iter().position(|p| p == start);
    let end_idx = flat.iter().position(|p| p == end);

    match (start_idx, end_idx) {
        (Some(a), Some(b)) => {
            let (from, to) = if a <= b { (a, b) } else { (b, a) };
            flat[from..=to].to_vec()
        }
        _ => Vec::new(),
    }
}
