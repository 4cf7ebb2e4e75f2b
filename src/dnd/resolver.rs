use serde::{Deserialize, Serialize};

use crate::models::DropPosition;
use crate::paths;

/// Nudge applied to the bottom edge of the last item inside an expanded
/// folder, so the folder's own bottom edge wins a tie at the same height.
const NESTED_BOTTOM_EPSILON: f64 = 0.01;

/// Screen box of one visible explorer row.
///
/// `top` and `bottom` span the whole item, including the children of an
/// expanded folder.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemBox {
    pub path: String,
    pub is_folder: bool,
    /// Stand-in row inside an expanded empty folder; `path` is the folder
    pub is_placeholder: bool,
    /// First item among its siblings
    pub is_first_child: bool,
    /// Last item inside a nested folder's children
    pub is_last_nested_child: bool,
    pub is_collapsed: bool,
    /// Expanded folder without any children rendered
    pub has_empty_children: bool,
    pub top: f64,
    pub bottom: f64,
}

impl ItemBox {
    pub fn file(path: impl Into<String>, top: f64, bottom: f64) -> Self {
        Self {
            path: path.into(),
            is_folder: false,
            is_placeholder: false,
            is_first_child: false,
            is_last_nested_child: false,
            is_collapsed: false,
            has_empty_children: false,
            top,
            bottom,
        }
    }

    pub fn folder(path: impl Into<String>, top: f64, bottom: f64) -> Self {
        Self {
            is_folder: true,
            is_collapsed: true,
            ..Self::file(path, top, bottom)
        }
    }

    /// Placeholder row for dropping into the empty folder `folder`
    pub fn placeholder(folder: impl Into<String>, top: f64, bottom: f64) -> Self {
        Self {
            is_placeholder: true,
            is_first_child: true,
            is_last_nested_child: true,
            ..Self::file(folder, top, bottom)
        }
    }

    pub fn first_child(mut self) -> Self {
        self.is_first_child = true;
        self
    }

    pub fn last_nested_child(mut self) -> Self {
        self.is_last_nested_child = true;
        self
    }

    pub fn expanded(mut self, has_empty_children: bool) -> Self {
        self.is_collapsed = false;
        self.has_empty_children = has_empty_children;
        self
    }

    /// Folder that would receive an item dropped next to this box
    pub fn drop_dir(&self) -> &str {
        if self.is_placeholder {
            &self.path
        } else {
            paths::parent_dir(&self.path)
        }
    }
}

/// Row and side chosen for the current pointer position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub index: usize,
    pub position: DropPosition,
}

/// Where a dropped item ends up, detached from the rendered rows
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DropInstruction {
    pub parent_dir: String,
    /// Item to drop next to; `None` drops into an empty folder
    pub sibling: Option<String>,
    pub position: DropPosition,
}

impl DropInstruction {
    pub fn new(target: &ItemBox, position: DropPosition) -> Self {
        Self {
            parent_dir: target.drop_dir().to_string(),
            sibling: (!target.is_placeholder).then(|| target.path.clone()),
            position,
        }
    }
}

/// Picks the row edge nearest to `pointer_y`.
///
/// Bottom edges are candidates for every non-placeholder row; top edges only
/// for rows that come first among their siblings, since any other top edge
/// coincides with the previous row's bottom. Ties keep the earlier
/// candidate.
///
/// # Returns
/// `None` when no rows are visible
pub fn resolve_drop_target(boxes: &[ItemBox], pointer_y: f64) -> Option<DropTarget> {
    let first = boxes.first()?;
    let mut best = DropTarget {
        index: 0,
        position: if first.is_first_child {
            DropPosition::Before
        } else {
            DropPosition::After
        },
    };

    for (index, item) in boxes.iter().enumerate() {
        let current = &boxes[best.index];
        let best_edge = match best.position {
            DropPosition::Before => current.top,
            DropPosition::After => current.bottom,
        };
        let best_dist = (best_edge - pointer_y).abs();

        let bottom = if item.is_last_nested_child {
            item.bottom - NESTED_BOTTOM_EPSILON
        } else {
            item.bottom
        };
        let bottom_dist = (bottom - pointer_y).abs();
        if bottom_dist < best_dist && !item.is_placeholder {
            best = DropTarget {
                index,
                position: DropPosition::After,
            };
        }

        if item.is_first_child {
            let top_dist = (item.top - pointer_y).abs();
            if top_dist < best_dist && top_dist < bottom_dist {
                best = DropTarget {
                    index,
                    position: DropPosition::Before,
                };
            }
        }
    }

    Some(best)
}
