use crate::dnd::resolver::ItemBox;
use crate::models::DropPosition;

/// Pointer position in explorer coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Edges count as inside
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// What the explorer should highlight for the current drop target
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndicator {
    /// Row the item would be dropped next to
    pub path: String,
    pub position: DropPosition,
    /// Folder that would receive the item
    pub drop_dir: String,
    /// Expanded empty folder that needs a placeholder row so it can be
    /// targeted
    pub placeholder_for: Option<String>,
}

/// Rendered file explorer, as seen by a drag session.
///
/// Implemented by the host's view layer. The session only reads geometry and
/// issues display commands; it never touches the vault through this trait.
pub trait ExplorerView {
    /// Visible area of the explorer
    fn bounds(&self) -> Rect;

    /// Visible rows in document order
    fn item_boxes(&self) -> Vec<ItemBox>;

    fn is_collapsed(&self, path: &str) -> bool;

    fn set_collapsed(&mut self, path: &str, collapsed: bool);

    fn scroll_by(&mut self, delta: f64);

    /// Marks `path` as being dragged, or clears the mark with `None`
    fn set_drag_source(&mut self, path: Option<&str>);

    fn show_drop_indicator(&mut self, indicator: &DropIndicator);

    /// Removes indicators and placeholder rows
    fn clear_drop_indicators(&mut self);

    /// Selected paths in document order
    fn selected_paths(&self) -> Vec<String>;

    /// Re-sorts the explorer from the current custom order
    fn request_resort(&mut self);
}
