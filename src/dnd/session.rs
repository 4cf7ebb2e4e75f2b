//! Drag state machine: `Idle -> Armed -> Dragging -> Idle`.
//!
//! The session never schedules anything itself. The host forwards pointer
//! events, calls [`DragSession::on_frame`] once per animation frame while it
//! returns `true`, and finishes with [`DragSession::drop`] or
//! [`DragSession::cancel`]. Timers (folder auto-expand, auto-scroll) are
//! deadlines checked on those frames, so leaving `Dragging` clears them.

use std::time::{Duration, Instant};

use crate::dnd::resolver::{resolve_drop_target, DropInstruction, ItemBox};
use crate::dnd::view::{DropIndicator, ExplorerView, Point, Rect};
use crate::paths;
use crate::plugin::ManualSorting;
use crate::tree::{MutationExecutor, TreeProvider};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    /// Pointer travel before a pressed row starts dragging
    pub start_threshold: f64,
    /// Height of the bands at the top and bottom edge that auto-scroll
    pub scroll_zone: f64,
    /// Auto-scroll distance per frame
    pub scroll_speed: f64,
    /// Hover time before a collapsed folder under the pointer expands
    pub expand_delay: Duration,
    /// Width of the drag handle at the right edge of a row on touch screens
    pub touch_handle_width: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            start_threshold: 4.0,
            scroll_zone: 50.0,
            scroll_speed: 5.0,
            expand_delay: Duration::from_millis(800),
            touch_handle_width: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Row picked up by the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct DragItem {
    pub path: String,
    pub is_folder: bool,
    /// Right edge of the row, used to locate the touch drag handle
    pub row_right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
}

/// Result of [`DragSession::drop`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No drag was running, the pointer was outside the explorer or no row
    /// was targeted
    Cancelled,
    /// The dragged item disappeared while it was being dragged
    SourceMissing,
    /// Dropped where it already was, or every move failed
    Unchanged,
    /// New paths of the moved items
    Moved { paths: Vec<String> },
}

#[derive(Debug)]
struct PendingExpand {
    path: String,
    due: Instant,
}

#[derive(Debug)]
struct ActiveDrag {
    item: DragItem,
    /// Latest pointer position not yet handled by a frame
    pointer: Option<Point>,
    frame_requested: bool,
    source_marked: bool,
    outside: bool,
    target: Option<DropInstruction>,
    expand: Option<PendingExpand>,
    scroll: Option<f64>,
}

impl ActiveDrag {
    fn new(item: DragItem, pointer: Option<Point>) -> Self {
        log::info!("Drag started: '{}'", item.path);
        Self {
            item,
            pointer,
            frame_requested: pointer.is_some(),
            source_marked: false,
            outside: false,
            target: None,
            expand: None,
            scroll: None,
        }
    }

    /// Rows inside the dragged folder can't be targeted
    fn is_inside_dragged(&self, row: &ItemBox) -> bool {
        paths::is_descendant(&row.path, &self.item.path)
            || (row.is_placeholder && row.path == self.item.path)
    }

    fn track_pointer(
        &mut self,
        view: &mut dyn ExplorerView,
        point: Point,
        now: Instant,
        config: &DragConfig,
    ) {
        let bounds = view.bounds();
        if !bounds.contains(point) {
            if !self.outside {
                log::debug!("Pointer left the explorer");
            }
            self.outside = true;
            self.target = None;
            self.expand = None;
            self.scroll = None;
            view.clear_drop_indicators();
            return;
        }
        self.outside = false;

        if self.item.is_folder && !view.is_collapsed(&self.item.path) {
            view.set_collapsed(&self.item.path, true);
        }

        let rows: Vec<ItemBox> = view
            .item_boxes()
            .into_iter()
            .filter(|row| !self.is_inside_dragged(row))
            .collect();

        match resolve_drop_target(&rows, point.y) {
            Some(target) => {
                let row = &rows[target.index];
                let instruction = DropInstruction::new(row, target.position);
                let needs_placeholder = row.is_folder
                    && !row.is_placeholder
                    && !row.is_collapsed
                    && row.has_empty_children;
                view.show_drop_indicator(&DropIndicator {
                    path: row.path.clone(),
                    position: target.position,
                    drop_dir: instruction.parent_dir.clone(),
                    placeholder_for: needs_placeholder.then(|| row.path.clone()),
                });
                self.update_expand(row, now, config);
                self.target = Some(instruction);
            }
            None => {
                self.target = None;
                self.expand = None;
                view.clear_drop_indicators();
            }
        }

        self.update_scroll(point, bounds, config);
    }

    /// Arms the expand timer for a collapsed folder under the pointer. The
    /// timer keeps running while the target stays the same.
    fn update_expand(&mut self, row: &ItemBox, now: Instant, config: &DragConfig) {
        let expandable = row.is_folder
            && !row.is_placeholder
            && row.is_collapsed
            && row.path != self.item.path;
        if !expandable {
            self.expand = None;
            return;
        }
        if self.expand.as_ref().is_some_and(|pending| pending.path == row.path) {
            return;
        }
        log::debug!("Expanding '{}' in {:?} unless the target changes", row.path, config.expand_delay);
        self.expand = Some(PendingExpand {
            path: row.path.clone(),
            due: now + config.expand_delay,
        });
    }

    fn update_scroll(&mut self, point: Point, bounds: Rect, config: &DragConfig) {
        let top_dist = point.y - bounds.top;
        let bottom_dist = bounds.bottom - point.y;
        if top_dist < config.scroll_zone {
            self.scroll = Some(-config.scroll_speed);
        } else if bottom_dist < config.scroll_zone {
            self.scroll = Some(config.scroll_speed);
        } else {
            self.scroll = None;
        }
    }

    fn fire_expand(&mut self, view: &mut dyn ExplorerView, now: Instant) {
        let due = self.expand.as_ref().is_some_and(|pending| now >= pending.due);
        if !due {
            return;
        }
        if let Some(pending) = self.expand.take() {
            log::info!("Expanding '{}' after hovering", pending.path);
            view.set_collapsed(&pending.path, false);
        }
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Armed { item: DragItem, origin: Point },
    Dragging(ActiveDrag),
}

/// One pointer drag over the file explorer
#[derive(Debug)]
pub struct DragSession {
    config: DragConfig,
    enabled: bool,
    state: State,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl DragSession {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            enabled: true,
            state: State::Idle,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Enables or disables starting new drags. A running drag is unaffected.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            State::Idle => DragPhase::Idle,
            State::Armed { .. } => DragPhase::Armed,
            State::Dragging(_) => DragPhase::Dragging,
        }
    }

    /// Drop position for the pointer's last handled location
    pub fn target(&self) -> Option<&DropInstruction> {
        match &self.state {
            State::Dragging(drag) => drag.target.as_ref(),
            _ => None,
        }
    }

    /// Folder waiting to auto-expand
    pub fn pending_expand(&self) -> Option<&str> {
        match &self.state {
            State::Dragging(drag) => drag.expand.as_ref().map(|pending| pending.path.as_str()),
            _ => None,
        }
    }

    /// Current auto-scroll step, negative when scrolling up
    pub fn auto_scroll(&self) -> Option<f64> {
        match &self.state {
            State::Dragging(drag) => drag.scroll,
            _ => None,
        }
    }

    /// Presses a row.
    ///
    /// Mouse presses arm the session and start dragging after the pointer
    /// moved past the start threshold. Touch presses only count on the drag
    /// handle at the right edge of the row and start dragging right away.
    ///
    /// # Returns
    /// `true` if the press was accepted
    pub fn pointer_down(&mut self, item: DragItem, point: Point, kind: PointerKind) -> bool {
        if !self.enabled {
            return false;
        }
        if !matches!(self.state, State::Idle) {
            log::warn!("Pointer down while a drag is in progress, ignoring");
            return false;
        }

        match kind {
            PointerKind::Touch => {
                if item.row_right - point.x > self.config.touch_handle_width {
                    return false;
                }
                self.state = State::Dragging(ActiveDrag::new(item, Some(point)));
            }
            PointerKind::Mouse => {
                self.state = State::Armed {
                    item,
                    origin: point,
                };
            }
        }
        true
    }

    /// Records a pointer move.
    ///
    /// While dragging, only the latest position is kept until the next
    /// frame handles it.
    ///
    /// # Returns
    /// `true` if the host should request an animation frame
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let started = match &self.state {
            State::Armed { item, origin } if origin.distance(&point) >= self.config.start_threshold => {
                Some(item.clone())
            }
            _ => None,
        };
        if let Some(item) = started {
            self.state = State::Dragging(ActiveDrag::new(item, Some(point)));
            return true;
        }

        match &mut self.state {
            State::Dragging(drag) => {
                drag.pointer = Some(point);
                if drag.frame_requested {
                    false
                } else {
                    drag.frame_requested = true;
                    true
                }
            }
            _ => false,
        }
    }

    /// Starts dragging an armed row without waiting for the threshold
    pub fn start_drag(&mut self) -> bool {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Armed { item, .. } => {
                self.state = State::Dragging(ActiveDrag::new(item, None));
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Handles one animation frame.
    ///
    /// Processes the pending pointer position, then fires the expand timer
    /// if it is due and performs one auto-scroll step.
    ///
    /// # Returns
    /// `true` if another frame is needed for timers or scrolling
    pub fn on_frame(&mut self, view: &mut dyn ExplorerView, now: Instant) -> bool {
        let config = self.config;
        let State::Dragging(drag) = &mut self.state else {
            return false;
        };
        drag.frame_requested = false;

        if !drag.source_marked {
            view.set_drag_source(Some(&drag.item.path));
            drag.source_marked = true;
        }
        if let Some(point) = drag.pointer.take() {
            drag.track_pointer(view, point, now, &config);
        }
        drag.fire_expand(view, now);
        if let Some(step) = drag.scroll {
            view.scroll_by(step);
        }

        drag.scroll.is_some() || drag.expand.is_some()
    }

    /// Releases the pointer and commits the move.
    ///
    /// Indicators and timers are cleared whatever the outcome. The order is
    /// reconciled before committing, so the drop works on the current tree.
    pub fn drop<V>(
        &mut self,
        view: &mut dyn ExplorerView,
        sorting: &mut ManualSorting<V>,
    ) -> DropOutcome
    where
        V: TreeProvider + MutationExecutor,
    {
        let mut drag = match std::mem::replace(&mut self.state, State::Idle) {
            State::Dragging(drag) => drag,
            State::Idle | State::Armed { .. } => return DropOutcome::Cancelled,
        };
        if let Some(point) = drag.pointer.take() {
            drag.track_pointer(view, point, Instant::now(), &self.config);
        }
        Self::cleanup(view);

        if drag.outside {
            log::info!("Dropped outside the explorer, cancelling");
            return DropOutcome::Cancelled;
        }
        let Some(instruction) = drag.target else {
            log::info!("No drop target, cancelling");
            return DropOutcome::Cancelled;
        };

        sorting.reconcile_order();
        let Some(source) = sorting.vault().resolve(&drag.item.path) else {
            log::warn!("Dragged item '{}' no longer exists", drag.item.path);
            return DropOutcome::SourceMissing;
        };

        let selected = view.selected_paths();
        let moves = if selected.iter().any(|path| *path == source.path) {
            sorting.move_selected_items(&selected, &instruction)
        } else {
            match sorting.move_item(&source, &instruction) {
                Ok(committed) => vec![committed],
                Err(e) => {
                    log::warn!("Failed to move '{}': {}", source.path, e);
                    Vec::new()
                }
            }
        };

        if moves.iter().any(|committed| committed.resort_required()) {
            view.request_resort();
        }
        let paths: Vec<String> = moves
            .into_iter()
            .filter(|committed| committed.is_moved())
            .map(|committed| committed.target)
            .collect();
        if paths.is_empty() {
            DropOutcome::Unchanged
        } else {
            DropOutcome::Moved { paths }
        }
    }

    /// Aborts the drag without touching the vault or the order
    pub fn cancel(&mut self, view: &mut dyn ExplorerView) {
        if let State::Dragging(drag) = std::mem::replace(&mut self.state, State::Idle) {
            log::info!("Drag of '{}' cancelled", drag.item.path);
            Self::cleanup(view);
        }
    }

    fn cleanup(view: &mut dyn ExplorerView) {
        view.clear_drop_indicators();
        view.set_drag_source(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::Rect;
    use crate::models::DropPosition;
    use crate::plugin::tests::{sorting_for, RecordingView};
    use crate::tree::MemoryVault;

    fn file_item(path: &str) -> DragItem {
        DragItem {
            path: path.to_string(),
            is_folder: false,
            row_right: 200.0,
        }
    }

    /// Rows of a root holding `a.md`, `b.md`, `c.md`
    fn flat_view() -> RecordingView {
        RecordingView {
            boxes: vec![
                ItemBox::file("a.md", 100.0, 120.0).first_child(),
                ItemBox::file("b.md", 120.0, 140.0),
                ItemBox::file("c.md", 140.0, 160.0),
            ],
            ..RecordingView::default()
        }
    }

    fn start_mouse_drag(session: &mut DragSession, path: &str) {
        assert!(session.pointer_down(file_item(path), Point::new(50.0, 150.0), PointerKind::Mouse));
        assert_eq!(session.phase(), DragPhase::Armed);
    }

    #[test]
    fn test_mouse_drag_needs_threshold() {
        let mut session = DragSession::default();
        start_mouse_drag(&mut session, "c.md");

        assert!(!session.pointer_move(Point::new(52.0, 151.0)));
        assert_eq!(session.phase(), DragPhase::Armed);
        assert!(session.pointer_move(Point::new(50.0, 145.0)));
        assert_eq!(session.phase(), DragPhase::Dragging);
    }

    #[test]
    fn test_touch_only_starts_on_handle() {
        let mut session = DragSession::default();
        assert!(!session.pointer_down(file_item("a.md"), Point::new(100.0, 110.0), PointerKind::Touch));
        assert_eq!(session.phase(), DragPhase::Idle);

        assert!(session.pointer_down(file_item("a.md"), Point::new(190.0, 110.0), PointerKind::Touch));
        assert_eq!(session.phase(), DragPhase::Dragging);
    }

    #[test]
    fn test_disabled_session_ignores_presses() {
        let mut session = DragSession::default();
        session.set_enabled(false);
        assert!(!session.pointer_down(file_item("a.md"), Point::new(50.0, 110.0), PointerKind::Mouse));
        assert!(!session.start_drag());
    }

    #[test]
    fn test_pointer_moves_coalesce_per_frame() {
        let mut session = DragSession::default();
        let mut view = flat_view();
        start_mouse_drag(&mut session, "c.md");
        assert!(session.pointer_move(Point::new(50.0, 130.0)));

        // the frame is already requested, later moves only replace the point
        assert!(!session.pointer_move(Point::new(50.0, 125.0)));
        assert!(!session.pointer_move(Point::new(50.0, 118.0)));

        session.on_frame(&mut view, Instant::now());
        assert_eq!(
            session.target(),
            Some(&DropInstruction {
                parent_dir: "/".to_string(),
                sibling: Some("a.md".to_string()),
                position: DropPosition::After,
            })
        );
        assert_eq!(view.drag_source.as_deref(), Some("c.md"));
        assert!(session.pointer_move(Point::new(50.0, 102.0)));
    }

    #[test]
    fn test_drop_reorders_within_directory() {
        let (mut sorting, _dir) = sorting_for(&["a.md", "b.md", "c.md"]);
        let mut session = DragSession::default();
        let mut view = flat_view();

        start_mouse_drag(&mut session, "c.md");
        session.pointer_move(Point::new(50.0, 102.0));
        session.on_frame(&mut view, Instant::now());

        let outcome = session.drop(&mut view, &mut sorting);
        assert_eq!(
            outcome,
            DropOutcome::Moved {
                paths: vec!["c.md".to_string()]
            }
        );
        assert_eq!(sorting.settings().custom_order["/"].children, vec!["c.md", "a.md", "b.md"]);
        assert_eq!(view.resorts, 1);
        assert_eq!(view.indicator, None);
        assert_eq!(view.drag_source, None);
        assert_eq!(session.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_drop_outside_cancels() {
        let (mut sorting, _dir) = sorting_for(&["a.md", "b.md", "c.md"]);
        let before = sorting.settings().custom_order.clone();
        let mut session = DragSession::default();
        let mut view = flat_view();

        start_mouse_drag(&mut session, "c.md");
        session.pointer_move(Point::new(50.0, 102.0));
        session.on_frame(&mut view, Instant::now());
        assert!(view.indicator.is_some());

        session.pointer_move(Point::new(500.0, 102.0));
        session.on_frame(&mut view, Instant::now());
        assert!(view.indicator.is_none());
        assert_eq!(session.target(), None);

        assert_eq!(session.drop(&mut view, &mut sorting), DropOutcome::Cancelled);
        assert_eq!(sorting.settings().custom_order, before);
    }

    #[test]
    fn test_drop_of_vanished_source() {
        let (mut sorting, _dir) = sorting_for(&["a.md", "b.md", "c.md"]);
        let mut session = DragSession::default();
        let mut view = flat_view();

        start_mouse_drag(&mut session, "c.md");
        session.pointer_move(Point::new(50.0, 102.0));
        session.on_frame(&mut view, Instant::now());
        sorting.vault_mut().delete("c.md").unwrap();

        assert_eq!(session.drop(&mut view, &mut sorting), DropOutcome::SourceMissing);
        assert_eq!(sorting.settings().custom_order["/"].children, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_cancel_clears_everything() {
        let mut session = DragSession::default();
        let mut view = flat_view();
        start_mouse_drag(&mut session, "c.md");
        session.pointer_move(Point::new(50.0, 102.0));
        session.on_frame(&mut view, Instant::now());

        session.cancel(&mut view);
        assert_eq!(session.phase(), DragPhase::Idle);
        assert_eq!(view.indicator, None);
        assert_eq!(view.drag_source, None);
        assert!(!session.on_frame(&mut view, Instant::now()));
    }

    #[test]
    fn test_collapsed_folder_expands_after_dwell() {
        let mut session = DragSession::default();
        let mut view = RecordingView {
            boxes: vec![
                ItemBox::folder("f", 100.0, 120.0).first_child(),
                ItemBox::file("g.md", 120.0, 140.0),
            ],
            ..RecordingView::default()
        };
        let start = Instant::now();

        start_mouse_drag(&mut session, "g.md");
        session.pointer_move(Point::new(50.0, 118.0));
        assert!(session.on_frame(&mut view, start));
        assert_eq!(session.pending_expand(), Some("f"));

        // staying on the same folder keeps the first deadline
        session.pointer_move(Point::new(50.0, 119.0));
        assert!(session.on_frame(&mut view, start + Duration::from_millis(500)));
        assert!(view.expanded.is_empty());

        assert!(!session.on_frame(&mut view, start + Duration::from_millis(800)));
        assert_eq!(view.expanded, vec!["f"]);
        assert_eq!(session.pending_expand(), None);
    }

    #[test]
    fn test_changing_target_resets_expand_timer() {
        let mut session = DragSession::default();
        let mut view = RecordingView {
            boxes: vec![
                ItemBox::folder("f", 100.0, 120.0).first_child(),
                ItemBox::file("g.md", 120.0, 140.0),
            ],
            ..RecordingView::default()
        };
        let start = Instant::now();

        start_mouse_drag(&mut session, "g.md");
        session.pointer_move(Point::new(50.0, 118.0));
        session.on_frame(&mut view, start);
        session.pointer_move(Point::new(50.0, 139.0));
        session.on_frame(&mut view, start + Duration::from_millis(400));
        assert_eq!(session.pending_expand(), None);

        session.on_frame(&mut view, start + Duration::from_millis(900));
        assert!(view.expanded.is_empty());
    }

    #[test]
    fn test_dragged_folder_collapses_and_hides_its_rows() {
        let mut session = DragSession::default();
        let mut view = RecordingView {
            boxes: vec![
                ItemBox::folder("f", 100.0, 140.0).first_child().expanded(false),
                ItemBox::file("f/inner.md", 120.0, 140.0).first_child().last_nested_child(),
                ItemBox::file("z.md", 140.0, 160.0),
            ],
            expanded: vec!["f".to_string()],
            ..RecordingView::default()
        };
        let item = DragItem {
            path: "f".to_string(),
            is_folder: true,
            row_right: 200.0,
        };

        assert!(session.pointer_down(item, Point::new(50.0, 110.0), PointerKind::Mouse));
        session.pointer_move(Point::new(50.0, 125.0));
        session.on_frame(&mut view, Instant::now());

        assert_eq!(view.collapsed, vec!["f"]);
        let target = session.target().unwrap();
        assert_ne!(target.sibling.as_deref(), Some("f/inner.md"));
    }

    #[test]
    fn test_expanded_empty_folder_requests_placeholder() {
        let mut session = DragSession::default();
        let mut view = RecordingView {
            boxes: vec![
                ItemBox::folder("empty", 100.0, 120.0).first_child().expanded(true),
                ItemBox::file("z.md", 120.0, 140.0),
            ],
            ..RecordingView::default()
        };

        start_mouse_drag(&mut session, "z.md");
        session.pointer_move(Point::new(50.0, 118.0));
        session.on_frame(&mut view, Instant::now());

        let indicator = view.indicator.clone().unwrap();
        assert_eq!(indicator.path, "empty");
        assert_eq!(indicator.placeholder_for.as_deref(), Some("empty"));
        assert_eq!(session.pending_expand(), None);
    }

    #[test]
    fn test_auto_scroll_near_edges() {
        let mut session = DragSession::default();
        let mut view = RecordingView {
            bounds: Some(Rect::new(0.0, 0.0, 200.0, 400.0)),
            boxes: vec![
                ItemBox::file("a.md", 0.0, 20.0).first_child(),
                ItemBox::file("b.md", 380.0, 400.0),
            ],
            ..RecordingView::default()
        };
        let now = Instant::now();

        start_mouse_drag(&mut session, "a.md");
        session.pointer_move(Point::new(50.0, 390.0));
        assert!(session.on_frame(&mut view, now));
        assert_eq!(session.auto_scroll(), Some(5.0));
        assert!(session.on_frame(&mut view, now));
        assert_eq!(view.scrolled, 10.0);

        // jumping straight to the other band turns the scroll around
        session.pointer_move(Point::new(50.0, 10.0));
        session.on_frame(&mut view, now);
        assert_eq!(session.auto_scroll(), Some(-5.0));
        assert_eq!(view.scrolled, 5.0);

        session.pointer_move(Point::new(50.0, 200.0));
        assert!(!session.on_frame(&mut view, now));
        assert_eq!(session.auto_scroll(), None);

        session.pointer_move(Point::new(50.0, 10.0));
        session.on_frame(&mut view, now);
        assert_eq!(session.auto_scroll(), Some(-5.0));
    }

    #[test]
    fn test_drop_multi_selection() {
        let (mut sorting, _dir) = sorting_for(&["a.md", "b.md", "c.md", "d.md"]);
        let mut session = DragSession::default();
        let mut view = RecordingView {
            boxes: vec![
                ItemBox::file("a.md", 100.0, 120.0).first_child(),
                ItemBox::file("b.md", 120.0, 140.0),
                ItemBox::file("c.md", 140.0, 160.0),
                ItemBox::file("d.md", 160.0, 180.0),
            ],
            selected: vec!["b.md".to_string(), "d.md".to_string()],
            ..RecordingView::default()
        };

        start_mouse_drag(&mut session, "d.md");
        session.pointer_move(Point::new(50.0, 102.0));
        session.on_frame(&mut view, Instant::now());
        let outcome = session.drop(&mut view, &mut sorting);

        assert_eq!(
            outcome,
            DropOutcome::Moved {
                paths: vec!["b.md".to_string(), "d.md".to_string()]
            }
        );
        assert_eq!(
            sorting.settings().custom_order["/"].children,
            vec!["b.md", "d.md", "a.md", "c.md"]
        );
    }

    #[test]
    fn test_drop_without_drag_is_cancelled() {
        let mut sorting: ManualSorting<MemoryVault> = sorting_for(&["a.md"]).0;
        let mut session = DragSession::default();
        let mut view = flat_view();
        start_mouse_drag(&mut session, "a.md");
        assert_eq!(session.drop(&mut view, &mut sorting), DropOutcome::Cancelled);
        assert_eq!(session.phase(), DragPhase::Idle);
    }
}
