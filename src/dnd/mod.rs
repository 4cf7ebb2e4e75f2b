//! Pointer-driven reordering of explorer rows.
//!
//! [`DragSession`] turns pointer input into a drop target using
//! [`resolve_drop_target`] over the rows the [`ExplorerView`] reports, and
//! commits the drop through [`ManualSorting`](crate::plugin::ManualSorting).

pub mod commit;
pub mod resolver;
pub mod session;
pub mod view;

pub use commit::CommittedMove;
pub use resolver::{resolve_drop_target, DropInstruction, DropTarget, ItemBox};
pub use session::{DragConfig, DragItem, DragPhase, DragSession, DropOutcome, PointerKind};
pub use view::{DropIndicator, ExplorerView, Point, Rect};
