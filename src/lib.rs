//! Manual ordering of a note vault's file explorer.
//!
//! The custom order is a map from directory path to its children in display
//! order, persisted with the rest of the [`Settings`]. [`ManualSorting`]
//! keeps it in step with the vault, and a [`DragSession`] turns pointer input
//! over the explorer into moves.

pub mod config;
pub mod dnd;
pub mod error;
pub mod filesystem;
pub mod logging;
pub mod models;
pub mod mount;
pub mod order;
pub mod paths;
pub mod plugin;
pub mod sync;
pub mod tree;

pub use config::{SaveOutcome, SettingsManager};
pub use dnd::{DragSession, DropInstruction, DropOutcome, ExplorerView};
pub use error::{Error, Result};
pub use filesystem::DiskVault;
pub use models::{CustomOrder, DirectoryOrder, DropPosition, IgnoreSet, NewItemPlacement, Settings};
pub use mount::MountWatcher;
pub use order::OrderStore;
pub use plugin::ManualSorting;
pub use sync::{SyncGuard, SyncMonitor};
pub use tree::{EventSource, MemoryVault, MutationExecutor, TreeEntry, TreeProvider, VaultEvent};
