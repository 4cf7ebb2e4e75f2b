//! Adapters between the ordering core and the host's file tree.
//!
//! The core never walks the file system or the explorer view itself. It asks
//! a [`TreeProvider`] for directory listings in the host's native order and
//! asks a [`MutationExecutor`] to rename or move items. [`MemoryVault`] is a
//! complete in-memory implementation of both, used by hosts that mirror their
//! tree and by the test suite.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::paths::{self, ROOT};

/// One node of the live tree
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    pub path: String,
    pub is_dir: bool,
}

impl TreeEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }

    /// Last path segment, including the extension
    pub fn name(&self) -> &str {
        paths::file_name(&self.path)
    }

    /// Extension of a file; folders never have one
    pub fn extension(&self) -> Option<&str> {
        if self.is_dir {
            None
        } else {
            paths::split_extension(self.name()).1
        }
    }
}

/// Storage lifecycle notification, fired whatever caused the change
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VaultEvent {
    Created { path: String, is_dir: bool },
    Deleted { path: String },
    Renamed { old_path: String, new_path: String, is_dir: bool },
}

/// Read access to the live tree
pub trait TreeProvider {
    /// Immediate children of `dir` in the host's native order
    fn list_children(&self, dir: &str) -> Vec<TreeEntry>;

    /// Looks up a single node
    fn resolve(&self, path: &str) -> Option<TreeEntry>;

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }
}

/// Rename/move capability of the host
pub trait MutationExecutor {
    /// Moves `entry` to `new_path`. Calling it with an unchanged path is a no-op.
    fn rename(&mut self, entry: &TreeEntry, new_path: &str) -> Result<()>;
}

/// Source of the storage events caused by mutations
pub trait EventSource {
    /// Drains the events recorded since the last call
    fn take_events(&mut self) -> Vec<VaultEvent>;
}

/// Native explorer order: folders first, then names compared case-insensitively.
pub fn native_order(a: &TreeEntry, b: &TreeEntry) -> std::cmp::Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        .then_with(|| a.name().cmp(b.name()))
}

/// In-memory vault: a flat map of path -> is_dir.
///
/// Mutations are recorded as [`VaultEvent`]s which the owner drains with
/// [`EventSource::take_events`] and feeds back into the order tracker, the
/// same way a host forwards its own vault notifications.
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    nodes: BTreeMap<String, bool>,
    events: Vec<VaultEvent>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a vault from paths; a trailing `/` marks a folder.
    ///
    /// Missing parent folders are created implicitly.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut vault = Self::new();
        for path in paths {
            let (path, is_dir) = match path.strip_suffix('/') {
                Some(folder) => (folder, true),
                None => (path, false),
            };
            vault.insert_with_parents(path, is_dir);
        }
        vault
    }

    fn insert_with_parents(&mut self, path: &str, is_dir: bool) {
        for ancestor in paths::ancestors(path) {
            self.nodes.entry(ancestor.to_string()).or_insert(true);
        }
        self.nodes.insert(path.to_string(), is_dir);
    }

    fn check_parent(&self, path: &str) -> Result<()> {
        let parent = paths::parent_dir(path);
        if parent == ROOT || self.nodes.get(parent) == Some(&true) {
            Ok(())
        } else {
            Err(Error::InvalidPath(format!(
                "parent folder '{}' of '{}' does not exist",
                parent, path
            )))
        }
    }

    pub fn create_file(&mut self, path: &str) -> Result<()> {
        self.create(path, false)
    }

    pub fn create_folder(&mut self, path: &str) -> Result<()> {
        self.create(path, true)
    }

    fn create(&mut self, path: &str, is_dir: bool) -> Result<()> {
        if self.nodes.contains_key(path) {
            return Err(Error::NameCollision(path.to_string()));
        }
        self.check_parent(path)?;
        self.nodes.insert(path.to_string(), is_dir);
        self.events.push(VaultEvent::Created {
            path: path.to_string(),
            is_dir,
        });
        Ok(())
    }

    /// Deletes a node and, for folders, everything below it
    pub fn delete(&mut self, path: &str) -> Result<()> {
        if self.nodes.remove(path).is_none() {
            return Err(Error::StaleReference(path.to_string()));
        }
        self.nodes.retain(|p, _| !paths::is_descendant(p, path));
        self.events.push(VaultEvent::Deleted {
            path: path.to_string(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl EventSource for MemoryVault {
    fn take_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }
}

impl TreeProvider for MemoryVault {
    fn list_children(&self, dir: &str) -> Vec<TreeEntry> {
        let mut children: Vec<TreeEntry> = self
            .nodes
            .iter()
            .filter(|(path, _)| paths::parent_dir(path) == dir && path.as_str() != ROOT)
            .map(|(path, &is_dir)| TreeEntry {
                path: path.clone(),
                is_dir,
            })
            .collect();
        children.sort_by(native_order);
        children
    }

    fn resolve(&self, path: &str) -> Option<TreeEntry> {
        if path == ROOT {
            return Some(TreeEntry::folder(ROOT));
        }
        self.nodes.get(path).map(|&is_dir| TreeEntry {
            path: path.to_string(),
            is_dir,
        })
    }
}

impl MutationExecutor for MemoryVault {
    fn rename(&mut self, entry: &TreeEntry, new_path: &str) -> Result<()> {
        if entry.path == new_path {
            return Ok(());
        }
        if !self.nodes.contains_key(&entry.path) {
            return Err(Error::StaleReference(entry.path.clone()));
        }
        if self.nodes.contains_key(new_path) {
            return Err(Error::NameCollision(new_path.to_string()));
        }
        if paths::is_descendant(new_path, &entry.path) {
            return Err(Error::InvalidPath(format!(
                "cannot move '{}' into itself",
                entry.path
            )));
        }
        self.check_parent(new_path)?;

        let moved: Vec<(String, bool)> = self
            .nodes
            .iter()
            .filter(|(path, _)| paths::is_same_or_descendant(path, &entry.path))
            .map(|(path, &is_dir)| (path.clone(), is_dir))
            .collect();
        for (path, is_dir) in moved {
            self.nodes.remove(&path);
            if let Some(renamed) = paths::replace_prefix(&path, &entry.path, new_path) {
                self.nodes.insert(renamed, is_dir);
            }
        }

        self.events.push(VaultEvent::Renamed {
            old_path: entry.path.clone(),
            new_path: new_path.to_string(),
            is_dir: entry.is_dir,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_of(entries: &[TreeEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_native_order_folders_first() {
        let vault = MemoryVault::from_paths(["b.md", "A.md", "zeta/", "alpha/x.md"]);
        let root = vault.list_children("/");
        assert_eq!(paths_of(&root), vec!["alpha", "zeta", "A.md", "b.md"]);
        assert_eq!(paths_of(&vault.list_children("alpha")), vec!["alpha/x.md"]);
    }

    #[test]
    fn test_tree_entry_name_and_extension() {
        let file = TreeEntry::file("notes/today.md");
        assert_eq!(file.name(), "today.md");
        assert_eq!(file.extension(), Some("md"));

        let folder = TreeEntry::folder("notes/v1.2");
        assert_eq!(folder.extension(), None);
    }

    #[test]
    fn test_rename_moves_subtree_and_records_event() {
        let mut vault = MemoryVault::from_paths(["a/c.md", "a/d/e.md", "ab/x.md"]);
        vault.rename(&TreeEntry::folder("a"), "b").unwrap();

        assert!(vault.exists("b/c.md"));
        assert!(vault.exists("b/d/e.md"));
        assert!(vault.exists("ab/x.md"));
        assert!(!vault.exists("a"));
        assert_eq!(
            vault.take_events(),
            vec![VaultEvent::Renamed {
                old_path: "a".to_string(),
                new_path: "b".to_string(),
                is_dir: true,
            }]
        );
    }

    #[test]
    fn test_rename_rejects_collision_and_self_nesting() {
        let mut vault = MemoryVault::from_paths(["a/", "b.md", "c.md"]);
        assert!(matches!(
            vault.rename(&TreeEntry::file("b.md"), "c.md"),
            Err(Error::NameCollision(_))
        ));
        assert!(matches!(
            vault.rename(&TreeEntry::folder("a"), "a/a"),
            Err(Error::InvalidPath(_))
        ));
        assert!(vault.rename(&TreeEntry::file("b.md"), "b.md").is_ok());
        assert!(vault.take_events().is_empty());
    }

    #[test]
    fn test_create_and_delete_record_events() {
        let mut vault = MemoryVault::from_paths(["folder/"]);
        vault.create_file("folder/new.md").unwrap();
        vault.delete("folder").unwrap();

        assert!(!vault.exists("folder/new.md"));
        assert_eq!(vault.take_events().len(), 2);
        assert!(matches!(vault.create_file("missing/x.md"), Err(Error::InvalidPath(_))));
    }
}
