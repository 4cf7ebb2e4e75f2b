use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::{self, ROOT};
use crate::tree::{native_order, EventSource, MutationExecutor, TreeEntry, TreeProvider, VaultEvent};

/// Maps a vault path onto a file system path below `root`.
///
/// Rejects paths that could leave the vault:
/// - `..` or `.` segments
/// - empty segments (`a//b`)
/// - backslashes
///
/// A single leading `/` is accepted, matching the vault path convention.
/// Existing paths are canonicalized so that symlinks pointing outside of
/// `root` are rejected as well.
///
/// # Arguments
/// * `root` - Vault directory on disk
/// * `vault_path` - `/`-separated vault path, or [`ROOT`]
///
/// # Returns
/// * `Ok(PathBuf)` - The resolved path
/// * `Err(Error::InvalidPath)` - If validation fails
pub fn validate_path(root: &Path, vault_path: &str) -> Result<PathBuf> {
    if vault_path == ROOT {
        return Ok(root.to_path_buf());
    }
    if vault_path.contains('\\') {
        return Err(Error::InvalidPath(format!(
            "'{}' contains invalid separator '\\'",
            vault_path
        )));
    }

    let relative = vault_path.strip_prefix('/').unwrap_or(vault_path);
    let mut full_path = root.to_path_buf();
    for segment in relative.split('/') {
        match segment {
            "" => {
                return Err(Error::InvalidPath(format!(
                    "'{}' contains an empty segment",
                    vault_path
                )))
            }
            "." | ".." => {
                return Err(Error::InvalidPath(format!(
                    "'{}' contains invalid traversal pattern '{}'",
                    vault_path, segment
                )))
            }
            _ => full_path.push(segment),
        }
    }

    if full_path.exists() {
        let canonical_root = root.canonicalize()?;
        if !full_path.canonicalize()?.starts_with(&canonical_root) {
            return Err(Error::InvalidPath(format!(
                "'{}' resolves outside of the vault",
                vault_path
            )));
        }
    }
    Ok(full_path)
}

/// Vault over a directory on disk.
///
/// Hidden entries (names starting with `.`) are not part of the vault.
/// Mutations performed through this type are recorded as [`VaultEvent`]s;
/// changes made by other processes are not observed.
#[derive(Debug)]
pub struct DiskVault {
    root: PathBuf,
    events: Vec<VaultEvent>,
}

impl DiskVault {
    /// Opens the vault at `root`, creating the directory if necessary.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::info!("Opened vault at {:?}", root);
        Ok(Self {
            root,
            events: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File system path of a vault path
    pub fn full_path(&self, vault_path: &str) -> Result<PathBuf> {
        validate_path(&self.root, vault_path)
    }

    pub fn create_file(&mut self, path: &str) -> Result<()> {
        let full_path = self.prepare_new(path)?;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .map_err(|e| collision_or_io(e, path))?;
        self.record_created(path, false);
        Ok(())
    }

    pub fn create_folder(&mut self, path: &str) -> Result<()> {
        let full_path = self.prepare_new(path)?;
        fs::create_dir(&full_path).map_err(|e| collision_or_io(e, path))?;
        self.record_created(path, true);
        Ok(())
    }

    /// Deletes a file, or a folder with everything below it
    pub fn delete(&mut self, path: &str) -> Result<()> {
        let entry = self
            .resolve(path)
            .ok_or_else(|| Error::StaleReference(path.to_string()))?;
        if entry.path == ROOT {
            return Err(Error::InvalidPath("cannot delete the vault root".to_string()));
        }
        let full_path = self.full_path(path)?;
        if entry.is_dir {
            fs::remove_dir_all(&full_path)?;
        } else {
            fs::remove_file(&full_path)?;
        }
        log::info!("Deleted '{}'", path);
        self.events.push(VaultEvent::Deleted {
            path: path.to_string(),
        });
        Ok(())
    }

    /// Validates `path` for a new item and checks that its parent folder exists
    fn prepare_new(&self, path: &str) -> Result<PathBuf> {
        if path == ROOT {
            return Err(Error::InvalidPath("the vault root already exists".to_string()));
        }
        let full_path = self.full_path(path)?;
        self.check_parent(path)?;
        Ok(full_path)
    }

    fn check_parent(&self, path: &str) -> Result<()> {
        let parent = paths::parent_dir(path);
        match self.resolve(parent) {
            Some(entry) if entry.is_dir => Ok(()),
            _ => Err(Error::InvalidPath(format!(
                "parent folder '{}' of '{}' does not exist",
                parent, path
            ))),
        }
    }

    fn record_created(&mut self, path: &str, is_dir: bool) {
        log::info!("Created {} '{}'", if is_dir { "folder" } else { "file" }, path);
        self.events.push(VaultEvent::Created {
            path: path.to_string(),
            is_dir,
        });
    }
}

fn collision_or_io(e: io::Error, path: &str) -> Error {
    if e.kind() == io::ErrorKind::AlreadyExists {
        Error::NameCollision(path.to_string())
    } else {
        Error::Io(e)
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

impl TreeProvider for DiskVault {
    fn list_children(&self, dir: &str) -> Vec<TreeEntry> {
        let read_dir = match self
            .full_path(dir)
            .and_then(|p| fs::read_dir(p).map_err(Error::from))
        {
            Ok(read_dir) => read_dir,
            Err(e) => {
                log::warn!("Failed to list '{}': {}", dir, e);
                return Vec::new();
            }
        };

        let mut children: Vec<TreeEntry> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                if is_hidden(&name) {
                    return None;
                }
                let is_dir = entry.file_type().ok()?.is_dir();
                Some(TreeEntry {
                    path: paths::join(dir, &name),
                    is_dir,
                })
            })
            .collect();
        children.sort_by(native_order);
        children
    }

    fn resolve(&self, path: &str) -> Option<TreeEntry> {
        if path != ROOT && paths::file_name(path).starts_with('.') {
            return None;
        }
        let full_path = self.full_path(path).ok()?;
        let metadata = fs::metadata(&full_path).ok()?;
        Some(TreeEntry {
            path: path.to_string(),
            is_dir: metadata.is_dir(),
        })
    }
}

impl MutationExecutor for DiskVault {
    fn rename(&mut self, entry: &TreeEntry, new_path: &str) -> Result<()> {
        if entry.path == new_path {
            return Ok(());
        }
        if self.resolve(&entry.path).is_none() {
            return Err(Error::StaleReference(entry.path.clone()));
        }
        if self.exists(new_path) {
            return Err(Error::NameCollision(new_path.to_string()));
        }
        if paths::is_descendant(new_path, &entry.path) {
            return Err(Error::InvalidPath(format!(
                "cannot move '{}' into itself",
                entry.path
            )));
        }
        let from = self.full_path(&entry.path)?;
        let to = self.full_path(new_path)?;
        self.check_parent(new_path)?;

        fs::rename(&from, &to)?;
        log::info!("Renamed '{}' to '{}'", entry.path, new_path);
        self.events.push(VaultEvent::Renamed {
            old_path: entry.path.clone(),
            new_path: new_path.to_string(),
            is_dir: entry.is_dir,
        });
        Ok(())
    }
}

impl EventSource for DiskVault {
    fn take_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsManager;
    use crate::dnd::DropInstruction;
    use crate::models::{DropPosition, Settings};
    use crate::plugin::ManualSorting;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn vault_with(paths: &[&str]) -> (DiskVault, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let mut vault = DiskVault::new(temp_dir.path().join("vault")).unwrap();
        for path in paths {
            match path.strip_suffix('/') {
                Some(folder) => vault.create_folder(folder).unwrap(),
                None => vault.create_file(path).unwrap(),
            }
        }
        vault.take_events();
        (vault, temp_dir)
    }

    fn paths_of(entries: &[TreeEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_validate_path_accepts_nested_and_root() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        assert_eq!(validate_path(root, "/").unwrap(), root);
        assert!(validate_path(root, "notes/today.md").unwrap().ends_with("notes/today.md"));
        assert!(validate_path(root, "/notes/file.name.md").unwrap().ends_with("file.name.md"));
    }

    #[test]
    fn test_validate_path_rejects_traversal() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        for path in ["..", "a/../b", "./a", "a//b", "a\\b", "a/"] {
            assert!(
                matches!(validate_path(root, path), Err(Error::InvalidPath(_))),
                "'{}' should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_list_children_native_order_without_hidden() {
        let (vault, _dir) = vault_with(&["b.md", "A.md", "zeta/", "alpha/", "alpha/x.md"]);
        fs::write(vault.root().join(".obsidian"), "").unwrap();

        assert_eq!(paths_of(&vault.list_children("/")), vec!["alpha", "zeta", "A.md", "b.md"]);
        assert_eq!(paths_of(&vault.list_children("alpha")), vec!["alpha/x.md"]);
        assert!(vault.list_children("missing").is_empty());
        assert_eq!(vault.resolve(".obsidian"), None);
        assert_eq!(vault.resolve("zeta"), Some(TreeEntry::folder("zeta")));
    }

    #[test]
    fn test_mutations_record_events() {
        let (mut vault, _dir) = vault_with(&[]);
        vault.create_folder("f").unwrap();
        vault.create_file("f/a.md").unwrap();
        vault.rename(&TreeEntry::folder("f"), "g").unwrap();
        vault.delete("g/a.md").unwrap();

        assert!(vault.exists("g"));
        assert!(!vault.exists("f"));
        assert_eq!(
            vault.take_events(),
            vec![
                VaultEvent::Created {
                    path: "f".to_string(),
                    is_dir: true
                },
                VaultEvent::Created {
                    path: "f/a.md".to_string(),
                    is_dir: false
                },
                VaultEvent::Renamed {
                    old_path: "f".to_string(),
                    new_path: "g".to_string(),
                    is_dir: true
                },
                VaultEvent::Deleted {
                    path: "g/a.md".to_string()
                },
            ]
        );
        assert!(vault.take_events().is_empty());
    }

    #[test]
    fn test_rename_errors() {
        let (mut vault, _dir) = vault_with(&["a.md", "b.md", "f/"]);

        assert!(matches!(
            vault.rename(&TreeEntry::file("a.md"), "b.md"),
            Err(Error::NameCollision(_))
        ));
        assert!(matches!(
            vault.rename(&TreeEntry::file("gone.md"), "c.md"),
            Err(Error::StaleReference(_))
        ));
        assert!(matches!(
            vault.rename(&TreeEntry::folder("f"), "f/inner"),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(
            vault.rename(&TreeEntry::file("a.md"), "missing/a.md"),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(vault.create_file("a.md"), Err(Error::NameCollision(_))));
        assert!(vault.rename(&TreeEntry::file("a.md"), "a.md").is_ok());
        assert!(vault.take_events().is_empty());
    }

    #[test]
    fn test_drop_on_disk_keeps_order_in_step() {
        let (vault, dir) = vault_with(&["x.md", "folder/", "folder/y.md", "folder/z.md"]);
        let settings = SettingsManager::in_memory(Settings::default(), dir.path().join("data.json"));
        let mut sorting = ManualSorting::new(settings, vault);
        sorting.reconcile_order();

        let instruction = DropInstruction {
            parent_dir: "folder".to_string(),
            sibling: Some("folder/y.md".to_string()),
            position: DropPosition::After,
        };
        let committed = sorting.move_item(&TreeEntry::file("x.md"), &instruction).unwrap();

        assert_eq!(committed.target, "folder/x.md");
        assert!(sorting.vault().root().join("folder").join("x.md").is_file());
        // the rename event finds the order already updated
        assert_eq!(sorting.process_vault_events(), 0);
        assert_eq!(
            sorting.settings().custom_order["folder"].children,
            vec!["folder/y.md", "folder/x.md", "folder/z.md"]
        );
    }

    fn path_with_traversal() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9_-]{1,10}".prop_map(|s| format!("{}/../{}", s, s)),
            "[a-zA-Z0-9_-]{1,10}".prop_map(|s| format!("../{}", s)),
            "[a-zA-Z0-9_-]{1,10}".prop_map(|s| format!("{}/..", s)),
            "[a-zA-Z0-9_-]{1,10}".prop_map(|s| format!("{}\\{}", s, s)),
            "[a-zA-Z0-9_-]{1,10}".prop_map(|s| format!("{}//{}", s, s)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Paths with traversal segments or foreign separators never map
        /// onto the file system
        #[test]
        fn prop_traversal_rejected(path in path_with_traversal()) {
            let temp_dir = tempdir().unwrap();
            let result = validate_path(temp_dir.path(), &path);
            prop_assert!(
                matches!(result, Err(Error::InvalidPath(_))),
                "Path '{}' should be rejected but was accepted",
                path
            );
        }
    }
}
