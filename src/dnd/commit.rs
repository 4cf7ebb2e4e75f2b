use crate::dnd::resolver::DropInstruction;
use crate::error::{Error, Result};
use crate::models::DropPosition;
use crate::order::MoveOutcome;
use crate::paths;
use crate::plugin::ManualSorting;
use crate::tree::{MutationExecutor, TreeEntry, TreeProvider};

/// One item committed by a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedMove {
    pub source: String,
    pub target: String,
    pub outcome: MoveOutcome,
}

impl CommittedMove {
    pub fn is_moved(&self) -> bool {
        matches!(self.outcome, MoveOutcome::Moved { .. })
    }

    pub fn resort_required(&self) -> bool {
        matches!(
            self.outcome,
            MoveOutcome::Moved {
                resort_required: true
            }
        )
    }
}

impl<V: TreeProvider + MutationExecutor> ManualSorting<V> {
    /// Path `source` gets when dropped into `target_dir`.
    ///
    /// Keeps the name unless another item already uses it, in which case
    /// ` 1`, ` 2`, ... is appended to the name before the extension.
    pub fn destination_path(&self, source: &TreeEntry, target_dir: &str) -> String {
        let target = paths::join(target_dir, source.name());
        if target == source.path || !self.vault().exists(&target) {
            return target;
        }

        let (stem, extension) = match source.extension() {
            Some(extension) => (paths::split_extension(source.name()).0, Some(extension)),
            None => (source.name(), None),
        };
        let mut n = 1;
        loop {
            let name = match extension {
                Some(extension) => format!("{} {}.{}", stem, n, extension),
                None => format!("{} {}", stem, n),
            };
            let candidate = paths::join(target_dir, &name);
            if !self.vault().exists(&candidate) {
                log::info!("'{}' is taken, using '{}'", target, candidate);
                return candidate;
            }
            n += 1;
        }
    }

    /// Moves one item to the drop position.
    ///
    /// The item is renamed in the vault first; the order only changes once
    /// the rename succeeded.
    ///
    /// # Errors
    /// Whatever the vault reports for the rename, or [`Error::InvalidPath`]
    /// when a folder would be dropped into itself
    pub fn move_item(
        &mut self,
        source: &TreeEntry,
        instruction: &DropInstruction,
    ) -> Result<CommittedMove> {
        let target = self.destination_path(source, &instruction.parent_dir);
        if paths::is_descendant(&target, &source.path) {
            return Err(Error::InvalidPath(format!(
                "cannot move '{}' into itself",
                source.path
            )));
        }

        let sibling = instruction.sibling.as_deref();
        if source.path == target && sibling == Some(target.as_str()) {
            log::info!("No move needed: '{}' is already at the target position", source.path);
            return Ok(CommittedMove {
                source: source.path.clone(),
                target,
                outcome: MoveOutcome::Unchanged,
            });
        }

        self.vault_mut().rename(source, &target)?;
        let outcome =
            self.order_store()
                .move_item(&source.path, &target, sibling, instruction.position);
        self.request_save();

        Ok(CommittedMove {
            source: source.path.clone(),
            target,
            outcome,
        })
    }

    /// Moves a multi-selection to the drop position.
    ///
    /// Selected items inside selected folders travel with their folder and
    /// are not moved on their own. The rest are moved in the given order,
    /// each one after the previous item's new location. Items that fail to
    /// move are skipped with a warning.
    ///
    /// # Arguments
    /// * `selected` - Selected paths in document order
    /// * `instruction` - Drop position of the first item
    pub fn move_selected_items(
        &mut self,
        selected: &[String],
        instruction: &DropInstruction,
    ) -> Vec<CommittedMove> {
        let mut items: Vec<TreeEntry> = selected
            .iter()
            .filter_map(|path| {
                let entry = self.vault().resolve(path);
                if entry.is_none() {
                    log::warn!("Selected item '{}' no longer exists", path);
                }
                entry
            })
            .collect();
        let folders: Vec<String> = items
            .iter()
            .filter(|entry| entry.is_dir)
            .map(|entry| entry.path.clone())
            .collect();
        items.retain(|entry| !folders.iter().any(|folder| paths::is_descendant(&entry.path, folder)));

        let mut instruction = instruction.clone();
        let mut moves = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                instruction.position = DropPosition::After;
            }
            match self.move_item(item, &instruction) {
                Ok(committed) => {
                    instruction.parent_dir = paths::parent_dir(&committed.target).to_string();
                    instruction.sibling = Some(committed.target.clone());
                    moves.push(committed);
                }
                Err(e) => log::warn!("Failed to move '{}': {}", item.path, e),
            }
        }
        moves
    }
}
