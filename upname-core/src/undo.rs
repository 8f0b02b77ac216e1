use crate::collision;
use crate::error::{Error, Result};
use crate::execute::{ExecState, ExecuteOptions, FailReason, ItemOutcome};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Reverse mapping for one applied rename: undoing moves `current` back to
/// `original`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoEntry {
    pub current: PathBuf,
    pub original: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoStep {
    pub from: PathBuf,
    pub to: PathBuf,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoReport {
    pub steps: Vec<UndoStep>,
}

impl UndoReport {
    pub fn restored(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, ItemOutcome::Applied(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, ItemOutcome::Failed(_)))
            .count()
    }
}

/// Holds the reverse mapping of the most recent executed batch. One batch
/// deep: a new execution replaces the log, an undo consumes it. Owned by
/// the caller and passed where needed, never global.
#[derive(Debug, Default)]
pub struct UndoManager {
    batch: Option<Vec<UndoEntry>>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self { batch: None }
    }

    /// Replace the held log with a fresh batch, empty or not.
    pub fn record_batch(&mut self, entries: Vec<UndoEntry>) {
        self.batch = Some(entries);
    }

    pub fn has_batch(&self) -> bool {
        self.batch.as_ref().is_some_and(|b| !b.is_empty())
    }

    pub fn current_batch(&self) -> Option<&[UndoEntry]> {
        self.batch.as_deref()
    }

    /// Replay the held batch in strict reverse execution order and clear
    /// it. Forward order was deepest-first, so parents are restored before
    /// the children recorded beneath their original names. Restores are
    /// exact: an occupied original path fails the step rather than
    /// inventing a suffixed name. Single-use; partial failures still
    /// consume the batch.
    pub fn undo(&mut self, options: &ExecuteOptions) -> Result<UndoReport> {
        let batch = self.batch.take().ok_or(Error::NothingToUndo)?;
        if batch.is_empty() {
            return Err(Error::NothingToUndo);
        }

        let mut state = ExecState::new(options.log_file.clone())?;
        state.log(&format!("Undoing batch of {} renames", batch.len()));

        let mut steps = Vec::with_capacity(batch.len());
        for entry in batch.iter().rev() {
            let outcome = undo_entry(entry, &mut state);
            steps.push(UndoStep {
                from: entry.current.clone(),
                to: entry.original.clone(),
                outcome,
            });
        }

        let report = UndoReport { steps };
        state.log(&format!(
            "Undo finished: {} restored, {} failed",
            report.restored(),
            report.failed()
        ));
        Ok(report)
    }
}

fn undo_entry(entry: &UndoEntry, state: &mut ExecState) -> ItemOutcome {
    if !collision::occupied(&entry.current) {
        state.log(&format!(
            "Cannot undo {}: no longer exists",
            entry.current.display()
        ));
        return ItemOutcome::Failed(FailReason::SourceMissing);
    }
    if collision::occupied(&entry.original) {
        state.log(&format!(
            "Cannot undo {}: original path {} is occupied",
            entry.current.display(),
            entry.original.display()
        ));
        return ItemOutcome::Failed(FailReason::TargetExists);
    }
    match fs::rename(&entry.current, &entry.original) {
        Ok(()) => {
            state.log(&format!(
                "Restored {} -> {}",
                entry.current.display(),
                entry.original.display()
            ));
            ItemOutcome::Applied(entry.original.clone())
        },
        Err(err) => {
            state.log(&format!(
                "Failed to restore {} -> {}: {}",
                entry.current.display(),
                entry.original.display(),
                err
            ));
            ItemOutcome::Failed(FailReason::Io(err.to_string()))
        },
    }
}
