use crate::collision;
use crate::error::Result;
use crate::merge;
use crate::plan::{CollisionMode, Plan, PlanItem};
use crate::undo::{UndoEntry, UndoManager};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Append one audit line per step to this file when set.
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// The source vanished between plan and execute.
    SourceMissing,
    /// The target appeared between plan and execute; renaming onto it
    /// would overwrite.
    TargetExists,
    Io(String),
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceMissing => write!(f, "source no longer exists"),
            Self::TargetExists => write!(f, "target already exists"),
            Self::Io(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Renamed to the contained path (the plan's final path, except for
    /// merge-mode keep-both fallbacks which may have been suffixed again).
    Applied(PathBuf),
    /// No-op item, source == final.
    Skipped,
    Failed(FailReason),
    /// Merge mode: the source file was byte-identical to the occupant and
    /// was deleted. Not undoable.
    DeletedDuplicate,
    /// Merge mode: the source directory was folded into the occupant.
    /// `conflicts` counts children that could not be compared or renamed
    /// and were left in the source directory. Not undoable.
    Merged {
        moved: usize,
        deleted: usize,
        conflicts: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub item: PlanItem,
    pub outcome: ItemOutcome,
}

/// Per-item account of one executed batch. Failures never abort the batch;
/// every plan item has exactly one row here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub plan_id: String,
    pub results: Vec<ItemResult>,
}

impl ExecutionReport {
    pub fn applied(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Applied(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == ItemOutcome::Skipped)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Failed(_)))
            .count()
    }

    pub fn merged(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Merged { .. }))
            .count()
    }

    pub fn deleted_duplicates(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == ItemOutcome::DeletedDuplicate)
            .count()
    }
}

/// Audit log sink for one batch. Write failures never abort the batch.
pub(crate) struct ExecState {
    log_file: Option<File>,
}

impl ExecState {
    pub(crate) fn new(log_file: Option<PathBuf>) -> Result<Self> {
        let log_file = if let Some(path) = log_file {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            Some(OpenOptions::new().create(true).append(true).open(&path)?)
        } else {
            None
        };
        Ok(Self { log_file })
    }

    pub(crate) fn log(&mut self, message: &str) {
        if let Some(ref mut file) = self.log_file {
            let _ = writeln!(
                file,
                "[{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                message
            );
            let _ = file.flush();
        }
    }
}

/// Apply a plan strictly in its deepest-first order. Each item succeeds or
/// fails on its own; the batch always runs to completion. The collected
/// undo log replaces whatever the manager held before, even when empty.
pub fn execute_plan(
    plan: &Plan,
    undo: &mut UndoManager,
    options: &ExecuteOptions,
) -> Result<ExecutionReport> {
    let mut state = ExecState::new(options.log_file.clone())?;
    state.log(&format!(
        "Starting batch {} ({} items)",
        plan.id,
        plan.items.len()
    ));

    let mut undo_log = Vec::new();
    let mut results = Vec::with_capacity(plan.items.len());
    for item in &plan.items {
        let outcome = execute_item(item, plan.options.collision, &mut undo_log, &mut state);
        results.push(ItemResult {
            item: item.clone(),
            outcome,
        });
    }

    let report = ExecutionReport {
        plan_id: plan.id.clone(),
        results,
    };
    state.log(&format!(
        "Finished batch {}: {} applied, {} skipped, {} failed",
        plan.id,
        report.applied(),
        report.skipped(),
        report.failed()
    ));

    undo.record_batch(undo_log);
    Ok(report)
}

fn execute_item(
    item: &PlanItem,
    mode: CollisionMode,
    undo_log: &mut Vec<UndoEntry>,
    state: &mut ExecState,
) -> ItemOutcome {
    if item.is_no_op() {
        return ItemOutcome::Skipped;
    }

    if !collision::occupied(&item.source) {
        state.log(&format!("Missing source {}", item.source.display()));
        return ItemOutcome::Failed(FailReason::SourceMissing);
    }

    let target_occupied = collision::occupied(&item.final_path);
    match mode {
        CollisionMode::Suffix if target_occupied => {
            state.log(&format!(
                "Target {} already exists, not overwriting",
                item.final_path.display()
            ));
            ItemOutcome::Failed(FailReason::TargetExists)
        },
        CollisionMode::Merge if target_occupied => merge_item(item, undo_log, state),
        _ => rename_item(item, &item.final_path, undo_log, state),
    }
}

fn rename_item(
    item: &PlanItem,
    target: &Path,
    undo_log: &mut Vec<UndoEntry>,
    state: &mut ExecState,
) -> ItemOutcome {
    match fs::rename(&item.source, target) {
        Ok(()) => {
            undo_log.push(UndoEntry {
                current: target.to_path_buf(),
                original: item.source.clone(),
            });
            state.log(&format!(
                "Renamed {} -> {}",
                item.source.display(),
                target.display()
            ));
            ItemOutcome::Applied(target.to_path_buf())
        },
        Err(err) => {
            state.log(&format!(
                "Failed to rename {} -> {}: {}",
                item.source.display(),
                target.display(),
                err
            ));
            ItemOutcome::Failed(FailReason::Io(err.to_string()))
        },
    }
}

/// One-line count summary for a merged outcome.
pub(crate) fn merge_detail(moved: usize, deleted: usize, conflicts: usize) -> String {
    if conflicts > 0 {
        format!(
            "{} moved, {} duplicates deleted, {} left behind",
            moved, deleted, conflicts
        )
    } else {
        format!("{} moved, {} duplicates deleted", moved, deleted)
    }
}

/// Merge-mode handling for an occupied target. Directory pairs fold
/// together, identical files deduplicate, everything else keeps both names
/// via the suffix rule.
fn merge_item(
    item: &PlanItem,
    undo_log: &mut Vec<UndoEntry>,
    state: &mut ExecState,
) -> ItemOutcome {
    let source = &item.source;
    let target = &item.final_path;

    if source.is_dir() && target.is_dir() {
        return match merge::merge_dirs(source, target) {
            Ok(stats) => {
                state.log(&format!(
                    "Merged {} into {} ({})",
                    source.display(),
                    target.display(),
                    merge_detail(stats.moved, stats.deleted_duplicates, stats.conflicts)
                ));
                ItemOutcome::Merged {
                    moved: stats.moved,
                    deleted: stats.deleted_duplicates,
                    conflicts: stats.conflicts,
                }
            },
            Err(err) => {
                state.log(&format!(
                    "Failed to merge {} into {}: {}",
                    source.display(),
                    target.display(),
                    err
                ));
                ItemOutcome::Failed(FailReason::Io(err.to_string()))
            },
        };
    }

    if source.is_file() && target.is_file() {
        match merge::files_identical(source, target) {
            Ok(true) => {
                return match fs::remove_file(source) {
                    Ok(()) => {
                        state.log(&format!(
                            "Deleted duplicate {} (identical to {})",
                            source.display(),
                            target.display()
                        ));
                        ItemOutcome::DeletedDuplicate
                    },
                    Err(err) => ItemOutcome::Failed(FailReason::Io(err.to_string())),
                };
            },
            Ok(false) => {},
            Err(err) => {
                return ItemOutcome::Failed(FailReason::Io(err.to_string()));
            },
        }
    }

    // Differing file contents or mismatched kinds: keep both.
    let Some((parent, name)) = target
        .parent()
        .zip(target.file_name().and_then(|n| n.to_str()))
    else {
        return ItemOutcome::Failed(FailReason::Io(format!(
            "cannot suffix {}",
            target.display()
        )));
    };
    let unique = collision::resolve(parent, name, &HashSet::new(), collision::occupied);
    rename_item(item, &unique, undo_log, state)
}
