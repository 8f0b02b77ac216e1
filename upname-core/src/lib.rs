#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod collision;
pub mod error;
pub mod execute;
pub mod export;
pub mod merge;
pub mod plan;
pub mod preview;
pub mod transform;
pub mod undo;
pub mod walk;

pub use collision::{occupied, resolve};
pub use error::{Error, Result};
pub use execute::{
    execute_plan, ExecuteOptions, ExecutionReport, FailReason, ItemOutcome, ItemResult,
};
pub use export::{plan_rows, render_csv, report_rows, write_csv, CsvRow};
pub use merge::{merge_dirs, MergeStats};
pub use plan::{
    build_plan, plan_root, write_plan_file, CollisionMode, Plan, PlanItem, PlanStats,
    RenameOptions,
};
pub use preview::{
    render_plan, render_report, render_undo_report, should_use_color, write_preview, Preview,
};
pub use transform::{strip_diacritics, transform_name};
pub use undo::{UndoEntry, UndoManager, UndoReport, UndoStep};
pub use walk::{walk_tree, DepthMode, Entry, EntryKind, TargetKinds, WalkWarning};
