use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use upname_core::{CollisionMode, DepthMode, Preview, RenameOptions, TargetKinds};

/// Bulk-rename files and folders to uppercase, underscore-separated,
/// accent-free names
#[derive(Parser, Debug)]
#[command(name = "upname")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Assume yes for all prompts
    #[arg(short = 'y', long = "yes", global = true, env = "UPNAME_YES")]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preview the renames for one or more roots without touching disk
    Plan {
        /// Root directories to plan under
        #[arg(required = true, value_name = "ROOT")]
        roots: Vec<PathBuf>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Preview format
        #[arg(long, value_enum, default_value_t = PreviewArg::Table)]
        preview: PreviewArg,

        /// Export the plan rows as CSV to this file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Write the full plan as JSON to this file
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// Plan, confirm, and apply renames, then offer a one-shot undo
    Apply {
        /// Root directories to rename under
        #[arg(required = true, value_name = "ROOT")]
        roots: Vec<PathBuf>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Preview format shown before the confirmation prompt
        #[arg(long, value_enum, default_value_t = PreviewArg::Table)]
        preview: PreviewArg,

        /// Export the per-item outcomes as CSV to this file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Append an audit line per step to this file
        #[arg(long, value_name = "FILE")]
        log: Option<PathBuf>,
    },
}

/// What to rename and how deep to look for it
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Rename files only
    #[arg(long, conflicts_with_all = ["dirs", "both"])]
    pub files: bool,

    /// Rename directories only (the default)
    #[arg(long, conflicts_with = "both")]
    pub dirs: bool,

    /// Rename both files and directories
    #[arg(long)]
    pub both: bool,

    /// How deep below each root to rename
    #[arg(long, value_enum, default_value_t = DepthArg::All)]
    pub depth: DepthArg,

    /// Keep spaces instead of replacing them with underscores
    #[arg(long)]
    pub keep_spaces: bool,

    /// What to do when two entries want the same name
    #[arg(long, value_enum, default_value_t = CollisionArg::Suffix)]
    pub collision: CollisionArg,
}

impl SelectionArgs {
    pub fn to_options(&self) -> RenameOptions {
        let kinds = if self.files {
            TargetKinds::Files
        } else if self.both {
            TargetKinds::Both
        } else {
            TargetKinds::Dirs
        };
        RenameOptions {
            kinds,
            depth: self.depth.into(),
            replace_spaces: !self.keep_spaces,
            collision: self.collision.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum DepthArg {
    /// Direct children of the root only
    Level1,
    /// Exactly two levels below the root
    Level2,
    /// Levels one and two
    UpToLevel2,
    /// The whole tree
    All,
}

impl From<DepthArg> for DepthMode {
    fn from(arg: DepthArg) -> Self {
        match arg {
            DepthArg::Level1 => Self::Level1,
            DepthArg::Level2 => Self::Level2,
            DepthArg::UpToLevel2 => Self::UpToLevel2,
            DepthArg::All => Self::AllLevels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum CollisionArg {
    /// Append _1, _2, ... until the name is free
    Suffix,
    /// Fold into the occupying entry, deduplicating identical files
    Merge,
}

impl From<CollisionArg> for CollisionMode {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Suffix => Self::Suffix,
            CollisionArg::Merge => Self::Merge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum PreviewArg {
    Table,
    Summary,
    Json,
}

impl From<PreviewArg> for Preview {
    fn from(arg: PreviewArg) -> Self {
        match arg {
            PreviewArg::Table => Self::Table,
            PreviewArg::Summary => Self::Summary,
            PreviewArg::Json => Self::Json,
        }
    }
}

/// Roots on mounted network shares get a warning line, nothing more.
pub fn warn_network_roots(roots: &[PathBuf]) {
    for root in roots {
        if looks_like_network_share(root) {
            eprintln!(
                "warning: {} looks like a network share; renames there may race with syncing",
                root.display()
            );
        }
    }
}

fn looks_like_network_share(root: &Path) -> bool {
    let display = root.display().to_string();
    display.starts_with("//") || display.starts_with("\\\\")
}
