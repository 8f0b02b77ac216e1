use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "FILE",
            Self::Dir => "DIR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthMode {
    Level1,
    Level2,
    UpToLevel2,
    AllLevels,
}

impl DepthMode {
    /// Upper bound handed to the walker; `None` means unbounded descent.
    fn max_depth(self) -> Option<usize> {
        match self {
            Self::Level1 => Some(1),
            Self::Level2 | Self::UpToLevel2 => Some(2),
            Self::AllLevels => None,
        }
    }

    fn includes(self, depth: usize) -> bool {
        match self {
            Self::Level1 => depth == 1,
            Self::Level2 => depth == 2,
            Self::UpToLevel2 => depth == 1 || depth == 2,
            Self::AllLevels => depth >= 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKinds {
    Files,
    Dirs,
    Both,
}

impl TargetKinds {
    fn includes(self, kind: EntryKind) -> bool {
        match self {
            Self::Both => true,
            Self::Files => kind == EntryKind::File,
            Self::Dirs => kind == EntryKind::Dir,
        }
    }
}

/// A filesystem node discovered under a root. The path is its identity at
/// plan time; the walk never observes partially-renamed state.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Enumerate entries strictly under `root` (the root itself is depth 0 and
/// excluded), depth-filtered then kind-filtered. Order is stable for a
/// given snapshot: within each directory, entries come back sorted by file
/// name. Symlinks are not followed and are neither files nor directories
/// here, so they are never yielded. Unreadable entries and entries whose
/// names are not valid UTF-8 become warnings, not errors.
pub fn walk_tree(
    root: &Path,
    depth: DepthMode,
    kinds: TargetKinds,
) -> (Vec<Entry>, Vec<WalkWarning>) {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    if let Some(max) = depth.max_depth() {
        walker = walker.max_depth(max);
    }

    for item in walker {
        let item = match item {
            Ok(item) => item,
            Err(err) => {
                let path = err
                    .path()
                    .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                warnings.push(WalkWarning {
                    path,
                    message: err.to_string(),
                });
                continue;
            },
        };

        let file_type = item.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            // Symlinks and special files are never renamed.
            continue;
        };

        if !depth.includes(item.depth()) || !kinds.includes(kind) {
            continue;
        }

        if item.file_name().to_str().is_none() {
            warnings.push(WalkWarning {
                path: item.path().to_path_buf(),
                message: "name is not valid UTF-8, skipped".to_string(),
            });
            continue;
        }

        let entry_depth = item.depth();
        entries.push(Entry {
            path: item.into_path(),
            kind,
            depth: entry_depth,
        });
    }

    (entries, warnings)
}
