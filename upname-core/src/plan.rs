use crate::collision;
use crate::error::{Error, Result};
use crate::transform::transform_name;
use crate::walk::{walk_tree, DepthMode, EntryKind, TargetKinds, WalkWarning};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionMode {
    /// Append `_1`, `_2`, ... to the full transformed name until free.
    Suffix,
    /// Keep the occupied target and merge into it at execution time,
    /// deduplicating identical files by content hash.
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOptions {
    pub kinds: TargetKinds,
    pub depth: DepthMode,
    pub replace_spaces: bool,
    pub collision: CollisionMode,
}

impl Default for RenameOptions {
    /// Directories only, full descent, spaces replaced, suffix collisions.
    fn default() -> Self {
        Self {
            kinds: TargetKinds::Dirs,
            depth: DepthMode::AllLevels,
            replace_spaces: true,
            collision: CollisionMode::Suffix,
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One proposed rename. `intended` is the raw transform output; `final_path`
/// is what execution will actually use after collision resolution. A no-op
/// keeps `source == final_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    pub root: PathBuf,
    pub source: PathBuf,
    pub intended: PathBuf,
    pub final_path: PathBuf,
    pub kind: EntryKind,
    /// Merge mode only: the target was occupied at plan time and execution
    /// will merge/deduplicate instead of renaming.
    #[serde(default, skip_serializing_if = "is_false")]
    pub merge: bool,
}

impl PlanItem {
    pub fn is_no_op(&self) -> bool {
        self.source == self.final_path
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanStats {
    pub total: usize,
    pub files: usize,
    pub dirs: usize,
    pub renames: usize,
    pub no_ops: usize,
    /// Suffix mode: items whose final path differs from the intended path.
    pub collisions: usize,
    /// Merge mode: items that will merge into an occupied target.
    pub merges: usize,
}

/// An ordered batch of proposed renames. Items are deepest-first by source
/// path, so executing in order never renames a directory before the entries
/// inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub created_at: String,
    pub roots: Vec<PathBuf>,
    pub options: RenameOptions,
    pub items: Vec<PlanItem>,
    pub stats: PlanStats,
    pub warnings: Vec<WalkWarning>,
}

fn generate_plan_id(roots: &[PathBuf], options: &RenameOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{:?}", roots).as_bytes());
    hasher.update(format!("{:?}", options).as_bytes());
    hasher.update(chrono::Local::now().timestamp().to_string().as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

/// Single-root convenience wrapper around [`build_plan`].
pub fn plan_root(root: &Path, options: &RenameOptions) -> Result<Plan> {
    build_plan(&[root.to_path_buf()], options)
}

/// Walk every root, compute transformed names, resolve collisions, and
/// assemble a deepest-first plan. Read-only: walking and existence checks,
/// no writes. Disk may change between plan and execute; the executor treats
/// the plan as a snapshot and fails items individually when it has drifted.
pub fn build_plan(roots: &[PathBuf], options: &RenameOptions) -> Result<Plan> {
    for root in roots {
        if !root.is_dir() {
            return Err(Error::InvalidRoot(root.clone()));
        }
    }

    let mut discovered = Vec::new();
    let mut warnings = Vec::new();
    for root in roots {
        let (entries, mut walk_warnings) = walk_tree(root, options.depth, options.kinds);
        warnings.append(&mut walk_warnings);
        for entry in entries {
            discovered.push((root.clone(), entry));
        }
    }

    // Deepest-first across all roots; the stable sort keeps the walk's
    // per-directory name order within a level.
    discovered.sort_by_key(|(_, entry)| Reverse(entry.path.components().count()));

    // Names already taken in each touched directory by entries that are not
    // part of this plan (filtered out by kind/depth, or symlinks). Their
    // names must never be handed out as collision targets.
    let sources: HashSet<PathBuf> = discovered
        .iter()
        .map(|(_, entry)| entry.path.clone())
        .collect();
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    let mut seeded_parents: HashSet<PathBuf> = HashSet::new();
    for (_, entry) in &discovered {
        let Some(parent) = entry.path.parent() else {
            continue;
        };
        if !seeded_parents.insert(parent.to_path_buf()) {
            continue;
        }
        if let Ok(siblings) = fs::read_dir(parent) {
            for sibling in siblings.flatten() {
                let path = sibling.path();
                if !sources.contains(&path) {
                    claimed.insert(path);
                }
            }
        }
    }

    let mut items = Vec::new();
    let mut stats = PlanStats::default();
    for (root, entry) in discovered {
        let Some(name) = entry.path.file_name().and_then(|n| n.to_str()) else {
            // The walk has already warned about non-UTF-8 names.
            continue;
        };
        let Some(parent) = entry.path.parent() else {
            continue;
        };

        let new_name = transform_name(name, options.replace_spaces);
        let intended = parent.join(&new_name);

        let (final_path, merge) = if intended == entry.path {
            claimed.insert(entry.path.clone());
            (entry.path.clone(), false)
        } else {
            match options.collision {
                CollisionMode::Suffix => {
                    let resolved =
                        collision::resolve(parent, &new_name, &claimed, collision::occupied);
                    claimed.insert(resolved.clone());
                    (resolved, false)
                },
                CollisionMode::Merge => {
                    let merge = collision::occupied(&intended);
                    (intended.clone(), merge)
                },
            }
        };

        match entry.kind {
            EntryKind::File => stats.files += 1,
            EntryKind::Dir => stats.dirs += 1,
        }
        stats.total += 1;
        if entry.path == final_path {
            stats.no_ops += 1;
        } else if merge {
            stats.merges += 1;
        } else {
            stats.renames += 1;
            if final_path != intended {
                stats.collisions += 1;
            }
        }

        items.push(PlanItem {
            root: root.clone(),
            source: entry.path,
            intended,
            final_path,
            kind: entry.kind,
            merge,
        });
    }

    Ok(Plan {
        id: generate_plan_id(roots, options),
        created_at: chrono::Local::now().to_rfc3339(),
        roots: roots.to_vec(),
        options: *options,
        items,
        stats,
        warnings,
    })
}

/// Write the plan as pretty-printed JSON, creating parent directories as
/// needed.
pub fn write_plan_file(plan: &Plan, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, plan)?;
    Ok(())
}
