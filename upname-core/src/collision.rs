use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Occupancy check for collision targets. Unlike `Path::exists` this also
/// sees dangling symlinks, which a rename would otherwise clobber.
pub fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Resolve a proposed target name to a path that is free both on disk and
/// in the current plan. Collisions get `_1`, `_2`, ... appended to the end
/// of the full name, extension included (`MY_FILE.TXT` -> `MY_FILE.TXT_1`).
/// First free counter wins. The caller must claim the returned path
/// immediately so that no two items in one plan resolve to the same target.
pub fn resolve<F>(
    parent: &Path,
    proposed: &str,
    claimed: &HashSet<PathBuf>,
    exists: F,
) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let candidate = parent.join(proposed);
    if !claimed.contains(&candidate) && !exists(&candidate) {
        return candidate;
    }
    let mut counter = 1usize;
    loop {
        let candidate = parent.join(format!("{}_{}", proposed, counter));
        if !claimed.contains(&candidate) && !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
