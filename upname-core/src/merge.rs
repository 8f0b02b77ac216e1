use crate::collision;
use crate::error::Result;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Streaming SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    Ok(sha256_file(a)? == sha256_file(b)?)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub moved: usize,
    pub deleted_duplicates: usize,
    /// Children that could not be compared or named; left behind in the
    /// source directory.
    pub conflicts: usize,
}

impl MergeStats {
    fn absorb(&mut self, other: Self) {
        self.moved += other.moved;
        self.deleted_duplicates += other.deleted_duplicates;
        self.conflicts += other.conflicts;
    }
}

/// Fold `src` into `dst`, bottom-up. Identical files (by content hash) are
/// deleted from the source; everything else moves across, stepping aside
/// with the usual suffix on a name conflict; directory pairs recurse. The
/// emptied source directory is removed. None of this is undoable.
pub fn merge_dirs(src: &Path, dst: &Path) -> Result<MergeStats> {
    let mut stats = MergeStats::default();

    if !collision::occupied(dst) {
        fs::rename(src, dst)?;
        stats.moved += 1;
        return Ok(stats);
    }

    for child in fs::read_dir(src)? {
        let child = child?;
        let child_path = child.path();
        let child_type = child.file_type()?;
        let target = dst.join(child.file_name());

        if child_type.is_dir() && target.is_dir() {
            let sub = merge_dirs(&child_path, &target)?;
            stats.absorb(sub);
            continue;
        }

        if child_type.is_file() && target.is_file() {
            match files_identical(&child_path, &target) {
                Ok(true) => {
                    fs::remove_file(&child_path)?;
                    stats.deleted_duplicates += 1;
                    continue;
                },
                Ok(false) => {},
                Err(_) => {
                    // Cannot prove the pair identical, so the child stays put.
                    stats.conflicts += 1;
                    continue;
                },
            }
        }

        let final_target = if collision::occupied(&target) {
            let Some(name) = target.file_name().and_then(|n| n.to_str()) else {
                stats.conflicts += 1;
                continue;
            };
            collision::resolve(dst, name, &HashSet::new(), collision::occupied)
        } else {
            target
        };
        fs::rename(&child_path, &final_target)?;
        stats.moved += 1;
    }

    if let Ok(mut leftover) = fs::read_dir(src) {
        if leftover.next().is_none() {
            let _ = fs::remove_dir(src);
        }
    }

    Ok(stats)
}
