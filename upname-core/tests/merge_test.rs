use upname_core::{
    build_plan, execute_plan, render_report, report_rows, CollisionMode, DepthMode, Error,
    ExecuteOptions, ItemOutcome, RenameOptions, TargetKinds, UndoManager,
};
use std::fs;
use tempfile::TempDir;

fn merge_options(kinds: TargetKinds) -> RenameOptions {
    RenameOptions {
        kinds,
        depth: DepthMode::AllLevels,
        replace_spaces: true,
        collision: CollisionMode::Merge,
    }
}

#[test]
fn test_merge_mode_folds_directory_into_occupied_target() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("du lieu")).unwrap();
    fs::write(root.join("du lieu").join("report.txt"), "r").unwrap();
    fs::write(root.join("du lieu").join("extra.txt"), "e").unwrap();
    fs::create_dir(root.join("DU_LIEU")).unwrap();
    fs::write(root.join("DU_LIEU").join("report.txt"), "r").unwrap();

    let plan = build_plan(&[root.to_path_buf()], &merge_options(TargetKinds::Dirs)).unwrap();
    let item = plan
        .items
        .iter()
        .find(|i| i.source.ends_with("du lieu"))
        .unwrap();
    assert!(item.merge);

    let mut undo = UndoManager::new();
    let report = execute_plan(&plan, &mut undo, &ExecuteOptions::default()).unwrap();
    assert_eq!(report.merged(), 1);
    assert_eq!(report.skipped(), 1);
    let merged = report
        .results
        .iter()
        .find(|r| r.item.source.ends_with("du lieu"))
        .unwrap();
    assert_eq!(
        merged.outcome,
        ItemOutcome::Merged {
            moved: 1,
            deleted: 1,
            conflicts: 0
        }
    );

    assert!(!root.join("du lieu").exists());
    assert!(root.join("DU_LIEU").join("report.txt").is_file());
    assert_eq!(
        fs::read_to_string(root.join("DU_LIEU").join("extra.txt")).unwrap(),
        "e"
    );

    // Merges leave nothing to replay
    assert!(!undo.has_batch());
    assert!(matches!(
        undo.undo(&ExecuteOptions::default()),
        Err(Error::NothingToUndo)
    ));
}

#[test]
fn test_merge_mode_deduplicates_identical_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("bao cao.txt"), "same bytes").unwrap();
    fs::write(root.join("BAO_CAO.TXT"), "same bytes").unwrap();

    let plan = build_plan(&[root.to_path_buf()], &merge_options(TargetKinds::Files)).unwrap();
    let mut undo = UndoManager::new();
    let report = execute_plan(&plan, &mut undo, &ExecuteOptions::default()).unwrap();
    assert_eq!(report.deleted_duplicates(), 1);
    assert_eq!(report.skipped(), 1);

    assert!(!root.join("bao cao.txt").exists());
    assert_eq!(
        fs::read_to_string(root.join("BAO_CAO.TXT")).unwrap(),
        "same bytes"
    );

    // A deletion cannot be replayed
    assert!(!undo.has_batch());
}

#[test]
fn test_merge_mode_keeps_differing_files_with_suffix() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("bao cao.txt"), "new draft").unwrap();
    fs::write(root.join("BAO_CAO.TXT"), "old copy").unwrap();

    let plan = build_plan(&[root.to_path_buf()], &merge_options(TargetKinds::Files)).unwrap();
    let mut undo = UndoManager::new();
    let report = execute_plan(&plan, &mut undo, &ExecuteOptions::default()).unwrap();
    assert_eq!(report.applied(), 1);
    let applied = report
        .results
        .iter()
        .find(|r| r.item.source.ends_with("bao cao.txt"))
        .unwrap();
    assert_eq!(
        applied.outcome,
        ItemOutcome::Applied(root.join("BAO_CAO.TXT_1"))
    );
    assert_eq!(
        fs::read_to_string(root.join("BAO_CAO.TXT")).unwrap(),
        "old copy"
    );
    assert_eq!(
        fs::read_to_string(root.join("BAO_CAO.TXT_1")).unwrap(),
        "new draft"
    );

    // Keep-both is an ordinary rename, so it is undoable
    let undo_report = undo.undo(&ExecuteOptions::default()).unwrap();
    assert_eq!(undo_report.restored(), 1);
    assert_eq!(
        fs::read_to_string(root.join("bao cao.txt")).unwrap(),
        "new draft"
    );
    assert!(!root.join("BAO_CAO.TXT_1").exists());
}

#[test]
fn test_merge_mode_mixed_kinds_keep_both() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("archive v1")).unwrap();
    fs::write(root.join("archive v1").join("inner.txt"), "i").unwrap();
    fs::write(root.join("ARCHIVE_V1"), "a plain file").unwrap();

    let plan = build_plan(&[root.to_path_buf()], &merge_options(TargetKinds::Dirs)).unwrap();
    let mut undo = UndoManager::new();
    let report = execute_plan(&plan, &mut undo, &ExecuteOptions::default()).unwrap();
    assert_eq!(report.applied(), 1);

    // The occupant file keeps its name; the directory steps aside.
    assert_eq!(
        fs::read_to_string(root.join("ARCHIVE_V1")).unwrap(),
        "a plain file"
    );
    assert!(root.join("ARCHIVE_V1_1").join("inner.txt").is_file());
    assert!(!root.join("archive v1").exists());
}

#[cfg(unix)]
#[test]
fn test_merge_reports_children_it_could_not_resolve() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    // The same invalid-UTF-8 file name on both sides with differing
    // contents can neither be deduplicated nor suffixed.
    let odd = OsStr::from_bytes(b"b\xE1o c\xE1o.txt");
    fs::create_dir(root.join("du lieu")).unwrap();
    fs::write(root.join("du lieu").join(odd), "mine").unwrap();
    fs::create_dir(root.join("DU_LIEU")).unwrap();
    fs::write(root.join("DU_LIEU").join(odd), "theirs").unwrap();

    let plan = build_plan(&[root.to_path_buf()], &merge_options(TargetKinds::Dirs)).unwrap();
    let mut undo = UndoManager::new();
    let report = execute_plan(&plan, &mut undo, &ExecuteOptions::default()).unwrap();

    let merged = report
        .results
        .iter()
        .find(|r| r.item.source.ends_with("du lieu"))
        .unwrap();
    assert_eq!(
        merged.outcome,
        ItemOutcome::Merged {
            moved: 0,
            deleted: 0,
            conflicts: 1
        }
    );

    // The stuck child keeps the source directory alive
    assert!(root.join("du lieu").join(odd).is_file());
    assert_eq!(
        fs::read_to_string(root.join("DU_LIEU").join(odd)).unwrap(),
        "theirs"
    );

    let rendered = render_report(&report, Some(false));
    assert!(rendered.contains("1 left behind"));

    let rows = report_rows(&report);
    let row = rows.iter().find(|r| r.current == "du lieu").unwrap();
    assert_eq!(
        row.actual,
        "(merged: 0 moved, 0 duplicates deleted, 1 left behind)"
    );
}
