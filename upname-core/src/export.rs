use crate::error::Result;
use crate::execute::{merge_detail, ExecutionReport, ItemOutcome};
use crate::plan::{Plan, PlanItem};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One exported line. `actual` is the on-disk outcome, or a parenthesized
/// marker for items that did not move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub base: String,
    pub kind: String,
    pub current: String,
    pub intended: String,
    pub actual: String,
}

fn relative(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(stripped) => stripped.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

fn row_for_item(item: &PlanItem, actual: String) -> CsvRow {
    CsvRow {
        base: item.root.display().to_string(),
        kind: item.kind.label().to_string(),
        current: relative(&item.source, &item.root),
        intended: relative(&item.intended, &item.root),
        actual,
    }
}

/// Rows for a plan that has not been applied yet.
pub fn plan_rows(plan: &Plan) -> Vec<CsvRow> {
    plan.items
        .iter()
        .map(|item| row_for_item(item, "(preview)".to_string()))
        .collect()
}

/// Rows for a finished batch.
pub fn report_rows(report: &ExecutionReport) -> Vec<CsvRow> {
    report
        .results
        .iter()
        .map(|result| {
            let actual = match &result.outcome {
                ItemOutcome::Applied(to) => relative(to, &result.item.root),
                ItemOutcome::Skipped => "(skipped)".to_string(),
                ItemOutcome::Failed(reason) => format!("(failed: {})", reason),
                ItemOutcome::DeletedDuplicate => "(deleted duplicate)".to_string(),
                ItemOutcome::Merged {
                    moved,
                    deleted,
                    conflicts,
                } => format!("(merged: {})", merge_detail(*moved, *deleted, *conflicts)),
            };
            row_for_item(&result.item, actual)
        })
        .collect()
}

/// Quote a field per RFC 4180 when it contains a comma, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn render_csv(rows: &[CsvRow]) -> String {
    let mut output = String::from("base,kind,current,intended,actual\n");
    for row in rows {
        output.push_str(&format!(
            "{},{},{},{},{}\n",
            escape(&row.base),
            escape(&row.kind),
            escape(&row.current),
            escape(&row.intended),
            escape(&row.actual)
        ));
    }
    output
}

/// Write rows to `path`, creating parent directories as needed.
pub fn write_csv(path: &Path, rows: &[CsvRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(render_csv(rows).as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{build_plan, CollisionMode, RenameOptions};
    use crate::walk::{DepthMode, TargetKinds};
    use std::fs;
    use tempfile::TempDir;

    fn file_options() -> RenameOptions {
        RenameOptions {
            kinds: TargetKinds::Files,
            depth: DepthMode::AllLevels,
            replace_spaces: true,
            collision: CollisionMode::Suffix,
        }
    }

    #[test]
    fn test_plan_rows_carry_preview_marker() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a-b.txt"), "x").unwrap();
        let plan = build_plan(&[dir.path().to_path_buf()], &file_options()).unwrap();
        let rows = plan_rows(&plan);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].current, "a-b.txt");
        assert_eq!(rows[0].intended, "A_B.TXT");
        assert_eq!(rows[0].actual, "(preview)");
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_quoted() {
        let rows = vec![CsvRow {
            base: "/tmp/base".to_string(),
            kind: "FILE".to_string(),
            current: "a,b.txt".to_string(),
            intended: "say \"hi\".txt".to_string(),
            actual: "(preview)".to_string(),
        }];
        let rendered = render_csv(&rows);
        assert!(rendered.contains("\"a,b.txt\""));
        assert!(rendered.contains("\"say \"\"hi\"\".txt\""));
    }

    #[test]
    fn test_report_rows_reflect_outcomes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("one two.txt"), "x").unwrap();
        fs::write(dir.path().join("DONE.TXT"), "y").unwrap();
        let plan = build_plan(&[dir.path().to_path_buf()], &file_options()).unwrap();
        let mut undo = crate::undo::UndoManager::new();
        let report = crate::execute::execute_plan(
            &plan,
            &mut undo,
            &crate::execute::ExecuteOptions::default(),
        )
        .unwrap();

        let rows = report_rows(&report);
        assert_eq!(rows.len(), 2);
        let applied = rows.iter().find(|r| r.current == "one two.txt").unwrap();
        assert_eq!(applied.actual, "ONE_TWO.TXT");
        let skipped = rows.iter().find(|r| r.current == "DONE.TXT").unwrap();
        assert_eq!(skipped.actual, "(skipped)");
    }

    #[test]
    fn test_collision_rows_keep_intended_separate_from_actual() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("my file.txt"), "x").unwrap();
        fs::write(dir.path().join("MY_FILE.TXT"), "y").unwrap();
        let plan = build_plan(&[dir.path().to_path_buf()], &file_options()).unwrap();

        // Before execution `intended` carries the raw transform output,
        // not the suffixed path picked by collision resolution.
        let rows = plan_rows(&plan);
        let collided = rows.iter().find(|r| r.current == "my file.txt").unwrap();
        assert_eq!(collided.intended, "MY_FILE.TXT");
        assert_eq!(collided.actual, "(preview)");

        let mut undo = crate::undo::UndoManager::new();
        let report = crate::execute::execute_plan(
            &plan,
            &mut undo,
            &crate::execute::ExecuteOptions::default(),
        )
        .unwrap();

        let rows = report_rows(&report);
        let applied = rows.iter().find(|r| r.current == "my file.txt").unwrap();
        assert_eq!(applied.intended, "MY_FILE.TXT");
        assert_eq!(applied.actual, "MY_FILE.TXT_1");
    }

    #[test]
    fn test_write_csv_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("reports").join("out.csv");
        let rows = vec![CsvRow {
            base: "/tmp/base".to_string(),
            kind: "DIR".to_string(),
            current: "a".to_string(),
            intended: "A".to_string(),
            actual: "(preview)".to_string(),
        }];
        write_csv(&target, &rows).unwrap();
        let contents = fs::read_to_string(&target).unwrap();
        assert!(contents.starts_with("base,kind,current,intended,actual\n"));
        assert!(contents.contains("/tmp/base,DIR,a,A,(preview)"));
    }
}
