use crate::execute::{merge_detail, ExecutionReport, ItemOutcome};
use crate::plan::{Plan, PlanItem};
use crate::undo::UndoReport;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use nu_ansi_term::Color as AnsiColor;
use std::fmt::Write;
use std::io::{self, IsTerminal};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preview {
    Table,
    Summary,
    Json,
}

impl std::str::FromStr for Preview {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "summary" => Ok(Self::Summary),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid preview format: {}", s)),
        }
    }
}

/// Determine whether to use colors based on explicit preference or terminal
/// detection.
pub fn should_use_color_with_detector<F>(use_color: Option<bool>, is_terminal: F) -> bool
where
    F: Fn() -> bool,
{
    match use_color {
        Some(explicit) => explicit,
        None => is_terminal(),
    }
}

pub fn should_use_color(use_color: Option<bool>) -> bool {
    should_use_color_with_detector(use_color, || io::stdout().is_terminal())
}

fn display_path(path: &Path, root: &Path, relativize: bool) -> String {
    if relativize {
        match path.strip_prefix(root) {
            Ok(relative) => relative.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    } else {
        path.display().to_string()
    }
}

fn item_status(item: &PlanItem) -> &'static str {
    if item.is_no_op() {
        "no-op"
    } else if item.merge {
        "merge"
    } else if item.final_path == item.intended {
        "rename"
    } else {
        "collision"
    }
}

/// Render the plan in the specified format.
pub fn render_plan(plan: &Plan, format: Preview, use_color: Option<bool>) -> String {
    let use_color = should_use_color(use_color);
    match format {
        Preview::Table => render_table(plan, use_color),
        Preview::Summary => render_summary(plan),
        Preview::Json => render_json(plan),
    }
}

fn render_table(plan: &Plan, use_color: bool) -> String {
    let mut table = Table::new();
    if io::stdout().is_terminal() {
        table.set_content_arrangement(ContentArrangement::Dynamic);
    } else {
        table.set_content_arrangement(ContentArrangement::Disabled);
    }
    if use_color {
        table.enforce_styling();
        table.set_header(vec![
            Cell::new("Kind").fg(Color::Cyan),
            Cell::new("Current").fg(Color::Cyan),
            Cell::new("Intended").fg(Color::Cyan),
            Cell::new("Final").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
        ]);
    } else {
        table.set_header(vec!["Kind", "Current", "Intended", "Final", "Status"]);
    }

    let relativize = plan.roots.len() == 1;
    for item in &plan.items {
        let current = display_path(&item.source, &item.root, relativize);
        let intended = display_path(&item.intended, &item.root, relativize);
        let resolved = display_path(&item.final_path, &item.root, relativize);
        let status = item_status(item);
        if use_color {
            let status_color = match status {
                "rename" => Color::Green,
                "no-op" => Color::DarkGrey,
                _ => Color::Yellow,
            };
            table.add_row(vec![
                Cell::new(item.kind.label()),
                Cell::new(&current),
                Cell::new(&intended),
                Cell::new(&resolved),
                Cell::new(status).fg(status_color),
            ]);
        } else {
            table.add_row(vec![
                item.kind.label(),
                current.as_str(),
                intended.as_str(),
                resolved.as_str(),
                status,
            ]);
        }
    }

    table.add_row(vec![
        Cell::new("TOTALS"),
        Cell::new(format!("{} items", plan.stats.total)),
        Cell::new(format!(
            "{} renames, {} no-ops",
            plan.stats.renames, plan.stats.no_ops
        )),
        Cell::new(format!(
            "{} collisions, {} merges",
            plan.stats.collisions, plan.stats.merges
        )),
        Cell::new(""),
    ]);

    let mut output = table.to_string();
    output.push('\n');
    for warning in &plan.warnings {
        let line = format!("warning: {}: {}", warning.path.display(), warning.message);
        if use_color {
            writeln!(output, "{}", AnsiColor::Yellow.paint(line)).unwrap();
        } else {
            writeln!(output, "{}", line).unwrap();
        }
    }
    output
}

fn render_summary(plan: &Plan) -> String {
    let mut output = String::new();
    writeln!(output, "[PLAN {}]", plan.id).unwrap();
    writeln!(output, "Roots: {}", plan.roots.len()).unwrap();
    writeln!(
        output,
        "Items: {} ({} files, {} dirs)",
        plan.stats.total, plan.stats.files, plan.stats.dirs
    )
    .unwrap();
    writeln!(output, "Renames: {}", plan.stats.renames).unwrap();
    writeln!(output, "No-ops: {}", plan.stats.no_ops).unwrap();
    writeln!(output, "Collisions: {}", plan.stats.collisions).unwrap();
    writeln!(output, "Merges: {}", plan.stats.merges).unwrap();
    writeln!(output, "Warnings: {}", plan.warnings.len()).unwrap();

    if !plan.items.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "[ITEMS]").unwrap();
        let relativize = plan.roots.len() == 1;
        for item in &plan.items {
            let status = item_status(item);
            writeln!(
                output,
                "{}: {} -> {} ({})",
                item.kind.label().to_lowercase(),
                display_path(&item.source, &item.root, relativize),
                display_path(&item.final_path, &item.root, relativize),
                status
            )
            .unwrap();
        }
    }

    if !plan.warnings.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "[WARNINGS]").unwrap();
        for warning in &plan.warnings {
            writeln!(output, "{}: {}", warning.path.display(), warning.message).unwrap();
        }
    }
    output
}

fn render_json(plan: &Plan) -> String {
    serde_json::to_string_pretty(plan).unwrap_or_else(|_| "null".to_string())
}

/// Render a finished batch, one line per item plus totals.
pub fn render_report(report: &ExecutionReport, use_color: Option<bool>) -> String {
    let use_color = should_use_color(use_color);
    let paint = |color: AnsiColor, text: &str| {
        if use_color {
            color.paint(text.to_string()).to_string()
        } else {
            text.to_string()
        }
    };

    let mut output = String::new();
    writeln!(output, "[BATCH {}]", report.plan_id).unwrap();
    for result in &report.results {
        let source = result.item.source.display();
        match &result.outcome {
            ItemOutcome::Applied(to) => {
                writeln!(
                    output,
                    "{} {} -> {}",
                    paint(AnsiColor::Green, "renamed"),
                    source,
                    to.display()
                )
                .unwrap();
            },
            ItemOutcome::Skipped => {
                writeln!(output, "{} {}", paint(AnsiColor::DarkGray, "unchanged"), source)
                    .unwrap();
            },
            ItemOutcome::Failed(reason) => {
                writeln!(
                    output,
                    "{} {}: {}",
                    paint(AnsiColor::Red, "FAILED"),
                    source,
                    reason
                )
                .unwrap();
            },
            ItemOutcome::DeletedDuplicate => {
                writeln!(
                    output,
                    "{} {}",
                    paint(AnsiColor::Yellow, "deleted duplicate"),
                    source
                )
                .unwrap();
            },
            ItemOutcome::Merged {
                moved,
                deleted,
                conflicts,
            } => {
                writeln!(
                    output,
                    "{} {} -> {} ({})",
                    paint(AnsiColor::Yellow, "merged"),
                    source,
                    result.item.final_path.display(),
                    merge_detail(*moved, *deleted, *conflicts)
                )
                .unwrap();
            },
        }
    }

    write!(
        output,
        "{} applied, {} skipped, {} failed",
        report.applied(),
        report.skipped(),
        report.failed()
    )
    .unwrap();
    if report.merged() > 0 || report.deleted_duplicates() > 0 {
        write!(
            output,
            ", {} merged, {} duplicates deleted",
            report.merged(),
            report.deleted_duplicates()
        )
        .unwrap();
    }
    output.push('\n');
    output
}

/// Render an undo run, one line per reversed step plus totals.
pub fn render_undo_report(report: &UndoReport, use_color: Option<bool>) -> String {
    let use_color = should_use_color(use_color);
    let mut output = String::new();
    for step in &report.steps {
        match &step.outcome {
            ItemOutcome::Failed(reason) => {
                let label = if use_color {
                    AnsiColor::Red.paint("FAILED").to_string()
                } else {
                    "FAILED".to_string()
                };
                writeln!(output, "{} {}: {}", label, step.from.display(), reason).unwrap();
            },
            _ => {
                let label = if use_color {
                    AnsiColor::Green.paint("restored").to_string()
                } else {
                    "restored".to_string()
                };
                writeln!(
                    output,
                    "{} {} -> {}",
                    label,
                    step.from.display(),
                    step.to.display()
                )
                .unwrap();
            },
        }
    }
    writeln!(
        output,
        "{} restored, {} failed",
        report.restored(),
        report.failed()
    )
    .unwrap();
    output
}

/// Write a plan preview to stdout.
pub fn write_preview(
    plan: &Plan,
    format: Preview,
    use_color: Option<bool>,
) -> crate::error::Result<()> {
    let output = render_plan(plan, format, use_color);
    let mut stdout = io::stdout();
    io::Write::write_all(&mut stdout, output.as_bytes())?;
    io::Write::flush(&mut stdout)?;
    Ok(())
}
