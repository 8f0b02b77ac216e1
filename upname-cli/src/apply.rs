use anyhow::{bail, Context, Result};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use upname_core::{
    build_plan, execute_plan, render_report, render_undo_report, report_rows, write_csv,
    write_preview, ExecuteOptions, Preview, RenameOptions, UndoManager,
};

#[allow(clippy::too_many_arguments)]
pub fn handle_apply(
    roots: &[PathBuf],
    options: &RenameOptions,
    preview: Preview,
    csv: Option<PathBuf>,
    log: Option<PathBuf>,
    yes: bool,
    use_color: bool,
) -> Result<()> {
    crate::cli::warn_network_roots(roots);

    let plan = build_plan(roots, options).context("Failed to build rename plan")?;
    write_preview(&plan, preview, Some(use_color)).context("Failed to write preview")?;

    if plan.items.is_empty() {
        println!("Nothing to rename.");
        return Ok(());
    }

    // Get confirmation unless --yes flag is provided
    if !yes {
        if !io::stdin().is_terminal() {
            bail!("cannot prompt for confirmation in a non-interactive session; pass --yes");
        }
        print!("Apply these renames? [y/N]: ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;
        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let mut undo = UndoManager::new();
    let exec_options = ExecuteOptions { log_file: log };
    let report = execute_plan(&plan, &mut undo, &exec_options)
        .context("Failed to apply rename plan")?;
    print!("{}", render_report(&report, Some(use_color)));

    if let Some(path) = csv {
        write_csv(&path, &report_rows(&report))
            .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
        println!(
            "Exported {} rows to {}",
            report.results.len(),
            path.display()
        );
    }

    // The undo log dies with the process, so the only chance to use it is
    // right now.
    if undo.has_batch() && !yes && io::stdin().is_terminal() {
        print!("Undo this batch? [y/N]: ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;
        if response.trim().eq_ignore_ascii_case("y") {
            let undo_report = undo.undo(&exec_options).context("Failed to undo batch")?;
            print!("{}", render_undo_report(&undo_report, Some(use_color)));
        }
    }

    Ok(())
}
