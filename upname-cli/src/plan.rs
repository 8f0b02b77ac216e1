use anyhow::{Context, Result};
use std::path::PathBuf;
use upname_core::{
    build_plan, plan_rows, write_csv, write_plan_file, write_preview, Preview, RenameOptions,
};

pub fn handle_plan(
    roots: &[PathBuf],
    options: &RenameOptions,
    preview: Preview,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    use_color: bool,
) -> Result<()> {
    crate::cli::warn_network_roots(roots);

    let plan = build_plan(roots, options).context("Failed to build rename plan")?;
    write_preview(&plan, preview, Some(use_color)).context("Failed to write preview")?;

    if let Some(path) = csv {
        write_csv(&path, &plan_rows(&plan))
            .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
        println!("Exported {} rows to {}", plan.items.len(), path.display());
    }

    if let Some(path) = json {
        write_plan_file(&plan, &path)
            .with_context(|| format!("Failed to write plan to {}", path.display()))?;
        println!("Wrote plan {} to {}", plan.id, path.display());
    }

    Ok(())
}
