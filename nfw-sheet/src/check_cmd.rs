use anyhow::{bail, Context, Result};
use nfw_sheet::config::Config;
use nfw_sheet::reconstruct::ReconstructionEngine;
use nfw_sheet::report::{render_import_text, ImportReport};
use sheet_store::read_workbook;

use crate::cli::{CheckArgs, OutputFormat};

pub fn run_check(args: CheckArgs, config: &Config) -> Result<()> {
    let book = read_workbook(&args.workbook)
        .with_context(|| format!("failed to read workbook {}", args.workbook.display()))?;
    let outcome = ReconstructionEngine::new(config)
        .reconstruct(&book)
        .with_context(|| format!("failed to reconstruct {}", args.workbook.display()))?;

    let report = ImportReport::from_outcome(&outcome, Vec::new());
    match args.format {
        OutputFormat::Text => println!("{}", render_import_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if args.strict && !report.diagnostics.is_empty() {
        bail!(
            "check failed in strict mode: {} diagnostics",
            report.diagnostics.len()
        );
    }
    Ok(())
}
