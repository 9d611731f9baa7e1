use anyhow::{bail, Context, Result};
use nfw_sheet::artifacts::{render_artifacts, write_artifacts};
use nfw_sheet::config::Config;
use nfw_sheet::reconstruct::ReconstructionEngine;
use nfw_sheet::report::{render_import_text, ImportReport};
use sheet_store::read_workbook;

use crate::cli::{ImportArgs, OutputFormat};
use crate::path_guard;

pub fn run_import(args: ImportArgs, config: &Config) -> Result<()> {
    path_guard::ensure_output_not_same(&args.output, &[&args.workbook])?;

    let book = read_workbook(&args.workbook)
        .with_context(|| format!("failed to read workbook {}", args.workbook.display()))?;
    let outcome = ReconstructionEngine::new(config)
        .reconstruct(&book)
        .with_context(|| format!("failed to reconstruct {}", args.workbook.display()))?;

    let artifacts = render_artifacts(&outcome.bundle, &config.artifacts)?;
    let written = write_artifacts(&args.output, &artifacts)
        .with_context(|| format!("failed to write artifacts to {}", args.output.display()))?;

    let report = ImportReport::from_outcome(
        &outcome,
        written.iter().map(|p| p.display().to_string()).collect(),
    );
    match args.format {
        OutputFormat::Text => println!("{}", render_import_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if args.strict && !report.diagnostics.is_empty() {
        bail!(
            "import failed in strict mode: {} diagnostics",
            report.diagnostics.len()
        );
    }
    Ok(())
}
