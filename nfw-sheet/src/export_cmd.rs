use anyhow::{Context, Result};
use nfw_sheet::config::Config;
use nfw_sheet::flatten::FlatteningEngine;
use nfw_sheet::remote::{fetch_bundle, SnapshotProvider};
use nfw_sheet::report::{render_export_text, ExportReport};
use nfw_sheet::summary::summarize_export;
use sheet_store::write_workbook;
use tracing::{info, warn};

use crate::cli::{ExportArgs, OutputFormat};
use crate::path_guard;

pub fn run_export(args: ExportArgs, config: &Config) -> Result<()> {
    path_guard::ensure_output_not_same(&args.output, &[&args.snapshot_dir])?;

    let provider = SnapshotProvider::open(&args.snapshot_dir)
        .with_context(|| format!("failed to open snapshot {}", args.snapshot_dir.display()))?;
    let fetched = fetch_bundle(&provider)
        .with_context(|| format!("failed to read snapshot {}", provider.root().display()))?;
    for (category, name) in fetched.bundle.duplicate_names() {
        warn!(%category, %name, "name appears more than once in snapshot");
    }

    let book = FlatteningEngine::new(config).flatten(&fetched.bundle);
    write_workbook(&book, &args.output)
        .with_context(|| format!("failed to write workbook {}", args.output.display()))?;
    info!(output = %args.output.display(), sheets = book.sheets.len(), "workbook written");

    let report = ExportReport {
        summary: summarize_export(&book, &config.sheets, fetched.skipped.len()),
        skipped: fetched.skipped,
        output: args.output.display().to_string(),
    };
    match args.format {
        OutputFormat::Text => println!("{}", render_export_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
