//! Run reports printed by the binary, as text or JSON.

use colored::Colorize;
use serde::Serialize;

use crate::diagnostics::{render_diagnostics, RowDiagnostic};
use crate::reconstruct::ImportOutcome;
use crate::remote::SkippedRecord;
use crate::resolver::AddressCollision;
use crate::summary::{render_export, render_import, summarize_import, ExportSummary, ImportSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub summary: ExportSummary,
    pub skipped: Vec<SkippedRecord>,
    pub output: String,
}

pub fn render_export_text(report: &ExportReport) -> String {
    let mut out = vec![render_export(report.summary)];
    out.push(format!("output {}", report.output));
    if !report.skipped.is_empty() {
        out.push("skipped".to_string());
        for record in &report.skipped {
            out.push(format!(
                "- {} {}: {}",
                record.category,
                record.name,
                record.reason.dimmed()
            ));
        }
    }
    out.join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub collisions: Vec<AddressCollision>,
    pub diagnostics: Vec<RowDiagnostic>,
    /// Files written, empty for a check run.
    pub artifacts: Vec<String>,
}

impl ImportReport {
    pub fn from_outcome(outcome: &ImportOutcome, artifacts: Vec<String>) -> Self {
        Self {
            summary: summarize_import(&outcome.bundle, outcome.diagnostics.len()),
            collisions: outcome.collisions.clone(),
            diagnostics: outcome.diagnostics.clone(),
            artifacts,
        }
    }
}

pub fn render_import_text(report: &ImportReport) -> String {
    let mut out = vec![render_import(report.summary)];
    for path in &report.artifacts {
        out.push(format!("wrote {path}"));
    }
    if !report.collisions.is_empty() {
        out.push("address collisions".to_string());
        for collision in &report.collisions {
            out.push(format!(
                "- {} owned by {} (also in {})",
                collision.address,
                collision.owner.cyan(),
                collision.others.join(", ")
            ));
        }
    }
    out.push(render_diagnostics(&report.diagnostics));
    out.join("\n")
}
