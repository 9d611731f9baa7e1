//! Per-row problems found while reconstructing objects from sheet rows.
//!
//! A diagnostic never stops a run: the offending row (or member) is skipped,
//! the problem is logged, and processing continues with the next row.

use colored::Colorize;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    MissingName,
    DuplicateName,
    PortCountMismatch,
    InvalidPort,
    PortOutOfRange,
    UnknownServiceType,
    UnknownGroupMember,
    NoMembers,
    InvalidIcmpType,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::MissingName => "missing_name",
            DiagnosticCode::DuplicateName => "duplicate_name",
            DiagnosticCode::PortCountMismatch => "port_count_mismatch",
            DiagnosticCode::InvalidPort => "invalid_port",
            DiagnosticCode::PortOutOfRange => "port_out_of_range",
            DiagnosticCode::UnknownServiceType => "unknown_service_type",
            DiagnosticCode::UnknownGroupMember => "unknown_group_member",
            DiagnosticCode::NoMembers => "no_members",
            DiagnosticCode::InvalidIcmpType => "invalid_icmp_type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowDiagnostic {
    pub sheet: String,
    /// Spreadsheet line number; the header row is line 1.
    pub line: usize,
    /// Object name from the row, empty when the name cell was blank.
    pub name: String,
    pub code: DiagnosticCode,
    pub message: String,
}

/// Accumulates diagnostics for one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<RowDiagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        sheet: &str,
        line: usize,
        name: &str,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) {
        let message = message.into();
        warn!(sheet, line, name, code = code.as_str(), "{message}");
        self.entries.push(RowDiagnostic {
            sheet: sheet.to_string(),
            line,
            name: name.to_string(),
            code,
            message,
        });
    }

    pub fn into_vec(self) -> Vec<RowDiagnostic> {
        self.entries
    }
}

/// Render diagnostics for terminal output.
pub fn render_diagnostics(diagnostics: &[RowDiagnostic]) -> String {
    let mut out = vec!["diagnostics".to_string()];
    if diagnostics.is_empty() {
        out.push("- none".to_string());
        return out.join("\n");
    }
    for diag in diagnostics {
        let location = format!("{}:{}", diag.sheet, diag.line);
        out.push(format!(
            "- [{}] {} {}: {}",
            diag.code.as_str().yellow(),
            location.dimmed(),
            diag.name,
            diag.message
        ));
    }
    out.join("\n")
}
