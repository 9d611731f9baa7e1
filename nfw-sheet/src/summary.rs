use serde::Serialize;
use sheet_store::Workbook;

use crate::config::SheetNames;
use crate::model::PolicyBundle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub rules: usize,
    pub address_lists: usize,
    pub url_rows: usize,
    pub service_rows: usize,
    pub skipped: usize,
}

pub fn summarize_export(book: &Workbook, names: &SheetNames, skipped: usize) -> ExportSummary {
    let rows = |sheet: &str| book.sheet(sheet).map_or(0, |s| s.len());
    ExportSummary {
        rules: rows(names.rules.as_str()),
        address_lists: rows(names.address_lists.as_str()),
        url_rows: rows(names.url_lists.as_str()),
        service_rows: rows(names.services.as_str()),
        skipped,
    }
}

pub fn render_export(summary: ExportSummary) -> String {
    format!(
        "export_summary rules={} address_lists={} url_rows={} service_rows={} skipped={}",
        summary.rules, summary.address_lists, summary.url_rows, summary.service_rows, summary.skipped
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rules: usize,
    pub address_lists: usize,
    pub url_lists: usize,
    pub services: usize,
    pub service_groups: usize,
    pub applications: usize,
    pub application_groups: usize,
    pub diagnostics: usize,
}

pub fn summarize_import(bundle: &PolicyBundle, diagnostics: usize) -> ImportSummary {
    ImportSummary {
        rules: bundle.rules.len(),
        address_lists: bundle.address_lists.len(),
        url_lists: bundle.url_lists.len(),
        services: bundle.services.len(),
        service_groups: bundle.service_groups.len(),
        applications: bundle.applications.len(),
        application_groups: bundle.application_groups.len(),
        diagnostics,
    }
}

pub fn render_import(summary: ImportSummary) -> String {
    format!(
        "import_summary rules={} address_lists={} url_lists={} services={} service_groups={} applications={} application_groups={} diagnostics={}",
        summary.rules,
        summary.address_lists,
        summary.url_lists,
        summary.services,
        summary.service_groups,
        summary.applications,
        summary.application_groups,
        summary.diagnostics
    )
}
