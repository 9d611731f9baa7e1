//! Import direction: edited sheets back to submission-ready objects.
//!
//! ## Pipeline
//!
//! 1. **Locate** every required sheet and column; a gap aborts the run
//!    before anything is built.
//! 2. **Address lists** are rebuilt first so the resolver reflects this
//!    workbook, not the one that was exported.
//! 3. **Rules** are split, defaulted, resolved and chained by row order.
//! 4. **URL lists** are regrouped by name in first-seen order.
//! 5. **Service sheet** rows are decoded by their `type` column into
//!    services, service groups, applications and application groups.
//!
//! Malformed rows become [`RowDiagnostic`]s and are skipped; the rest of the
//! workbook is still converted.

mod lists;
mod rules;
mod services;

use serde::Serialize;
use sheet_store::Workbook;
use tracing::debug;

use crate::config::Config;
use crate::diagnostics::{Diagnostics, RowDiagnostic};
use crate::error::ConvertError;
use crate::model::{Category, PolicyBundle};
use crate::resolver::{AddressCollision, AddressResolver};
use crate::sheets::ImportSheets;

pub use lists::group_by_name;
pub use services::parse_port;

/// Everything an import run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub bundle: PolicyBundle,
    pub diagnostics: Vec<RowDiagnostic>,
    pub collisions: Vec<AddressCollision>,
}

/// Rebuilds a [`PolicyBundle`] from a workbook.
#[derive(Debug, Clone)]
pub struct ReconstructionEngine<'a> {
    config: &'a Config,
}

impl<'a> ReconstructionEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn reconstruct(&self, book: &Workbook) -> Result<ImportOutcome, ConvertError> {
        let sheets = ImportSheets::locate(book, &self.config.sheets)?;
        let mut diags = Diagnostics::new();

        let address_lists = lists::address_lists(sheets.address_lists, &mut diags);
        let resolver = AddressResolver::build(&address_lists, self.config.resolver.collision);
        let rules = rules::security_rules(sheets.rules, &resolver, &mut diags);
        let url_lists = lists::url_lists(sheets.url_lists, &mut diags);
        let decoded = services::service_objects(sheets.services, &mut diags);

        let bundle = PolicyBundle {
            rules,
            address_lists,
            url_lists,
            services: decoded.services,
            service_groups: decoded.service_groups,
            applications: decoded.applications,
            application_groups: decoded.application_groups,
        };
        for category in Category::ALL {
            debug!(%category, count = bundle.count(category), "category reconstructed");
        }

        Ok(ImportOutcome {
            bundle,
            diagnostics: diags.into_vec(),
            collisions: resolver.collisions(),
        })
    }
}
