//! Network firewall policy ↔ spreadsheet conversion.
//!
//! Policy objects are flattened into four editable sheets and rebuilt from
//! them into submission-ready JSON documents.
//!
//! # Architecture
//!
//! ## Model
//!
//! - [`model`]: Rules, address and URL lists, services, applications, groups
//! - [`sheets`]: Sheet layout: column names, required columns, cell splitting
//! - [`config`]: Sheet names, artifact names, collision policy, join separator
//!
//! ## Export
//!
//! - [`remote`]: Provider interface and the CLI-dump snapshot provider
//! - [`flatten`]: Policy objects to sheet rows
//!
//! ## Import
//!
//! - [`reconstruct`]: Sheet rows back to policy objects
//! - [`resolver`]: Address literal to address-list name substitution
//! - [`ordering`]: Row order as an `afterRule` position chain
//! - [`artifacts`]: One JSON document per category
//!
//! ## Reporting
//!
//! - [`diagnostics`]: Per-row problems that skip a row but never stop a run
//! - [`summary`]: One-line run summaries
//! - [`report`]: Text and JSON reports
//!
//! # Workflow
//!
//! 1. **Export** a snapshot directory to a CSV workbook
//! 2. **Edit** the workbook (CSV or any spreadsheet saved as xlsx)
//! 3. **Check** the edited workbook for row diagnostics
//! 4. **Import** it into the seven JSON artifacts
//!
//! ```ignore
//! use nfw_sheet::config::default_config;
//! use nfw_sheet::reconstruct::ReconstructionEngine;
//!
//! let config = default_config();
//! let book = sheet_store::read_workbook("policy".as_ref())?;
//! let outcome = ReconstructionEngine::new(&config).reconstruct(&book)?;
//! println!("rules={}", outcome.bundle.rules.len());
//! ```

pub mod artifacts;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flatten;
pub mod model;
pub mod ordering;
pub mod reconstruct;
pub mod remote;
pub mod report;
pub mod resolver;
pub mod sheets;
pub mod summary;
