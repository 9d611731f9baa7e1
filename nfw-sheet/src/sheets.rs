//! Sheet layout shared by both directions: column names, which columns are
//! required on import, and how list cells are split and joined.

use sheet_store::{Sheet, Workbook};

use crate::config::SheetNames;
use crate::error::ConvertError;

pub mod rules {
    pub const NAME: &str = "name";
    pub const SOURCE: &str = "Source Address Lists";
    pub const DESTINATION: &str = "Destination Address Lists";
    pub const SERVICES: &str = "Service Lists";
    pub const APPLICATIONS: &str = "Application Lists";
    pub const URLS: &str = "Url Lists";
    pub const ACTION: &str = "Action";

    pub const COLUMNS: [&str; 7] = [
        NAME,
        SOURCE,
        DESTINATION,
        SERVICES,
        APPLICATIONS,
        URLS,
        ACTION,
    ];
    pub const REQUIRED: [&str; 7] = COLUMNS;
}

pub mod address_lists {
    pub const NAME: &str = "name";
    pub const ADDRESSES: &str = "addresses";

    pub const COLUMNS: [&str; 2] = [NAME, ADDRESSES];
    pub const REQUIRED: [&str; 2] = [NAME, ADDRESSES];
}

pub mod url_lists {
    pub const NAME: &str = "name";
    pub const PATTERN: &str = "pattern";

    pub const COLUMNS: [&str; 2] = [NAME, PATTERN];
    pub const REQUIRED: [&str; 2] = [NAME, PATTERN];
}

pub mod services {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const MIN_PORT: &str = "minimumPort";
    pub const MAX_PORT: &str = "maximumPort";
    pub const ICMP_TYPE: &str = "icmpType";
    pub const MEMBERS: &str = "services";

    pub const COLUMNS: [&str; 6] = [NAME, TYPE, MIN_PORT, MAX_PORT, ICMP_TYPE, MEMBERS];
    pub const REQUIRED: [&str; 6] = COLUMNS;
}

/// Split a delimited cell on commas, trimming tokens and dropping empties.
pub fn split_cell(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Drop repeated tokens, keeping the first occurrence.
pub fn dedup_tokens(tokens: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokens
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Join list items into one cell, keeping source order.
pub fn join_cell<S: AsRef<str>>(items: &[S], separator: &str) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator)
}

/// The four sheets an import needs, checked for required columns.
#[derive(Debug, Clone, Copy)]
pub struct ImportSheets<'a> {
    pub rules: &'a Sheet,
    pub address_lists: &'a Sheet,
    pub url_lists: &'a Sheet,
    pub services: &'a Sheet,
}

impl<'a> ImportSheets<'a> {
    /// Locate every required sheet and column, failing on the first gap.
    pub fn locate(book: &'a Workbook, names: &SheetNames) -> Result<Self, ConvertError> {
        Ok(Self {
            rules: required_sheet(book, &names.rules, &rules::REQUIRED)?,
            address_lists: required_sheet(book, &names.address_lists, &address_lists::REQUIRED)?,
            url_lists: required_sheet(book, &names.url_lists, &url_lists::REQUIRED)?,
            services: required_sheet(book, &names.services, &services::REQUIRED)?,
        })
    }
}

fn required_sheet<'a>(
    book: &'a Workbook,
    name: &str,
    columns: &[&str],
) -> Result<&'a Sheet, ConvertError> {
    let sheet = book.sheet(name).ok_or_else(|| ConvertError::MissingSheet {
        sheet: name.to_string(),
        available: book.sheet_names().join(", "),
    })?;
    if let Some(column) = columns.iter().find(|c| !sheet.has_column(c)) {
        return Err(ConvertError::MissingColumn {
            sheet: name.to_string(),
            column: (*column).to_string(),
        });
    }
    Ok(sheet)
}
