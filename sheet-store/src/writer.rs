use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use thiserror::Error;

use crate::sheet::{Sheet, Workbook};

/// Errors that can occur while writing a [`Workbook`].
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize a sheet as CSV.
    #[error("failed to write CSV sheet {sheet}: {source}")]
    Csv { sheet: String, source: csv::Error },
    /// Failed to write output file or directory.
    #[error("failed to write workbook: {0}")]
    Io(#[from] std::io::Error),
    /// Sheet name cannot be used as a file name.
    #[error("invalid sheet name for file output: {0:?}")]
    InvalidSheetName(String),
}

/// Serialize a single sheet into CSV bytes (header row first).
pub fn write_csv(sheet: &Sheet) -> Result<Vec<u8>, WriteError> {
    let csv_err = |source| WriteError::Csv {
        sheet: sheet.name.clone(),
        source,
    };
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(&sheet.headers).map_err(csv_err)?;
    for row in &sheet.rows {
        writer.write_record(&row.cells).map_err(csv_err)?;
    }
    writer
        .into_inner()
        .map_err(|e| WriteError::Io(e.into_error()))
}

/// Write every sheet as `<dir>/<sheet>.csv`, creating `dir` if needed.
///
/// Sheets are written one at a time in workbook order.
pub fn write_workbook(book: &Workbook, dir: &Path) -> Result<(), WriteError> {
    fs::create_dir_all(dir)?;
    for sheet in &book.sheets {
        if !is_valid_file_stem(&sheet.name) {
            return Err(WriteError::InvalidSheetName(sheet.name.clone()));
        }
        let bytes = write_csv(sheet)?;
        fs::write(dir.join(format!("{}.csv", sheet.name)), bytes)?;
    }
    Ok(())
}

fn is_valid_file_stem(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::{write_csv, write_workbook, WriteError};
    use crate::sheet::{Sheet, Workbook};

    #[test]
    fn quotes_cells_containing_delimiters() {
        let mut sheet = Sheet::new("iplist", ["name", "addresses"]);
        sheet.push_row(["office", "10.0.0.1, 10.0.0.2"]);

        let bytes = write_csv(&sheet).expect("write");
        assert_eq!(
            String::from_utf8(bytes).expect("utf8"),
            "name,addresses\noffice,\"10.0.0.1, 10.0.0.2\"\n"
        );
    }

    #[test]
    fn rejects_sheet_names_with_path_separators() {
        let mut book = Workbook::new();
        book.insert(Sheet::new("../escape", ["name"]));
        let dir = tempfile::tempdir().expect("tempdir");

        let err = write_workbook(&book, dir.path()).expect_err("should reject");
        assert!(matches!(err, WriteError::InvalidSheetName(_)));
    }
}
