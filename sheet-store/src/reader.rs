use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;
use thiserror::Error;

use crate::sheet::{Row, Sheet, Workbook};

/// Errors that can occur while loading a [`Workbook`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// Input path does not exist.
    #[error("workbook not found: {0}")]
    NotFound(String),
    /// Input path exists but is not a directory or a known spreadsheet file.
    #[error("unsupported workbook format: {0} (expected a directory of .csv files, .csv, .xlsx, .xlsm, .xls or .ods)")]
    UnsupportedFormat(String),
    /// Failed to read from disk.
    #[error("failed to read workbook: {0}")]
    Io(#[from] std::io::Error),
    /// A CSV sheet could not be decoded.
    #[error("failed to parse CSV sheet {sheet}: {source}")]
    Csv { sheet: String, source: csv::Error },
    /// A spreadsheet file could not be opened or decoded.
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
}

/// Load a workbook from `path`.
///
/// A directory is read as one sheet per `*.csv` file (sheet name is the file
/// stem, sheets ordered by file name). A `.csv` file is a single-sheet workbook.
/// Spreadsheet files are read with every worksheet in workbook order.
pub fn read_workbook(path: &Path) -> Result<Workbook, ReadError> {
    if !path.exists() {
        return Err(ReadError::NotFound(path.display().to_string()));
    }
    if path.is_dir() {
        return read_csv_dir(path);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => {
            let mut book = Workbook::new();
            book.insert(read_csv_sheet(path)?);
            Ok(book)
        }
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_spreadsheet(path),
        _ => Err(ReadError::UnsupportedFormat(path.display().to_string())),
    }
}

fn read_csv_dir(dir: &Path) -> Result<Workbook, ReadError> {
    let mut paths = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect::<Vec<_>>();
    paths.sort();

    let mut book = Workbook::new();
    for path in paths {
        book.insert(read_csv_sheet(&path)?);
    }
    Ok(book)
}

/// Read one CSV file into a [`Sheet`] named after the file stem.
pub fn read_csv_sheet(path: &Path) -> Result<Sheet, ReadError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let bytes = fs::read(path)?;
    parse_csv(&name, &bytes)
}

/// Parse CSV bytes into a [`Sheet`]. The first record is the header row.
pub fn parse_csv(name: &str, bytes: &[u8]) -> Result<Sheet, ReadError> {
    let csv_err = |source| ReadError::Csv {
        sheet: name.to_string(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();
    let mut sheet = Sheet::new(name, headers);

    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let cells = record.iter().map(ToOwned::to_owned).collect::<Vec<_>>();
        if is_blank(&cells) {
            continue;
        }
        let line = record
            .position()
            .map_or(idx + 2, |pos| pos.line() as usize);
        sheet.rows.push(Row { line, cells });
    }
    Ok(sheet)
}

fn read_spreadsheet(path: &Path) -> Result<Workbook, ReadError> {
    let mut workbook = open_workbook_auto(path)?;
    let mut book = Workbook::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        book.insert(range_to_sheet(&name, &range));
    }
    Ok(book)
}

fn range_to_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let first_line = range.start().map_or(1, |(row, _)| row as usize + 1);
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| header.iter().map(|c| cell_text(c).trim().to_string()).collect())
        .unwrap_or_default();
    let mut sheet = Sheet {
        name: name.to_string(),
        headers,
        rows: Vec::new(),
    };

    for (offset, data_row) in rows.enumerate() {
        let cells = data_row.iter().map(cell_text).collect::<Vec<_>>();
        if is_blank(&cells) {
            continue;
        }
        sheet.rows.push(Row {
            line: first_line + offset + 1,
            cells,
        });
    }
    sheet
}

/// Render a spreadsheet cell as text. Integral floats drop their fraction so
/// a port typed as `80` does not come back as `80.0`.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (*f as i64).to_string()
        }
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}
