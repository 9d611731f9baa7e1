//! Named-sheet tabular storage: a workbook is an ordered set of sheets, each a
//! header row plus data rows addressed by column name.
//!
//! Workbooks are read from a directory of CSV files or from a spreadsheet file
//! (`.xlsx`, `.xls`, `.ods`), and written back as a directory of CSV files.

pub mod reader;
pub mod sheet;
pub mod writer;

pub use reader::{parse_csv, read_csv_sheet, read_workbook, ReadError};
pub use sheet::{Row, RowView, Sheet, Workbook};
pub use writer::{write_csv, write_workbook, WriteError};
