use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// A single named sheet: a header row plus positional data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    /// Sheet name as it appears in the workbook.
    pub name: String,
    /// Column headers, trimmed.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<Row>,
}

/// One data row. `line` is the 1-based spreadsheet line (the header is line 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Borrowed view of a row that resolves cells by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    sheet: &'a Sheet,
    row: &'a Row,
}

impl Sheet {
    /// Create an empty sheet with the given headers.
    pub fn new<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row of cells. Cells are matched to headers by position.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let line = self.rows.last().map_or(2, |r| r.line + 1);
        self.rows.push(Row {
            line,
            cells: cells.into_iter().map(Into::into).collect(),
        });
    }

    /// Position of a header, compared after trimming.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        let column = column.trim();
        self.headers.iter().position(|h| h.trim() == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Iterate rows as name-addressable views.
    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |row| RowView { sheet: self, row })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> RowView<'a> {
    /// Cell text for `column`, or `""` when the column or cell is absent.
    pub fn get(&self, column: &str) -> &'a str {
        self.sheet
            .column_index(column)
            .and_then(|idx| self.row.cells.get(idx))
            .map_or("", String::as_str)
    }

    /// Trimmed cell text, `None` when blank.
    pub fn non_blank(&self, column: &str) -> Option<&'a str> {
        let value = self.get(column).trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    pub fn line(&self) -> usize {
        self.row.line
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the first sheet with the provided name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Insert a sheet, replacing any existing sheet of the same name in place.
    pub fn insert(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Display for Sheet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.name, self.headers.join(" | "))?;
        for row in &self.rows {
            writeln!(f, "{:>4}: {}", row.line, row.cells.join(" | "))?;
        }
        Ok(())
    }
}
