//! Labelled result tables with CSV export.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One labelled row of integer cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<u64>,
}

/// A named table of integer measurements.
///
/// `Display` renders right-aligned columns; [`ResultTable::to_csv`] renders
/// the export format (first header cell empty, `;` by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    label: String,
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ResultTable {
    /// Default CSV separator.
    pub const SEPARATOR: char = ';';

    pub fn new(label: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            label: label.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    ///
    /// # Panics
    /// If `cells` does not have one value per column.
    pub fn push_row(&mut self, label: impl Into<String>, cells: Vec<u64>) {
        assert_eq!(
            cells.len(),
            self.columns.len(),
            "row width must match the column count"
        );
        self.rows.push(TableRow {
            label: label.into(),
            cells,
        });
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Values of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<u64>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.cells[index]).collect())
    }

    /// Text fields holding the separator, a quote or a line break are
    /// quoted, with inner quotes doubled.
    pub fn to_csv(&self, separator: char) -> String {
        let mut out = String::new();
        for column in &self.columns {
            out.push(separator);
            out.push_str(&csv_field(column, separator));
        }
        out.push('\n');
        for row in &self.rows {
            out.push_str(&csv_field(&row.label, separator));
            for cell in &row.cells {
                out.push(separator);
                out.push_str(&cell.to_string());
            }
            out.push('\n');
        }
        out
    }

    /// Writes [`to_csv`](Self::to_csv) output to `path`.
    pub fn write_csv(&self, path: impl AsRef<Path>, separator: char) -> Result<()> {
        fs::write(path, self.to_csv(separator))?;
        Ok(())
    }
}

fn csv_field(text: &str, separator: char) -> Cow<'_, str> {
    if text.contains([separator, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                self.rows
                    .iter()
                    .map(|r| r.cells[i].to_string().len())
                    .fold(name.len(), usize::max)
            })
            .collect();

        writeln!(f, "{}", self.label)?;
        write!(f, "{:>label_width$}", "")?;
        for (name, width) in self.columns.iter().zip(widths.iter().copied()) {
            write!(f, " {name:>width$}")?;
        }
        for row in &self.rows {
            write!(f, "\n{:>label_width$}", row.label)?;
            for (cell, width) in row.cells.iter().zip(widths.iter().copied()) {
                write!(f, " {cell:>width$}")?;
            }
        }
        Ok(())
    }
}
