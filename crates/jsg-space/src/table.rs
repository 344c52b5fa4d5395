use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;
use jsg_config::EXECUTABLE_COLUMN;
use jsg_core::{ErrorInfo, JsgError};
use serde::{Deserialize, Serialize};

/// One concrete command: an executable plus one value per parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRow {
    /// Index of the originating algorithm in [`jsg_config::ExperimentConfig::algorithms`].
    pub algorithm: usize,
    /// Executable identifier, the first column of every row.
    pub executable: String,
    /// `(column, value)` pairs in the algorithm's canonical column order.
    pub cells: Vec<(String, String)>,
}

impl InvocationRow {
    /// Value of `column`, or `None` when this row's algorithm lacks it.
    pub fn get(&self, column: &str) -> Option<&str> {
        if column == EXECUTABLE_COLUMN {
            return Some(&self.executable);
        }
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Parameter values in canonical order, executable excluded.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, value)| value.as_str())
    }

    /// Column names in canonical order, executable first.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(EXECUTABLE_COLUMN).chain(self.cells.iter().map(|(name, _)| name.as_str()))
    }
}

/// Ordered collection of invocations across one or more algorithms.
///
/// `columns` is the union of all rows' columns in first-seen order, with
/// the executable column first. Rows of algorithms that lack a column
/// simply have no cell for it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvocationTable {
    columns: Vec<String>,
    rows: Vec<InvocationRow>,
}

impl InvocationTable {
    /// Creates an empty table holding only the executable column.
    pub fn new() -> Self {
        Self {
            columns: vec![EXECUTABLE_COLUMN.to_string()],
            rows: Vec::new(),
        }
    }

    /// Appends rows, registering any columns not yet present.
    pub fn extend(&mut self, rows: Vec<InvocationRow>) {
        for row in &rows {
            for (name, _) in &row.cells {
                if !self.has_column(name) {
                    self.columns.push(name.clone());
                }
            }
        }
        self.rows.extend(rows);
    }

    /// Column names, executable first.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in generation order.
    pub fn rows(&self) -> &[InvocationRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `column` is part of the table schema.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    /// Distinct values of `column` in first-seen order.
    ///
    /// `None` stands for rows that have no cell for the column.
    pub fn distinct(&self, column: &str) -> Vec<Option<&str>> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for row in &self.rows {
            let value = row.get(column);
            if seen.insert(value) {
                ordered.push(value);
            }
        }
        ordered
    }

    /// Sub-table of the rows matching `keep`, with the same schema.
    pub fn subset<F>(&self, mut keep: F) -> InvocationTable
    where
        F: FnMut(&InvocationRow) -> bool,
    {
        InvocationTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Writes the table as CSV with a header row; absent cells are empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), JsgError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        writer
            .write_record(&self.columns)
            .map_err(|err| wrap_csv("space-csv-header", err))?;
        for row in &self.rows {
            let record: Vec<&str> = self
                .columns
                .iter()
                .map(|column| row.get(column).unwrap_or(""))
                .collect();
            writer
                .write_record(&record)
                .map_err(|err| wrap_csv("space-csv-row", err))?;
        }
        writer
            .flush()
            .map_err(|err| wrap_csv("space-csv-flush", err.into()))?;
        Ok(())
    }

    /// Writes the table as CSV to `path`.
    pub fn write_csv_path(&self, path: &Path) -> Result<(), JsgError> {
        let file = File::create(path).map_err(|err| JsgError::io("space-csv-create", path, err))?;
        self.write_csv(BufWriter::new(file))
    }
}

fn wrap_csv(code: &str, err: csv::Error) -> JsgError {
    JsgError::Io(ErrorInfo::new(code, "CSV export failure").with_hint(err.to_string()))
}
