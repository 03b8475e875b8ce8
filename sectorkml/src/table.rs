//! In-memory table of raw string values, loaded from CSV.
//!
//! The table is immutable once loaded and is passed explicitly to every
//! later phase (legend building, row resolution, document assembly).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum TableError {
    Io(std::io::Error),
    Csv(csv::Error),
    Empty,
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::Io(e) => write!(f, "Failed to read data file: {e}"),
            TableError::Csv(e) => write!(f, "Failed to parse data file: {e}"),
            TableError::Empty => write!(
                f,
                "Data file is empty or contains no data rows. \
                 Ensure the file is a CSV with a header row."
            ),
        }
    }
}

impl std::error::Error for TableError {}

impl From<std::io::Error> for TableError {
    fn from(e: std::io::Error) -> Self {
        TableError::Io(e)
    }
}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        TableError::Csv(e)
    }
}

/// One data row: raw string values keyed by column name.
#[derive(Debug, Clone)]
pub struct Row(HashMap<String, String>);

impl Row {
    /// Trimmed value for `column`; empty string when the column is absent.
    pub fn value(&self, column: &str) -> &str {
        self.0.get(column).map(|v| v.trim()).unwrap_or("")
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Row(pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }
}

#[derive(Debug)]
pub struct DataTable {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl DataTable {
    /// Parse CSV from any reader. Rows whose cells are all empty are
    /// discarded; a table with no remaining rows is rejected.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            let map = headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            rows.push(Row(map));
        }

        if rows.is_empty() {
            return Err(TableError::Empty);
        }

        tracing::debug!(columns = headers.len(), rows = rows.len(), "loaded table");
        Ok(DataTable { headers, rows })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}
