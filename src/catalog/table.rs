use std::{fs::File, io::Read, path::Path};

use csv::ReaderBuilder;

use crate::error::AppResult;

/// An in-memory tabular dataset with named columns
///
/// Empty cells are stored as `None` so that "absent" and "present but empty"
/// collapse to the same thing, as they do in the upstream CSV exports.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Reads a CSV file with a header row
    pub fn from_csv_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Reads CSV data with a header row from any reader
    pub fn from_csv_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row = (0..columns.len())
                .map(|i| record.get(i).filter(|s| !s.is_empty()).map(str::to_string))
                .collect();
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
