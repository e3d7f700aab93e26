//! In-memory group table

use crate::SUBJECT_FIELD;
use crate::record::{Cell, MetricRecord};

/// Ordered rows of metric records over the union of their fields.
///
/// Columns keep the order in which they were first seen. Every row holds one
/// cell per column; rows that predate a column hold [`Cell::Null`] there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with a fixed column set and no rows. Names are assumed valid.
    pub(crate) fn with_columns(columns: Vec<String>) -> Self {
        GroupTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row that already matches the column set.
    pub(crate) fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Append `record` as the last row and return the columns it introduced.
    pub fn push(&mut self, record: &MetricRecord) -> Vec<String> {
        let mut added = Vec::new();
        for name in record.names() {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
                added.push(name.to_string());
            }
        }
        if !added.is_empty() {
            let width = self.columns.len();
            for row in &mut self.rows {
                row.resize(width, Cell::Null);
            }
        }

        let row = self
            .columns
            .iter()
            .map(|c| record.get(c).cloned().unwrap_or(Cell::Null))
            .collect();
        self.rows.push(row);
        added
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn raw_rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Row `index` as a record. Null cells are left out.
    pub fn row(&self, index: usize) -> Option<MetricRecord> {
        let cells = self.rows.get(index)?;
        let mut record = MetricRecord::new();
        for (name, cell) in self.columns.iter().zip(cells) {
            if !cell.is_null() {
                record.push_unchecked(name.clone(), cell.clone());
            }
        }
        Some(record)
    }

    pub fn records(&self) -> impl Iterator<Item = MetricRecord> + '_ {
        (0..self.rows.len()).filter_map(|i| self.row(i))
    }

    /// All cells of one column, top to bottom
    pub fn column_values(&self, column: &str) -> Option<Vec<&Cell>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(|r| &r[col]).collect())
    }

    /// Indices of the rows recorded for `subject`
    pub fn rows_for_subject(&self, subject: &str) -> Vec<usize> {
        let Some(col) = self.column_index(SUBJECT_FIELD) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| subject_matches(&r[col], subject))
            .map(|(i, _)| i)
            .collect()
    }
}

// Subjects read back from disk may have become numbers ("42").
fn subject_matches(cell: &Cell, subject: &str) -> bool {
    match cell {
        Cell::Text(s) => s == subject,
        Cell::Number(_) => cell.render() == subject,
        Cell::Null => false,
    }
}
