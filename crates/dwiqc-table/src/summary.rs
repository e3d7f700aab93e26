//! Group-level statistics over a QC table

use serde::Serialize;

use crate::record::Cell;
use crate::table::GroupTable;
use crate::SUBJECT_FIELD;

/// Statistics of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Rows with a numeric value in this column
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Summary of a whole group table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub rows: usize,
    /// Subjects that occur in more than one row, in first-seen order
    pub repeated_subjects: Vec<String>,
    pub columns: Vec<ColumnSummary>,
}

/// Per-column statistics of every numeric metric.
///
/// Repeated subjects are counted once per row. They are listed in
/// [`GroupSummary::repeated_subjects`] so that callers can decide.
pub fn summarize(table: &GroupTable) -> GroupSummary {
    let mut columns = Vec::new();
    for name in table.columns() {
        if name == SUBJECT_FIELD {
            continue;
        }
        let values: Vec<f64> = table
            .column_values(name)
            .unwrap_or_default()
            .into_iter()
            .filter_map(Cell::as_f64)
            .collect();
        if let Some(summary) = summarize_column(name, &values) {
            columns.push(summary);
        }
    }

    let mut repeated_subjects: Vec<String> = Vec::new();
    for cell in table.column_values(SUBJECT_FIELD).unwrap_or_default() {
        if cell.is_null() {
            continue;
        }
        let subject = cell.render();
        if table.rows_for_subject(&subject).len() > 1 && !repeated_subjects.contains(&subject) {
            repeated_subjects.push(subject);
        }
    }

    GroupSummary {
        rows: table.len(),
        repeated_subjects,
        columns,
    }
}

fn summarize_column(name: &str, values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.len() > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(ColumnSummary {
        name: name.to_string(),
        count: values.len(),
        mean,
        std,
        min,
        max,
    })
}

impl GroupSummary {
    /// One row per metric, ready for [`crate::fixed_width::render`]
    pub fn to_table(&self) -> GroupTable {
        let columns = ["Metric", "N", "Mean", "Std", "Min", "Max"];
        let mut table = GroupTable::with_columns(columns.iter().map(|c| c.to_string()).collect());
        for c in &self.columns {
            table.push_row(vec![
                Cell::Text(c.name.clone()),
                Cell::Number(c.count as f64),
                Cell::from(c.mean),
                Cell::from(c.std),
                Cell::from(c.min),
                Cell::from(c.max),
            ]);
        }
        table
    }
}
