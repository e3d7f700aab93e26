//! Metric records: ordered field name → value mappings

use std::fmt;

use serde::Serialize;

use crate::error::{TableError, TableResult};
use crate::format::format_float;
use crate::{NULL_TOKEN, SUBJECT_FIELD};

/// One table value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Null,
}

impl Cell {
    /// Interpret one token read back from a table file.
    ///
    /// A token becomes a [`Cell::Number`] only when writing that number again
    /// reproduces the token exactly. Anything else is kept verbatim as text,
    /// so values such as zero-padded subject IDs survive a rewrite.
    pub fn parse(token: &str) -> Cell {
        let token = token.trim();
        if token.is_empty() || token == NULL_TOKEN {
            return Cell::Null;
        }
        match token.parse::<f64>() {
            Ok(v) if !v.is_nan() && format_float(v) == token => Cell::Number(v),
            _ => Cell::Text(token.to_string()),
        }
    }

    /// Like [`Cell::parse`], but the token is never taken as a number.
    pub fn parse_text(token: &str) -> Cell {
        let token = token.trim();
        if token.is_empty() || token == NULL_TOKEN {
            return Cell::Null;
        }
        Cell::Text(token.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric value of the cell; text is accepted when it spells a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.parse::<f64>().ok().filter(|v| !v.is_nan()),
            Cell::Null => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text written to the table for this cell
    pub fn render(&self) -> String {
        match self {
            Cell::Number(v) => format_float(*v),
            Cell::Text(s) => s.clone(),
            Cell::Null => NULL_TOKEN.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_nan() { Cell::Null } else { Cell::Number(v) }
    }
}

impl From<f32> for Cell {
    fn from(v: f32) -> Self {
        Cell::from(v as f64)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

pub(crate) fn validate_field_name(name: &str) -> TableResult<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(TableError::InvalidFieldName(name.to_string()));
    }
    Ok(())
}

fn validate_value(field: &str, value: &Cell) -> TableResult<()> {
    if let Cell::Text(s) = value {
        if s.is_empty() || s == NULL_TOKEN || s.chars().any(char::is_whitespace) {
            return Err(TableError::InvalidValue {
                field: field.to_string(),
                value: s.clone(),
            });
        }
    }
    Ok(())
}

/// Named scalar metrics computed for one subject in one run.
///
/// Field order is insertion order. Which fields are present depends on the
/// inputs the caller had available; the table grows its columns to match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricRecord {
    fields: Vec<(String, Cell)>,
}

impl MetricRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record whose first field is the subject identifier
    pub fn for_subject(subject: &str) -> TableResult<Self> {
        let mut record = Self::new();
        record.insert(SUBJECT_FIELD, subject)?;
        Ok(record)
    }

    /// Set `name` to `value`. An existing field keeps its position.
    pub fn insert(&mut self, name: &str, value: impl Into<Cell>) -> TableResult<&mut Self> {
        validate_field_name(name)?;
        let value = value.into();
        validate_value(name, &value)?;
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
        Ok(self)
    }

    pub(crate) fn push_unchecked(&mut self, name: String, value: Cell) {
        self.fields.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get(SUBJECT_FIELD).and_then(Cell::as_text)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
