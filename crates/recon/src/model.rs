use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A numeric cell. Keeps the spelling it was read with so output is written
/// back unchanged; compares by value, so "5" == "5.0".
#[derive(Debug, Clone)]
pub struct Number {
    raw: String,
    value: f64,
}

impl Number {
    /// Parse a finite decimal. `inf`/`nan` spellings stay text.
    pub fn parse(raw: &str) -> Option<Self> {
        let value: f64 = raw.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            value,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Integral values (ids, congress numbers) serialize as integers.
        if self.value.fract() == 0.0 && self.value.abs() < 9_007_199_254_740_992.0 {
            serializer.serialize_i64(self.value as i64)
        } else {
            serializer.serialize_f64(self.value)
        }
    }
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(Number),
    Missing,
}

impl Value {
    /// Type a raw CSV field: empty -> Missing, finite number -> Number, else Text.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            return Self::Missing;
        }
        match Number::parse(field) {
            Some(n) => Self::Number(n),
            None => Self::Text(field.to_string()),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// The CSV spelling of this value.
    pub fn as_field(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.as_str(),
            Self::Missing => "",
        }
    }

}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_field())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => n.serialize(serializer),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Header plus rows. Every row has exactly one value per header column, and
/// header names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Result<Self, ReconError> {
        check_unique(&headers)?;
        Ok(Self {
            headers,
            rows: Vec::new(),
        })
    }

    pub fn from_rows(
        headers: Vec<String>,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> Result<Self, ReconError> {
        let mut table = Self::new(headers)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ReconError> {
        if row.len() != self.headers.len() {
            return Err(ReconError::RowWidth {
                row: self.rows.len() + 1,
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Mutable access to cells; row width cannot change through a slice.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [Value]> {
        self.rows.iter_mut().map(|r| r.as_mut_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like `column_index`, but a missing column is an error naming `table`.
    pub fn require_column(&self, table: &str, name: &str) -> Result<usize, ReconError> {
        self.column_index(name)
            .ok_or_else(|| ReconError::missing_column(table, name))
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|values| RowView {
            headers: &self.headers,
            values,
        })
    }

    /// Cell at (`row`, `column`), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Remove the column at `index` from the header and every row.
    pub fn remove_column(&mut self, index: usize) -> Option<String> {
        if index >= self.headers.len() {
            return None;
        }
        for row in &mut self.rows {
            row.remove(index);
        }
        Some(self.headers.remove(index))
    }

    /// Rewrite every header name; fails if two names collide afterwards.
    pub fn rename_columns(&mut self, f: impl Fn(&str) -> String) -> Result<(), ReconError> {
        let renamed: Vec<String> = self.headers.iter().map(|h| f(h)).collect();
        check_unique(&renamed)?;
        self.headers = renamed;
        Ok(())
    }
}

fn check_unique(headers: &[String]) -> Result<(), ReconError> {
    let mut seen = HashSet::with_capacity(headers.len());
    for h in headers {
        if !seen.insert(h.as_str()) {
            return Err(ReconError::DuplicateColumn(h.clone()));
        }
    }
    Ok(())
}

/// A borrowed row with name-based access.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    headers: &'a [String],
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.values.get(idx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
