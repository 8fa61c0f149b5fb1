use std::collections::{BTreeMap, HashMap};
use std::fmt;

use ordered_float::OrderedFloat;
use serde::Serialize;
use tracing::warn;

use crate::error::ReconError;
use crate::model::{RowView, Table, Value};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// One half of a composite key. Numbers compare by value, text exactly, and
/// a number never equals a text part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Number(OrderedFloat<f64>),
    Text(String),
}

impl KeyPart {
    /// `None` for missing cells: a row without a full key can never match.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                // -0.0 and 0.0 are the same key
                let v = if n.value() == 0.0 { 0.0 } else { n.value() };
                Some(Self::Number(OrderedFloat(v)))
            }
            Value::Text(s) => Some(Self::Text(s.clone())),
            Value::Missing => None,
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n.0),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// (identifier, period), e.g. (legislator id, congress number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    pub id: KeyPart,
    pub period: KeyPart,
}

impl CompositeKey {
    pub fn new(id: KeyPart, period: KeyPart) -> Self {
        Self { id, period }
    }

    pub fn from_values(id: &Value, period: &Value) -> Option<Self> {
        Some(Self {
            id: KeyPart::from_value(id)?,
            period: KeyPart::from_value(period)?,
        })
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.id, self.period)
    }
}

/// Names of the two key columns in one table.
#[derive(Debug, Clone, Copy)]
pub struct KeyColumns<'a> {
    pub id: &'a str,
    pub period: &'a str,
}

impl<'a> KeyColumns<'a> {
    /// Resolve both names to positions in `table`; `role` names the table
    /// in the error.
    pub fn resolve(&self, table: &Table, role: &str) -> Result<KeyIndices, ReconError> {
        Ok(KeyIndices {
            id: table.require_column(role, self.id)?,
            period: table.require_column(role, self.period)?,
        })
    }
}

/// Key column positions within one table's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyIndices {
    pub id: usize,
    pub period: usize,
}

impl KeyIndices {
    pub fn key_of(&self, row: &[Value]) -> Option<CompositeKey> {
        CompositeKey::from_values(row.get(self.id)?, row.get(self.period)?)
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// A key that appeared more than once in the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: String,
    pub occurrences: usize,
    /// Zero-based reference row that won (the last occurrence).
    pub kept_row: usize,
}

/// Composite key -> reference row. Built once per run.
#[derive(Debug)]
pub struct MatchIndex<'a> {
    table: &'a Table,
    rows: HashMap<CompositeKey, usize>,
    duplicates: Vec<DuplicateKey>,
    unkeyed: usize,
}

impl<'a> MatchIndex<'a> {
    /// Index every reference row by its composite key in a single pass.
    ///
    /// A repeated key keeps the later row. Repeats are reported through
    /// `duplicates()` and logged. Rows with a missing key cell are skipped.
    pub fn build(table: &'a Table, columns: KeyColumns<'_>) -> Result<Self, ReconError> {
        let key_idx = columns.resolve(table, "reference")?;

        let mut rows: HashMap<CompositeKey, usize> = HashMap::with_capacity(table.len());
        let mut repeats: BTreeMap<CompositeKey, usize> = BTreeMap::new();
        let mut unkeyed = 0;

        for (i, row) in table.rows().iter().enumerate() {
            let Some(key) = key_idx.key_of(row) else {
                unkeyed += 1;
                continue;
            };
            if rows.insert(key.clone(), i).is_some() {
                *repeats.entry(key).or_insert(1) += 1;
            }
        }

        let duplicates: Vec<DuplicateKey> = repeats
            .into_iter()
            .map(|(key, occurrences)| {
                let kept_row = rows.get(&key).copied().unwrap_or_default();
                warn!(
                    key = %key,
                    occurrences,
                    kept_row,
                    "duplicate reference key; keeping the last row"
                );
                DuplicateKey {
                    key: key.to_string(),
                    occurrences,
                    kept_row,
                }
            })
            .collect();

        if unkeyed > 0 {
            warn!(rows = unkeyed, "reference rows with an empty key cell were not indexed");
        }

        Ok(Self {
            table,
            rows,
            duplicates,
            unkeyed,
        })
    }

    /// Exact-equality probe. A miss is `None`, not an error.
    pub fn lookup(&self, key: &CompositeKey) -> Option<RowView<'a>> {
        let &i = self.rows.get(key)?;
        self.table.row(i)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn duplicates(&self) -> &[DuplicateKey] {
        &self.duplicates
    }

    /// Reference rows skipped because a key cell was empty.
    pub fn unkeyed(&self) -> usize {
        self.unkeyed
    }
}
