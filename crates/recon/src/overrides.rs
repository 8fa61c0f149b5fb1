use std::fmt;

use serde::Serialize;

use crate::config::FieldOverride;
use crate::error::ReconError;
use crate::matcher::KeyIndices;
use crate::model::{RowView, Table, Value};

/// A target row whose key had no reference row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonMatch {
    pub id: Value,
    pub period: Value,
    pub name: String,
}

impl fmt::Display for NonMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.id, self.period, self.name)
    }
}

#[derive(Debug, Clone)]
struct PlannedOverride {
    target: usize,
    source: String,
}

/// Field overrides resolved against the target table's header.
#[derive(Debug, Clone)]
pub struct OverridePlan {
    entries: Vec<PlannedOverride>,
    overrides: Vec<FieldOverride>,
}

impl OverridePlan {
    /// Every override target must be a column of `target`.
    pub fn resolve(overrides: &[FieldOverride], target: &Table) -> Result<Self, ReconError> {
        let entries = overrides
            .iter()
            .map(|o| {
                Ok(PlannedOverride {
                    target: target.require_column("target", &o.target)?,
                    source: o.source.clone(),
                })
            })
            .collect::<Result<Vec<_>, ReconError>>()?;
        Ok(Self {
            entries,
            overrides: overrides.to_vec(),
        })
    }

    /// Overrides whose source column the reference header lacks. They are
    /// skipped on every row.
    pub fn missing_sources<'a>(&'a self, reference_headers: &[String]) -> Vec<&'a FieldOverride> {
        self.overrides
            .iter()
            .filter(|o| !reference_headers.iter().any(|h| h == &o.source))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Applies an `OverridePlan` row by row and collects the rows that missed.
#[derive(Debug)]
pub struct OverrideApplier<'p> {
    plan: &'p OverridePlan,
    keys: KeyIndices,
    label: Option<usize>,
    matched: usize,
    non_matches: Vec<NonMatch>,
}

impl<'p> OverrideApplier<'p> {
    /// `keys` and `label` are positions in the target rows and only feed the
    /// non-match records.
    pub fn new(plan: &'p OverridePlan, keys: KeyIndices, label: Option<usize>) -> Self {
        Self {
            plan,
            keys,
            label,
            matched: 0,
            non_matches: Vec::new(),
        }
    }

    /// Overwrite the planned target cells from `reference` and return `true`;
    /// with no reference row, leave `row` alone, record a `NonMatch` and
    /// return `false`. A source column the reference row lacks is skipped.
    pub fn apply(&mut self, row: &mut [Value], reference: Option<RowView<'_>>) -> bool {
        let Some(reference) = reference else {
            let record = self.non_match(row);
            self.non_matches.push(record);
            return false;
        };

        for entry in &self.plan.entries {
            if let (Some(value), Some(cell)) = (reference.get(&entry.source), row.get_mut(entry.target)) {
                *cell = value.clone();
            }
        }
        self.matched += 1;
        true
    }

    fn non_match(&self, row: &[Value]) -> NonMatch {
        let cell = |i: usize| row.get(i).cloned().unwrap_or(Value::Missing);
        NonMatch {
            id: cell(self.keys.id),
            period: cell(self.keys.period),
            name: self
                .label
                .and_then(|i| row.get(i))
                .map(|v| v.as_field().to_string())
                .unwrap_or_default(),
        }
    }

    /// End of the pass: (matched count, non-matches in row order).
    pub fn finish(self) -> (usize, Vec<NonMatch>) {
        (self.matched, self.non_matches)
    }
}
