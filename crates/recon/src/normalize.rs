//! Accent stripping.
//!
//! Text is decomposed, every character with a non-zero canonical combining
//! class is dropped, Latin stroke letters (which have no decomposition) are
//! folded to their base letter, and the remainder is recomposed. The result
//! is stable under repeated application.

use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

use crate::config::NormalizeConfig;
use crate::error::ReconError;
use crate::model::{Table, Value};

/// Which Unicode decomposition separates base letters from their marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionForm {
    /// NFD. Leaves compatibility characters (ligatures, superscripts) alone.
    Canonical,
    /// NFKD. Also folds compatibility characters, e.g. "ﬁ" -> "fi".
    Compatibility,
}

impl Default for DecompositionForm {
    fn default() -> Self {
        Self::Canonical
    }
}

/// Remove diacritics from `text`, preserving case and everything else.
pub fn strip_accents(text: &str, form: DecompositionForm) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    match form {
        DecompositionForm::Canonical => strip_marks(text.nfd()),
        DecompositionForm::Compatibility => strip_marks(text.nfkd()),
    }
}

/// `strip_accents` with canonical decomposition.
pub fn remove_accents(text: &str) -> String {
    strip_accents(text, DecompositionForm::Canonical)
}

fn strip_marks(decomposed: impl Iterator<Item = char>) -> String {
    let bare: String = decomposed
        .filter(|&c| canonical_combining_class(c) == 0)
        .map(fold_stroke)
        .collect();
    bare.nfc().collect()
}

/// Stroke letters are atomic in Unicode, so decomposition leaves them intact.
fn fold_stroke(c: char) -> char {
    match c {
        'Ø' => 'O',
        'ø' => 'o',
        'Đ' => 'D',
        'đ' => 'd',
        'Ł' => 'L',
        'ł' => 'l',
        'Ħ' => 'H',
        'ħ' => 'h',
        'Ŧ' => 'T',
        'ŧ' => 't',
        'Ɨ' => 'I',
        'ɨ' => 'i',
        'Ƀ' => 'B',
        'ƀ' => 'b',
        'Ǥ' => 'G',
        'ǥ' => 'g',
        other => other,
    }
}

/// Normalize one cell. Only text is touched; numbers and missing cells pass
/// through unchanged.
pub fn normalize(value: Value, form: DecompositionForm) -> Value {
    match value {
        Value::Text(s) => Value::Text(strip_accents(&s, form)),
        other => other,
    }
}

/// Output of the normalize stage.
#[derive(Debug)]
pub struct Normalized {
    pub table: Table,
    /// Cells whose text changed.
    pub changed_cells: usize,
}

/// Apply `normalize` to every cell, and to header names when configured.
///
/// Only fails when header normalization makes two column names collide.
pub fn normalize_table(mut table: Table, config: &NormalizeConfig) -> Result<Normalized, ReconError> {
    let form = config.form;
    if config.headers {
        table.rename_columns(|h| strip_accents(h, form))?;
    }

    let mut changed_cells = 0;
    for row in table.rows_mut() {
        for cell in row.iter_mut() {
            if let Value::Text(s) = cell {
                let stripped = strip_accents(s, form);
                if stripped != *s {
                    *s = stripped;
                    changed_cells += 1;
                }
            }
        }
    }

    debug!(changed_cells, "normalized table");
    Ok(Normalized {
        table,
        changed_cells,
    })
}
