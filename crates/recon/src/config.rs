use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ReconError;
use crate::matcher::KeyColumns;
use crate::normalize::DecompositionForm;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Column names and stage switches for one pipeline run.
///
/// Every field has a default, and the defaults describe the legislator
/// datasets (member table keyed by `id`/`cong`, reference table keyed by
/// `id`/`congress`), so an empty TOML document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    /// Applied in order on every matched row.
    #[serde(default = "default_overrides")]
    pub overrides: Vec<FieldOverride>,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub prune: PruneConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            target: TargetConfig::default(),
            reference: ReferenceConfig::default(),
            overrides: default_overrides(),
            normalize: NormalizeConfig::default(),
            prune: PruneConfig::default(),
        }
    }
}

fn default_name() -> String {
    "legislators".into()
}

fn default_overrides() -> Vec<FieldOverride> {
    vec![
        FieldOverride::new("mc.name", "name"),
        FieldOverride::new("state", "state"),
        FieldOverride::new("statenm", "state"),
    ]
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// The table being cleaned.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_target_period")]
    pub period: String,
    /// Human-readable column quoted in the non-match report. Empty disables it.
    #[serde(default = "default_label")]
    pub label: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            period: default_target_period(),
            label: default_label(),
        }
    }
}

impl TargetConfig {
    pub fn key_columns(&self) -> KeyColumns<'_> {
        KeyColumns {
            id: &self.id,
            period: &self.period,
        }
    }

    pub fn label_column(&self) -> Option<&str> {
        if self.label.is_empty() {
            None
        } else {
            Some(&self.label)
        }
    }
}

/// The table overrides are copied from.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceConfig {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_reference_period")]
    pub period: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            period: default_reference_period(),
        }
    }
}

impl ReferenceConfig {
    pub fn key_columns(&self) -> KeyColumns<'_> {
        KeyColumns {
            id: &self.id,
            period: &self.period,
        }
    }
}

fn default_id() -> String {
    "id".into()
}

fn default_target_period() -> String {
    "cong".into()
}

fn default_reference_period() -> String {
    "congress".into()
}

fn default_label() -> String {
    "mc.name".into()
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Copy reference column `source` into target column `target` on a match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOverride {
    pub target: String,
    pub source: String,
}

impl FieldOverride {
    pub fn new(target: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalize + Prune
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeConfig {
    #[serde(default)]
    pub form: DecompositionForm,
    /// Also strip accents from header names.
    #[serde(default)]
    pub headers: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PruneConfig {
    #[serde(default = "default_prune_column")]
    pub column: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            column: default_prune_column(),
            enabled: true,
        }
    }
}

impl PruneConfig {
    /// The column to drop, or `None` when pruning is switched off.
    pub fn active_column(&self) -> Option<&str> {
        self.enabled.then_some(self.column.as_str())
    }
}

fn default_prune_column() -> String {
    "statenm".into()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        check_keys("target", &self.target.id, &self.target.period)?;
        check_keys("reference", &self.reference.id, &self.reference.period)?;

        let mut seen = HashSet::new();
        for (i, o) in self.overrides.iter().enumerate() {
            if o.target.is_empty() || o.source.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "override #{}: target and source must be non-empty",
                    i + 1
                )));
            }
            if !seen.insert(o.target.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "column '{}' is overridden more than once",
                    o.target
                )));
            }
            // Key cells must come out of the match stage unchanged
            if o.target == self.target.id || o.target == self.target.period {
                return Err(ReconError::ConfigValidation(format!(
                    "override target '{}' is a target key column",
                    o.target
                )));
            }
        }

        if self.prune.enabled && self.prune.column.is_empty() {
            return Err(ReconError::ConfigValidation(
                "prune.column must be non-empty when pruning is enabled".into(),
            ));
        }

        Ok(())
    }
}

fn check_keys(table: &str, id: &str, period: &str) -> Result<(), ReconError> {
    if id.is_empty() || period.is_empty() {
        return Err(ReconError::ConfigValidation(format!(
            "{table}: id and period columns must be non-empty"
        )));
    }
    if id == period {
        return Err(ReconError::ConfigValidation(format!(
            "{table}: id and period must be different columns, both are '{id}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
