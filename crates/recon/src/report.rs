use serde::Serialize;

use crate::config::FieldOverride;
use crate::matcher::DuplicateKey;
use crate::overrides::NonMatch;

// ---------------------------------------------------------------------------
// Match stage outcome
// ---------------------------------------------------------------------------

/// What the match/override stage observed, besides the table itself.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub matched: usize,
    pub non_matches: Vec<NonMatch>,
    pub duplicate_keys: Vec<DuplicateKey>,
    pub unkeyed_reference_rows: usize,
    pub skipped_overrides: Vec<FieldOverride>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PruneStatus {
    Removed { column: String },
    NotFound { column: String },
    Disabled,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub stages: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub duplicate_reference_keys: usize,
    pub unkeyed_reference_rows: usize,
    pub normalized_cells: usize,
    /// `target <- source` for overrides whose source column was absent.
    pub skipped_overrides: Vec<String>,
    pub prune: PruneStatus,
}

/// End-of-run report. Misses and duplicates accumulate here instead of
/// aborting the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub non_matches: Vec<NonMatch>,
    pub duplicate_keys: Vec<DuplicateKey>,
}

impl RunReport {
    pub fn new(
        config_name: &str,
        stages: &[&str],
        rows: usize,
        outcome: MatchOutcome,
        normalized_cells: usize,
        prune: PruneStatus,
    ) -> Self {
        let summary = RunSummary {
            rows,
            matched: outcome.matched,
            unmatched: outcome.non_matches.len(),
            duplicate_reference_keys: outcome.duplicate_keys.len(),
            unkeyed_reference_rows: outcome.unkeyed_reference_rows,
            normalized_cells,
            skipped_overrides: outcome
                .skipped_overrides
                .iter()
                .map(|o| format!("{} <- {}", o.target, o.source))
                .collect(),
            prune,
        };

        Self {
            meta: RunMeta {
                config_name: config_name.to_string(),
                stages: stages.iter().map(|s| s.to_string()).collect(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            non_matches: outcome.non_matches,
            duplicate_keys: outcome.duplicate_keys,
        }
    }

    pub fn all_matched(&self) -> bool {
        self.non_matches.is_empty()
    }
}
