use tracing::{info, warn};

use crate::config::{FieldOverride, PipelineConfig};
use crate::error::ReconError;
use crate::matcher::MatchIndex;
use crate::model::Table;
use crate::normalize::normalize_table;
use crate::overrides::{OverrideApplier, OverridePlan};
use crate::prune::prune_column;
use crate::report::{MatchOutcome, PruneStatus, RunReport};

/// Output of the match/override stage.
#[derive(Debug)]
pub struct Reconciled {
    pub table: Table,
    pub outcome: MatchOutcome,
}

/// Final table plus the end-of-run report.
#[derive(Debug)]
pub struct PipelineOutput {
    pub table: Table,
    pub report: RunReport,
}

/// Run every stage in order: match/override, normalize, prune.
///
/// Each stage takes the complete table from the one before it. Row count and
/// order never change; only the prune stage changes the column set.
pub fn run(target: Table, reference: &Table, config: &PipelineConfig) -> Result<PipelineOutput, ReconError> {
    let rows = target.len();

    let reconciled = reconcile(target, reference, config)?;

    let normalized = normalize_table(reconciled.table, &config.normalize)?;
    info!(changed_cells = normalized.changed_cells, "stripped accents");

    let mut stages = vec!["match", "normalize"];
    let (table, prune) = match config.prune.active_column() {
        Some(column) => {
            stages.push("prune");
            let pruned = prune_column(normalized.table, column);
            let status = match pruned.warning {
                Some(w) => PruneStatus::NotFound { column: w.column },
                None => PruneStatus::Removed {
                    column: column.to_string(),
                },
            };
            (pruned.table, status)
        }
        None => (normalized.table, PruneStatus::Disabled),
    };
    debug_assert_eq!(table.len(), rows);

    let report = RunReport::new(
        &config.name,
        &stages,
        rows,
        reconciled.outcome,
        normalized.changed_cells,
        prune,
    );
    Ok(PipelineOutput { table, report })
}

/// Match/override stage only; text and columns are left as they are.
pub fn update(target: Table, reference: &Table, config: &PipelineConfig) -> Result<PipelineOutput, ReconError> {
    let rows = target.len();
    let reconciled = reconcile(target, reference, config)?;
    let report = RunReport::new(
        &config.name,
        &["match"],
        rows,
        reconciled.outcome,
        0,
        PruneStatus::Disabled,
    );
    Ok(PipelineOutput {
        table: reconciled.table,
        report,
    })
}

/// Resolve every target row against the reference table and apply the
/// configured overrides to the rows that match.
///
/// Key columns and override targets must exist (`MissingColumn` otherwise).
/// Override sources the reference lacks, a missing label column and
/// duplicate reference keys are logged and reported, not fatal.
pub fn reconcile(mut target: Table, reference: &Table, config: &PipelineConfig) -> Result<Reconciled, ReconError> {
    let target_keys = config.target.key_columns().resolve(&target, "target")?;
    let index = MatchIndex::build(reference, config.reference.key_columns())?;
    let plan = OverridePlan::resolve(&config.overrides, &target)?;

    let label = config.target.label_column().and_then(|name| {
        let idx = target.column_index(name);
        if idx.is_none() {
            warn!(column = name, "label column not in target table; non-match names will be empty");
        }
        idx
    });

    let skipped_overrides: Vec<FieldOverride> = plan
        .missing_sources(reference.headers())
        .into_iter()
        .cloned()
        .collect();
    for o in &skipped_overrides {
        warn!(
            source = %o.source,
            target = %o.target,
            "reference table has no source column; override skipped"
        );
    }

    info!(
        target_rows = target.len(),
        reference_keys = index.len(),
        overrides = plan.len(),
        "matching target rows against reference"
    );

    let mut applier = OverrideApplier::new(&plan, target_keys, label);
    for row in target.rows_mut() {
        let found = target_keys.key_of(row).and_then(|key| index.lookup(&key));
        applier.apply(row, found);
    }
    let (matched, non_matches) = applier.finish();
    info!(matched, unmatched = non_matches.len(), "match stage done");

    Ok(Reconciled {
        table: target,
        outcome: MatchOutcome {
            matched,
            non_matches,
            duplicate_keys: index.duplicates().to_vec(),
            unkeyed_reference_rows: index.unkeyed(),
            skipped_overrides,
        },
    })
}
