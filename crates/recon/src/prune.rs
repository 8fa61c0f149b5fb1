use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::model::Table;

/// Non-fatal: the column to prune was not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneWarning {
    pub column: String,
}

impl fmt::Display for PruneWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column '{}' not found; nothing pruned", self.column)
    }
}

#[derive(Debug)]
pub struct Pruned {
    pub table: Table,
    pub warning: Option<PruneWarning>,
}

/// Drop `column` from the header and every row. An absent column leaves the
/// table as it was and returns (and logs) a warning instead.
pub fn prune_column(mut table: Table, column: &str) -> Pruned {
    match table.column_index(column) {
        Some(idx) => {
            table.remove_column(idx);
            info!(column, rows = table.len(), "removed column");
            Pruned {
                table,
                warning: None,
            }
        }
        None => {
            let warning = PruneWarning {
                column: column.to_string(),
            };
            warn!("{warning}");
            Pruned {
                table,
                warning: Some(warning),
            }
        }
    }
}
