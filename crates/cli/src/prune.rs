//! `legiscrub prune`: drop one column from a CSV.

use std::path::{Path, PathBuf};

use legiscrub_io::csv::{read_table_with_encoding, write_table, Encoding};
use legiscrub_recon::prune::prune_column;
use tracing::info;

use crate::CliError;

pub fn cmd_prune(
    input: PathBuf,
    output: Option<PathBuf>,
    column: String,
    encoding: Encoding,
) -> Result<(), CliError> {
    if column.is_empty() {
        return Err(CliError::usage("--column must not be empty"));
    }
    let output = output.unwrap_or_else(|| default_output(&input, &column));

    info!("loading {}", input.display());
    let table = read_table_with_encoding(&input, encoding)?;

    // An absent column is a warning; the table is still written unchanged
    let pruned = prune_column(table, &column);
    write_table(&pruned.table, &output)?;
    info!("saved {}", output.display());
    Ok(())
}

/// `data/members.csv` + `statenm` -> `data/members_no_statenm.csv`
pub fn default_output(input: &Path, column: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_no_{column}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_keeps_directory() {
        assert_eq!(
            default_output(Path::new("data/updated_mcatts.csv"), "statenm"),
            PathBuf::from("data/updated_mcatts_no_statenm.csv")
        );
    }

    #[test]
    fn default_output_without_extension() {
        assert_eq!(
            default_output(Path::new("members"), "party"),
            PathBuf::from("members_no_party.csv")
        );
    }
}
