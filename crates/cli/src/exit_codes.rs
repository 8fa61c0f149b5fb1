//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | CLI usage error (bad args; clap also exits with 2)  |
//! | 3    | Input file not found                                |
//! | 4    | Required column missing from a table                |
//! | 5    | CSV parse error                                     |
//! | 6    | Output could not be written                         |
//! | 7    | Invalid pipeline config                             |
//! | 8    | Unmatched rows with `--fail-on-unmatched`           |

use legiscrub_io::TableIoError;
use legiscrub_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A target, reference, input or config file does not exist.
pub const EXIT_INPUT_NOT_FOUND: u8 = 3;

/// A key column or override target is not in the table header.
pub const EXIT_MISSING_COLUMN: u8 = 4;

/// Malformed CSV: bad quoting, ragged rows, duplicate or missing header.
pub const EXIT_PARSE: u8 = 5;

/// Output CSV or report could not be written.
pub const EXIT_WRITE: u8 = 6;

/// Config TOML failed to parse or validate.
pub const EXIT_CONFIG: u8 = 7;

/// The run finished and wrote its output, but some target rows had no
/// reference match and `--fail-on-unmatched` was given.
pub const EXIT_UNMATCHED: u8 = 8;

pub fn io_exit_code(err: &TableIoError) -> u8 {
    match err {
        TableIoError::NotFound(_) => EXIT_INPUT_NOT_FOUND,
        TableIoError::Read { .. } => EXIT_ERROR,
        TableIoError::Parse { .. } => EXIT_PARSE,
        TableIoError::Write { .. } => EXIT_WRITE,
    }
}

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MissingColumn { .. } => EXIT_MISSING_COLUMN,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::DuplicateColumn(_) | ReconError::RowWidth { .. } => EXIT_ERROR,
    }
}
