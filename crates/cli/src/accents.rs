//! `legiscrub accents`: strip diacritics from a CSV, a sample set, or stdin lines.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use legiscrub_io::csv::{read_table_with_encoding, write_table, Encoding};
use legiscrub_recon::config::NormalizeConfig;
use legiscrub_recon::normalize::{normalize_table, strip_accents, DecompositionForm};
use tracing::info;

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

const SAMPLES: [&str; 8] = [
    "Café",
    "naïve",
    "Résumé",
    "Façade",
    "GRÖSSE",
    "Niño",
    "Åland",
    "Søren Kierkegård",
];

pub struct AccentsArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub examples: bool,
    pub interactive: bool,
    pub compat: bool,
    pub encoding: Encoding,
}

/// Batch mode runs when both paths are given. With no flags at all the
/// sample table is printed, then interactive mode starts.
pub fn cmd_accents(args: AccentsArgs) -> Result<(), CliError> {
    let form = if args.compat {
        DecompositionForm::Compatibility
    } else {
        DecompositionForm::Canonical
    };

    let batch = match (&args.input, &args.output) {
        (Some(input), Some(output)) => {
            strip_file(input, output, form, args.encoding)?;
            true
        }
        (None, None) => false,
        _ => return Err(CliError::usage("--input and --output must be given together")),
    };

    let stdout_err = |e: io::Error| CliError::new(EXIT_ERROR, format!("cannot write to stdout: {e}"));

    if args.examples || (!batch && !args.interactive) {
        print_examples(&mut io::stdout().lock(), form).map_err(stdout_err)?;
    }
    if args.interactive || (!batch && !args.examples) {
        interactive(io::stdin().lock(), &mut io::stdout().lock(), form).map_err(stdout_err)?;
    }
    Ok(())
}

/// Every cell and every header name is stripped.
fn strip_file(
    input: &Path,
    output: &Path,
    form: DecompositionForm,
    encoding: Encoding,
) -> Result<(), CliError> {
    info!("loading {}", input.display());
    let table = read_table_with_encoding(input, encoding)?;
    let normalized = normalize_table(table, &NormalizeConfig { form, headers: true })?;
    write_table(&normalized.table, output)?;
    info!(
        changed_cells = normalized.changed_cells,
        "processed {} and saved results to {}",
        input.display(),
        output.display()
    );
    Ok(())
}

fn print_examples<W: Write>(out: &mut W, form: DecompositionForm) -> io::Result<()> {
    writeln!(out, "Original | Without Accents")?;
    writeln!(out, "{}", "-".repeat(30))?;
    for text in SAMPLES {
        writeln!(out, "{text} | {}", strip_accents(text, form))?;
    }
    Ok(())
}

/// Read lines until EOF and echo each one stripped. Blank lines are skipped.
fn interactive<R: BufRead, W: Write>(mut input: R, out: &mut W, form: DecompositionForm) -> io::Result<()> {
    writeln!(out, "\nEnter text to remove accents (Ctrl+D to exit):")?;
    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out, "\nExiting...")?;
            return Ok(());
        }
        let text = line.trim_end_matches(|c| c == '\n' || c == '\r');
        if text.is_empty() {
            continue;
        }
        writeln!(out, "{}", strip_accents(text, form))?;
    }
}
