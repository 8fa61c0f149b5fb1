//! `legiscrub run` / `update` / `validate`: config-driven matching and cleanup.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use legiscrub_io::csv::{read_table_with_encoding, write_table, Encoding};
use legiscrub_io::json::write_json;
use legiscrub_recon::overrides::NonMatch;
use legiscrub_recon::{engine, PipelineConfig};
use tracing::info;

use crate::exit_codes::{EXIT_ERROR, EXIT_INPUT_NOT_FOUND, EXIT_UNMATCHED};
use crate::CliError;

#[derive(Args)]
pub struct PipelineArgs {
    /// Table to clean (caucus member records)
    #[arg(long, short = 't', alias = "mcatts")]
    pub target: PathBuf,

    /// Reference table overrides are copied from
    #[arg(long, short = 'r', alias = "legislators")]
    pub reference: PathBuf,

    /// Where to write the cleaned CSV
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Pipeline config (TOML); without it the legislator column names are used
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Also write the run report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Input encoding of both tables (utf-8 or windows-1252)
    #[arg(long, default_value = "utf-8")]
    pub encoding: Encoding,

    /// Exit with code 8 when any target row had no reference match
    #[arg(long)]
    pub fail_on_unmatched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stages {
    /// match/override, normalize, prune
    All,
    /// match/override only
    MatchOnly,
}

pub fn cmd_pipeline(args: PipelineArgs, stages: Stages) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;

    info!("loading {}", args.target.display());
    let target = read_table_with_encoding(&args.target, args.encoding)?;
    info!("loading {}", args.reference.display());
    let reference = read_table_with_encoding(&args.reference, args.encoding)?;

    let output = match stages {
        Stages::All => engine::run(target, &reference, &config)?,
        Stages::MatchOnly => engine::update(target, &reference, &config)?,
    };

    print_non_matches(&mut io::stdout().lock(), &output.report.non_matches)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write to stdout: {e}")))?;

    write_table(&output.table, &args.output)?;
    info!("saved {} rows to {}", output.table.len(), args.output.display());

    if let Some(path) = &args.report {
        write_json(&output.report, path)?;
        info!("wrote report to {}", path.display());
    }

    if args.fail_on_unmatched && !output.report.all_matched() {
        return Err(CliError::new(
            EXIT_UNMATCHED,
            format!("{} target row(s) had no reference match", output.report.summary.unmatched),
        )
        .with_hint("the output was still written; the rows are listed above"));
    }
    Ok(())
}

pub fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&path))?;

    println!("{}: valid", path.display());
    println!("  name:      {}", config.name);
    println!("  target:    ({}, {})", config.target.id, config.target.period);
    println!("  reference: ({}, {})", config.reference.id, config.reference.period);
    for o in &config.overrides {
        println!("  override:  {} <- {}", o.target, o.source);
    }
    match config.prune.active_column() {
        Some(column) => println!("  prune:     {column}"),
        None => println!("  prune:     off"),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, CliError> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CliError::new(
            EXIT_INPUT_NOT_FOUND,
            format!("config file not found: {}", path.display()),
        ),
        _ => CliError::new(EXIT_ERROR, format!("cannot read config {}: {e}", path.display())),
    })?;
    let config = PipelineConfig::from_toml(&text)?;
    info!("using config '{}' from {}", config.name, path.display());
    Ok(config)
}

/// Human-readable miss list, or the all-clear line.
fn print_non_matches<W: Write>(out: &mut W, non_matches: &[NonMatch]) -> io::Result<()> {
    if non_matches.is_empty() {
        return writeln!(out, "All entries were successfully matched.");
    }

    writeln!(out, "The following target rows had no match in the reference table:")?;
    writeln!(out, "ID, Congress, Name")?;
    writeln!(out, "{}", "-".repeat(40))?;
    for entry in non_matches {
        writeln!(out, "{entry}")?;
    }
    writeln!(out, "Total non-matches: {}", non_matches.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use legiscrub_recon::Value;

    fn render(non_matches: &[NonMatch]) -> String {
        let mut buf = Vec::new();
        print_non_matches(&mut buf, non_matches).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn all_matched_line() {
        assert_eq!(render(&[]), "All entries were successfully matched.\n");
    }

    #[test]
    fn lists_each_miss_then_total() {
        let out = render(&[
            NonMatch {
                id: Value::from_field("99999"),
                period: Value::from_field("110"),
                name: "Zoë Lofgren".into(),
            },
            NonMatch {
                id: Value::from_field("12"),
                period: Value::from_field("111"),
                name: String::new(),
            },
        ]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "ID, Congress, Name");
        assert_eq!(lines[2], "-".repeat(40));
        assert_eq!(lines[3], "99999, 110, Zoë Lofgren");
        assert_eq!(lines[4], "12, 111, ");
        assert_eq!(lines[5], "Total non-matches: 2");
    }
}
