// legiscrub CLI - match caucus member records against a legislator reference,
// strip accents and prune columns

mod accents;
mod exit_codes;
mod prune;
mod recon;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use legiscrub_io::csv::Encoding;
use legiscrub_io::TableIoError;
use legiscrub_recon::ReconError;
use tracing_subscriber::EnvFilter;

use exit_codes::{io_exit_code, recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "legiscrub")]
#[command(about = "Clean legislator tables: match against a reference, strip accents, prune columns")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Log level; takes precedence over -v and -q
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Match, override, strip accents and prune in one pass
    #[command(after_help = "\
Examples:
  legiscrub run --target mcatts_caucus.csv --reference legislators.csv -o cleaned.csv
  legiscrub run -t members.csv -r reference.csv -o out.csv --config icpsr.toml --report run.json
  legiscrub run -t members.csv -r reference.csv -o out.csv --fail-on-unmatched
  legiscrub run -t excel_export.csv -r reference.csv -o out.csv --encoding windows-1252")]
    Run(recon::PipelineArgs),

    /// Match and override only; no accent stripping, no pruning
    #[command(after_help = "\
Examples:
  legiscrub update --mcatts mcatts_caucus.csv --legislators legislators.csv -o updated.csv")]
    Update(recon::PipelineArgs),

    /// Strip accents from a CSV, the built-in samples, or lines typed on stdin
    #[command(after_help = "\
Examples:
  legiscrub accents -i legislators.csv -o legislators-no-accents.csv
  legiscrub accents --examples
  echo 'Nydia Velázquez' | legiscrub accents --interactive")]
    Accents {
        /// Input CSV (requires --output)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Output CSV (requires --input)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the sample table
        #[arg(long)]
        examples: bool,

        /// Read lines from stdin and print them without accents
        #[arg(long)]
        interactive: bool,

        /// Compatibility decomposition (also folds ligatures and width variants)
        #[arg(long)]
        compat: bool,

        /// Input encoding (utf-8 or windows-1252)
        #[arg(long, default_value = "utf-8")]
        encoding: Encoding,
    },

    /// Remove one column from a CSV
    #[command(after_help = "\
Examples:
  legiscrub prune -i updated_mcatts.csv
  legiscrub prune -i updated_mcatts.csv -o final.csv --column statenm")]
    Prune {
        /// Input CSV
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Output CSV (default: <input stem>_no_<column>.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Column to remove
        #[arg(long, default_value = "statenm")]
        column: String,

        /// Input encoding (utf-8 or windows-1252)
        #[arg(long, default_value = "utf-8")]
        encoding: Encoding,
    },

    /// Parse and validate a pipeline config without running
    #[command(after_help = "\
Examples:
  legiscrub validate icpsr.toml")]
    Validate {
        /// Path to the pipeline TOML config
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Run(args) => recon::cmd_pipeline(args, recon::Stages::All),
        Commands::Update(args) => recon::cmd_pipeline(args, recon::Stages::MatchOnly),
        Commands::Accents {
            input,
            output,
            examples,
            interactive,
            compat,
            encoding,
        } => accents::cmd_accents(accents::AccentsArgs {
            input,
            output,
            examples,
            interactive,
            compat,
            encoding,
        }),
        Commands::Prune {
            input,
            output,
            column,
            encoding,
        } => prune::cmd_prune(input, output, column, encoding),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Diagnostics go to stderr; stdout carries only command output.
fn init_logging(cli: &Cli) {
    let level = match (cli.log_level, cli.quiet, cli.verbose) {
        (Some(level), _, _) => level.as_str(),
        (None, true, _) => "warn",
        (None, false, 0) => "info",
        (None, false, 1) => "debug",
        (None, false, _) => "trace",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<TableIoError> for CliError {
    fn from(err: TableIoError) -> Self {
        let code = io_exit_code(&err);
        let hint = match &err {
            TableIoError::NotFound(_) => Some("relative paths are resolved from the current directory"),
            TableIoError::Parse { .. } => Some(
                "expected UTF-8 comma-separated values with one header row; \
                 legacy exports can be read with --encoding windows-1252",
            ),
            _ => None,
        };
        Self {
            code,
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::MissingColumn { .. } => {
                Some("set the column names in a --config file; check it with `legiscrub validate`")
            }
            _ => None,
        };
        Self {
            code,
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}
