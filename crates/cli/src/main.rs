// itcmatch CLI - purchase register vs GSTR-2B reconciliation

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "itcmatch")]
#[command(about = "Reconcile purchase records against GSTR-2B")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match books against the reference by exact (GSTIN, invoice number, document type)
    #[command(after_help = "\
Exit code 3 (with --strict) means at least one record is not Matched.

Examples:
  itcmatch reconcile books.json gstr2b.json
  itcmatch reconcile books.csv gstr2b.json --json
  itcmatch reconcile books.json gstr2b.json --config april.recon.toml --output result.json --strict")]
    Reconcile {
        /// Books-side records (.json or .csv)
        books: PathBuf,

        /// Reference (GSTR-2B) records (.json or .csv)
        reference: PathBuf,

        /// TOML config with tolerances and bands
        #[arg(long, env = "ITCMATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit 3 when any record is not Matched
        #[arg(long)]
        strict: bool,
    },

    /// Score extracted records against the reference and report soft mismatches
    #[command(after_help = "\
Exit code 3 (with --strict) means notes were attached or records were left unmatched.

Examples:
  itcmatch detect extracted.json gstr2b.json
  itcmatch detect extracted.json gstr2b.json --report-card --json")]
    Detect {
        /// Extracted records (.json or .csv)
        extracted: PathBuf,

        /// Reference (GSTR-2B) records (.json or .csv)
        reference: PathBuf,

        /// TOML config with scoring weights and thresholds
        #[arg(long, env = "ITCMATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Emit the reviewer report card instead of the full report
        #[arg(long)]
        report_card: bool,

        /// Exit 3 on any note or unmatched record
        #[arg(long)]
        strict: bool,
    },

    /// Validate a config without running
    #[command(after_help = "\
Examples:
  itcmatch validate april.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("ITCMATCH_COMMIT"), ")",
        "\nengine:  itcmatch-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("ITCMATCH_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version arrive here too and go to stdout
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Reconcile {
            books,
            reference,
            config,
            json,
            output,
            strict,
        } => recon::cmd_reconcile(recon::RunArgs {
            left: books,
            reference,
            config,
            json,
            output,
            strict,
        }),
        Commands::Detect {
            extracted,
            reference,
            config,
            json,
            output,
            report_card,
            strict,
        } => recon::cmd_detect(
            recon::RunArgs {
                left: extracted,
                reference,
                config,
                json,
                output,
                strict,
            },
            report_card,
        ),
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

/// Route engine `log` records and CLI `tracing` events to stderr.
/// `RUST_LOG` overrides the verbosity flag.
fn setup_logging(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("itcmatch={level},itcmatch_recon={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

// ============================================================================
// Errors
// ============================================================================

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

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<itcmatch_recon::ReconError> for CliError {
    fn from(err: itcmatch_recon::ReconError) -> Self {
        Self::new(exit_codes::recon_exit_code(&err), err.to_string())
    }
}
