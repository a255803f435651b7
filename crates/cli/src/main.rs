// ringscan - batch analysis of ring-substitution scan libraries

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ringscan_cli::{check, run, PipelineError};
use ringscan_config::{ConfigError, Settings};
use ringscan_io::IoError;
use ringscan_recon::ReconError;

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_INCOMPLETE, EXIT_INPUT, EXIT_OUTPUT_EXISTS, EXIT_RENDER,
    EXIT_SUCCESS,
};

#[derive(Parser)]
#[command(name = "ringscan")]
#[command(about = "Reconcile, summarise and draw a ring-substitution scan library")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full batch: summaries, figures, charge diagrams, manifest
    #[command(after_help = "\
Examples:
  ringscan run
  ringscan run --config ringscan.toml
  RUST_LOG=debug ringscan run -c ringscan.toml")]
    Run {
        /// Config file (built-in defaults when omitted)
        #[arg(long, short = 'c', env = "RINGSCAN_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Load and reconcile the library without writing anything
    Validate {
        /// Config file (built-in defaults when omitted)
        #[arg(long, short = 'c', env = "RINGSCAN_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config } => cmd_run(config.as_deref()),
        Commands::Validate { config } => cmd_validate(config.as_deref()),
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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn config(err: ConfigError) -> Self {
        Self { code: EXIT_CONFIG, message: err.to_string(), hint: None }
    }

    fn recon(err: ReconError) -> Self {
        let (code, hint) = match &err {
            ReconError::MissingBaseline { .. } => (
                EXIT_INCOMPLETE,
                Some("the library needs a record with both rings unsubstituted".to_string()),
            ),
            ReconError::UnresolvedCell { .. } => (
                EXIT_INCOMPLETE,
                Some("measure the pair in either orientation".to_string()),
            ),
            ReconError::MissingColumn { .. } => (
                EXIT_INPUT,
                Some("check [schema] column names against the input header".to_string()),
            ),
            ReconError::Csv(_) | ReconError::MalformedRecord { .. } => (EXIT_INPUT, None),
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => (EXIT_CONFIG, None),
            ReconError::KeyMismatch { .. } => (EXIT_ERROR, None),
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Config(e) => Self::config(e),
            PipelineError::Recon(e) => Self::recon(e),
            PipelineError::Io(e @ IoError::DirectoryExists(_)) => {
                Self { code: EXIT_OUTPUT_EXISTS, message: e.to_string(), hint: None }
                    .with_hint("remove it, or set output.charge_dir_policy = \"reuse\"")
            }
            PipelineError::Io(e) => Self { code: EXIT_INPUT, message: e.to_string(), hint: None },
            PipelineError::Render(e) => {
                Self { code: EXIT_RENDER, message: e.to_string(), hint: None }
            }
        }
    }
}

fn settings(config: Option<&Path>) -> Result<Settings, CliError> {
    match config {
        Some(path) => Settings::load(path).map_err(CliError::config),
        None => {
            log::info!("no --config given, using built-in defaults");
            Ok(Settings::default())
        }
    }
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(config: Option<&Path>) -> Result<(), CliError> {
    let settings = settings(config)?;
    let (manifest, path) = run(&settings)?;
    println!(
        "{} records, {} rejected, {} artifacts; manifest {}",
        manifest.counts.records,
        manifest.counts.rejected,
        manifest.artifacts.len(),
        path.display()
    );
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config: Option<&Path>) -> Result<(), CliError> {
    let settings = settings(config)?;
    let report = check(&settings)?;
    println!(
        "ok: {} records ({} rejected), {} substituents, {} quantities, {} charge rows",
        report.records,
        report.rejected,
        report.substituents,
        report.quantities.len(),
        report.charge_rows
    );
    Ok(())
}
