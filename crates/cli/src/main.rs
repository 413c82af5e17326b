// reitmap CLI - reiterated occurrences x inspection reconciliation

mod exit_codes;
mod overlay;
mod settings;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use reitmap_io::IoError;
use reitmap_recon::ReconError;

use exit_codes::{EXIT_CONFIG_INVALID, EXIT_ERROR, EXIT_INPUT, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "reitmap")]
#[command(about = "Reconcile reiterated occurrences with inspected devices and map the leftovers")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    /// Config file (TOML). Falls back to <config dir>/reitmap/config.toml, then built-in defaults
    #[arg(long, global = true, env = "REITMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Log engine progress to stderr (RUST_LOG overrides per module)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the reconciled table (XLSX or CSV)
    #[command(after_help = "\
Examples:
  reitmap table --inspection inspecao.xlsx --reiterated reiteradas.xlsx
  reitmap table --inspection inspecao.xlsx --reiterated reiteradas.csv --out resultado.csv
  reitmap table --inspection inspecao.xlsx --inspection-sheet PLAN1 --reiterated reiteradas.xlsx --json")]
    Table(table::TableArgs),

    /// Build the grouped KML overlay for the reconciled records
    #[command(after_help = "\
Examples:
  reitmap overlay --inspection inspecao.xlsx --reiterated reiteradas.xlsx --placemarks rede.kmz
  reitmap overlay --inspection inspecao.xlsx --reiterated reiteradas.xlsx --placemarks rede.kml --out mapa.kml")]
    Overlay(overlay::OverlayArgs),

    /// Inspect or validate configuration
    #[command(subcommand)]
    Config(settings::ConfigCommands),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("REITMAP_COMMIT"), ")",
        "\nengine:  reitmap-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("REITMAP_TARGET"),
    )
}

fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Info } else { log::LevelFilter::Warn };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Table(args) => table::cmd_table(cli.config.as_deref(), args),
        Commands::Overlay(args) => overlay::cmd_overlay(cli.config.as_deref(), args),
        Commands::Config(cmd) => settings::cmd_config(cli.config.as_deref(), cmd),
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
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG_INVALID, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Map an IO failure: write failures are output errors, everything else
    /// is an input problem.
    pub fn io(err: IoError) -> Self {
        let hint = match &err {
            IoError::MissingSheet { .. } => {
                Some("pick an existing sheet with --inspection-sheet / --reiterated-sheet".to_string())
            }
            IoError::NoMarkupEntry { .. } => {
                Some("a KMZ must contain doc.kml or at least one .kml file".to_string())
            }
            _ => None,
        };
        let base = match err {
            IoError::Write { .. } => Self::output(err.to_string()),
            other => Self::input(other.to_string()),
        };
        Self { hint, ..base }
    }

    pub fn recon(err: ReconError) -> Self {
        Self::config(err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
