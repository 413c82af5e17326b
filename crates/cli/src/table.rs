//! `reitmap table` and the input pipeline shared with `reitmap overlay`.

use std::path::{Path, PathBuf};

use clap::Args;

use reitmap_io::rows;
use reitmap_recon::{ReconConfig, ReconInput, ReconResult};

use crate::settings;
use crate::CliError;

/// The two spreadsheets every run starts from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Inspection spreadsheet (xlsx, xls, ods or csv)
    #[arg(long)]
    pub inspection: PathBuf,

    /// Reiterated-occurrences spreadsheet (xlsx, xls, ods or csv)
    #[arg(long)]
    pub reiterated: PathBuf,

    /// Sheet to read from the inspection workbook (default: first sheet)
    #[arg(long)]
    pub inspection_sheet: Option<String>,

    /// Sheet to read from the reiterated workbook (default: first sheet)
    #[arg(long)]
    pub reiterated_sheet: Option<String>,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file; `.csv` writes CSV, anything else XLSX
    #[arg(long, default_value = "resultado_reiteradas_inspecao.xlsx")]
    pub out: PathBuf,

    /// Print the full result as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress the summary on stderr
    #[arg(long)]
    pub quiet: bool,
}

/// Read both inputs and run extraction + reconciliation.
///
/// Nothing is written here, so a structural failure in either input aborts
/// the run before any output exists.
pub fn load_and_run(config: &ReconConfig, input: &InputArgs) -> Result<ReconResult, CliError> {
    let inspection = rows::read_rows(&input.inspection, input.inspection_sheet.as_deref())
        .map_err(CliError::io)?;
    let reiterated = rows::read_rows(&input.reiterated, input.reiterated_sheet.as_deref())
        .map_err(CliError::io)?;

    let recon_input = ReconInput { inspection, reiterated };
    reitmap_recon::run(config, &recon_input).map_err(CliError::recon)
}

pub fn cmd_table(config_path: Option<&Path>, args: TableArgs) -> Result<(), CliError> {
    let (config, _) = settings::resolve(config_path)?;
    let result = load_and_run(&config, &args.input)?;

    rows::write_export(&result.export_rows(), &args.out).map_err(CliError::io)?;

    if args.json {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    if !args.quiet {
        print_summary(&result);
        eprintln!("wrote {}", args.out.display());
    }
    Ok(())
}

/// Human summary to stderr.
pub fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "read {} inspection + {} reiterated records; {} shared device(s) removed",
        s.inspection_read, s.reiterated_read, s.removed_keys,
    );
    eprintln!(
        "kept {} record(s): {} reiterated only, {} inspection only",
        s.merged, s.merged_reiterated, s.merged_inspection,
    );
}
