//! `reitmap overlay`: reconciled records placed on the map, grouped by region.

use std::path::{Path, PathBuf};

use clap::Args;

use reitmap_io::kml;
use reitmap_recon::{OverlayReport, ReconConfig};

use crate::settings;
use crate::table::{self, InputArgs};
use crate::CliError;

#[derive(Args, Debug)]
pub struct OverlayArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Placemark source with device locations (.kml or .kmz)
    #[arg(long)]
    pub placemarks: PathBuf,

    /// Output KML file
    #[arg(long, default_value = "resultado_reiteradas_inspecao.kml")]
    pub out: PathBuf,

    /// Print summary and per-category counts as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress the summary on stderr
    #[arg(long)]
    pub quiet: bool,
}

pub fn cmd_overlay(config_path: Option<&Path>, args: OverlayArgs) -> Result<(), CliError> {
    check_output_path(&args.out)?;
    let (config, _) = settings::resolve(config_path)?;
    let result = table::load_and_run(&config, &args.input)?;
    let placemarks = kml::read_placemarks(&args.placemarks).map_err(CliError::io)?;

    let report = reitmap_recon::overlay(&config, &result.records, &placemarks);
    kml::write_markup(&report.document.to_kml(), &args.out).map_err(CliError::io)?;

    if args.json {
        let value = serde_json::json!({
            "meta": result.meta,
            "summary": result.summary,
            "placemarks": placemarks.len(),
            "matched": report.matched,
            "unmatched": report.unmatched,
            "category_counts": report.category_counts,
        });
        let json_str = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    if !args.quiet {
        table::print_summary(&result);
        print_overlay_summary(&config, &report);
        eprintln!("wrote {}", args.out.display());
    }
    Ok(())
}

/// The overlay is written as plain markup, never as a KMZ archive.
fn check_output_path(out: &Path) -> Result<(), CliError> {
    let ext = out.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext.eq_ignore_ascii_case("kml") {
        return Ok(());
    }
    Err(CliError::usage(format!("--out {}: overlay output must be a .kml file", out.display()))
        .with_hint("e.g. --out mapa.kml"))
}

fn print_overlay_summary(config: &ReconConfig, report: &OverlayReport) {
    eprintln!(
        "map: {} record(s) located, {} without coordinates",
        report.matched, report.unmatched,
    );
    for category in config.categories.display_order() {
        if let Some(count) = report.category_counts.get(category) {
            eprintln!("  {category}: {count}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::EXIT_USAGE;

    #[test]
    fn output_must_be_kml() {
        assert!(check_output_path(Path::new("mapa.kml")).is_ok());
        assert!(check_output_path(Path::new("MAPA.KML")).is_ok());

        let err = check_output_path(Path::new("mapa.kmz")).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.is_some());
        assert!(check_output_path(Path::new("mapa")).is_err());
    }
}
