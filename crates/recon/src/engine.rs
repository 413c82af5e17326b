use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::extract::{extract_inspection, extract_reiterated};
use crate::geo::{build_index, GeoIndex, Placemark};
use crate::matcher::reconcile;
use crate::model::{DeviceRecord, ReconInput, ReconMeta, ReconResult};
use crate::report::{build_report, OverlayReport};

/// Run extraction + reconciliation per config. Returns merged records + summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let inspection_layout = config.columns.inspection.layout()?;
    let reiterated_layout = config.columns.reiterated.layout()?;

    let inspection = extract_inspection(&input.inspection, &inspection_layout);
    let reiterated = extract_reiterated(&input.reiterated, &reiterated_layout);

    let merged = reconcile(&inspection, &reiterated);
    let summary = compute_summary(inspection.len(), reiterated.len(), &merged);

    log::info!(
        "recon: {} inspection + {} reiterated read, {} shared keys removed, {} merged",
        summary.inspection_read,
        summary.reiterated_read,
        summary.removed_keys,
        summary.merged,
    );

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        records: merged.records,
    })
}

/// Index the placemarks and build the overlay for already-merged records.
pub fn overlay(config: &ReconConfig, records: &[DeviceRecord], placemarks: &[Placemark]) -> OverlayReport {
    let index: GeoIndex = build_index(placemarks, config.geo.policy());
    build_report(records, &index, &config.categories, &config.output.document_name)
}
