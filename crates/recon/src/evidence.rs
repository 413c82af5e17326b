use crate::model::{CategoryCounts, MergeOutput, Origin, ReconSummary};
use crate::report::OverlayDocument;

/// Compute summary statistics for a merge run.
pub fn compute_summary(inspection_read: usize, reiterated_read: usize, merged: &MergeOutput) -> ReconSummary {
    let merged_reiterated = merged
        .records
        .iter()
        .filter(|r| r.origin == Origin::Reiterated)
        .count();

    ReconSummary {
        inspection_read,
        reiterated_read,
        removed_keys: merged.removed_keys,
        merged: merged.records.len(),
        merged_inspection: merged.records.len() - merged_reiterated,
        merged_reiterated,
    }
}

/// Marker count per category of a built overlay document.
pub fn category_counts(document: &OverlayDocument) -> CategoryCounts {
    document
        .groups
        .iter()
        .map(|g| (g.name.clone(), g.subgroups.iter().map(|s| s.markers.len()).sum()))
        .collect()
}
