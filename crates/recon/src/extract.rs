//! Row matrix -> device records.
//!
//! Row 0 is the header and is skipped. Rows whose key normalizes to empty
//! are dropped without error; blank and malformed rows are routine in the
//! source spreadsheets.

use crate::config::{InspectionLayout, ReiteratedLayout};
use crate::key::{cell, normalize_key};
use crate::model::DeviceRecord;

/// Build inspection records: device id, installation and work order.
pub fn extract_inspection(rows: &[Vec<String>], layout: &InspectionLayout) -> Vec<DeviceRecord> {
    let mut out = Vec::new();
    let mut dropped = 0usize;

    for row in rows.iter().skip(1) {
        let device = cell(row, layout.device);
        let key = normalize_key(device);
        if key.is_empty() {
            dropped += 1;
            continue;
        }
        out.push(DeviceRecord::inspection(
            key,
            device,
            cell(row, layout.installation),
            cell(row, layout.work_order),
        ));
    }

    log::debug!("inspection: {} records extracted, {} blank rows dropped", out.len(), dropped);
    out
}

/// Build reiterated-occurrence records: element id and feeder.
pub fn extract_reiterated(rows: &[Vec<String>], layout: &ReiteratedLayout) -> Vec<DeviceRecord> {
    let mut out = Vec::new();
    let mut dropped = 0usize;

    for row in rows.iter().skip(1) {
        let element = cell(row, layout.element);
        let key = normalize_key(element);
        if key.is_empty() {
            dropped += 1;
            continue;
        }
        out.push(DeviceRecord::reiterated(key, element, cell(row, layout.feeder)));
    }

    log::debug!("reiterated: {} records extracted, {} blank rows dropped", out.len(), dropped);
    out
}
