use std::ops::Index;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Decoded row matrix: header row at index 0, data thereafter.
pub type RowMatrix = Vec<Vec<String>>;

/// Pre-decoded rows for both source datasets.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub inspection: RowMatrix,
    pub reiterated: RowMatrix,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Which source list produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    Inspection,
    Reiterated,
}

impl Origin {
    /// Value written to the TIPO column.
    pub fn tipo(&self) -> &'static str {
        match self {
            Self::Inspection => "INSPECAO",
            Self::Reiterated => "REITERADA",
        }
    }

    /// Subtype label used for the inner overlay group.
    pub fn subtype_label(&self) -> &'static str {
        match self {
            Self::Inspection => "Inspeção",
            Self::Reiterated => "Reiteradas",
        }
    }

    /// Annotation attached to survivors of the merge.
    pub fn difference_note(&self) -> &'static str {
        match self {
            Self::Inspection => "Está só em INSPEÇÃO (não aparece nas reiteradas)",
            Self::Reiterated => "Está só em REITERADAS (não aparece na inspeção)",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tipo())
    }
}

/// One extracted row of either dataset.
///
/// `installation` and `work_order` are only filled for inspection rows,
/// `feeder` only for reiterated rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRecord {
    pub key: String,
    pub origin: Origin,
    pub device_label: String,
    pub installation: String,
    pub work_order: String,
    pub feeder: String,
    /// Set by the merge step; empty until then.
    pub difference: String,
}

impl DeviceRecord {
    pub fn inspection(key: String, device_label: &str, installation: &str, work_order: &str) -> Self {
        Self {
            key,
            origin: Origin::Inspection,
            device_label: device_label.to_string(),
            installation: installation.to_string(),
            work_order: work_order.to_string(),
            feeder: String::new(),
            difference: String::new(),
        }
    }

    pub fn reiterated(key: String, element_label: &str, feeder: &str) -> Self {
        Self {
            key,
            origin: Origin::Reiterated,
            device_label: element_label.to_string(),
            installation: String::new(),
            work_order: String::new(),
            feeder: feeder.to_string(),
            difference: String::new(),
        }
    }

    pub fn to_export_row(&self) -> ExportRow {
        ExportRow {
            tipo: self.origin.tipo().to_string(),
            dispositivo: self.device_label.clone(),
            alimentador: self.feeder.clone(),
            instalacao_nova: self.installation.clone(),
            numero_ot: self.work_order.clone(),
            diferenca: self.difference.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tabular export
// ---------------------------------------------------------------------------

/// Column names of the reconciled table, in output order.
pub const EXPORT_HEADERS: [&str; 6] = [
    "TIPO",
    "DISPOSITIVO",
    "ALIMENTADOR",
    "INSTALACAO_NOVA",
    "NUMERO_OT",
    "DIFERENCA",
];

/// Plain, category-agnostic row handed to the spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ExportRow {
    pub tipo: String,
    pub dispositivo: String,
    pub alimentador: String,
    pub instalacao_nova: String,
    pub numero_ot: String,
    pub diferenca: String,
}

impl ExportRow {
    /// Cells in [`EXPORT_HEADERS`] order.
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.tipo,
            &self.dispositivo,
            &self.alimentador,
            &self.instalacao_nova,
            &self.numero_ot,
            &self.diferenca,
        ]
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Reiterated survivors first, then inspection survivors, each in row order.
#[derive(Debug, Clone, Default)]
pub struct MergeOutput {
    pub records: Vec<DeviceRecord>,
    /// Number of distinct keys present in both lists.
    pub removed_keys: usize,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconSummary {
    pub inspection_read: usize,
    pub reiterated_read: usize,
    pub removed_keys: usize,
    pub merged: usize,
    pub merged_inspection: usize,
    pub merged_reiterated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub records: Vec<DeviceRecord>,
}

impl ReconResult {
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.records.iter().map(DeviceRecord::to_export_row).collect()
    }
}

/// Matched-marker count per category, in category display order.
///
/// Serializes as a map whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts(Vec<(String, usize)>);

impl CategoryCounts {
    pub fn get(&self, category: &str) -> Option<&usize> {
        self.0.iter().find(|(name, _)| name == category).map(|(_, count)| count)
    }

    pub fn contains_key(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, usize)> for CategoryCounts {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        let mut counts = CategoryCounts::default();
        for (name, count) in iter {
            match counts.0.iter_mut().find(|(n, _)| *n == name) {
                Some((_, total)) => *total += count,
                None => counts.0.push((name, count)),
            }
        }
        counts
    }
}

impl Index<&str> for CategoryCounts {
    type Output = usize;

    fn index(&self, category: &str) -> &usize {
        self.get(category)
            .unwrap_or_else(|| panic!("no count for category '{category}'"))
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, count) in &self.0 {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}
