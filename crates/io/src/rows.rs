// Tabular input dispatch by file extension

use std::path::Path;

use reitmap_recon::model::{ExportRow, RowMatrix};

use crate::error::IoError;

/// Tabular file formats understood by the reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Workbook,
}

impl TableFormat {
    /// Format from the file extension. Anything that is not CSV/TSV/TXT is
    /// handed to the workbook reader, which reports unreadable files itself.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Self::Csv,
            _ => Self::Workbook,
        }
    }
}

/// Read one table from a CSV or spreadsheet file.
///
/// `sheet` only applies to workbooks; for CSV input it is ignored.
pub fn read_rows(path: &Path, sheet: Option<&str>) -> Result<RowMatrix, IoError> {
    match TableFormat::from_path(path) {
        TableFormat::Csv => {
            if let Some(name) = sheet {
                log::warn!("{}: sheet '{name}' ignored for CSV input", path.display());
            }
            crate::csv::read_rows(path)
        }
        TableFormat::Workbook => crate::xlsx::read_rows(path, sheet),
    }
}

/// Write the reconciled table, as CSV or XLSX depending on the extension.
pub fn write_export(rows: &[ExportRow], path: &Path) -> Result<(), IoError> {
    match TableFormat::from_path(path) {
        TableFormat::Csv => crate::csv::write_export(rows, path),
        TableFormat::Workbook => crate::xlsx::write_export(rows, path),
    }
}
