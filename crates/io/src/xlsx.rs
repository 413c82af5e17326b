// Excel import (xlsx, xls, xlsb, ods) and reconciled-table export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use reitmap_recon::model::{ExportRow, RowMatrix, EXPORT_HEADERS};

use crate::error::IoError;

/// Name of the single sheet written by [`write_export`].
pub const EXPORT_SHEET: &str = "RESULTADO";

/// Maximum dimensions read from a sheet
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Read one sheet into a row matrix: the named sheet, or the first one.
///
/// Cells are rendered as text the way they display (integral floats without
/// decimals, booleans as TRUE/FALSE). Leading empty rows and columns are
/// kept, so column letters line up with the spreadsheet.
pub fn read_rows(path: &Path, sheet: Option<&str>) -> Result<RowMatrix, IoError> {
    let path_str = path.display().to_string();
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::Workbook {
        path: path_str.clone(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IoError::MissingSheet {
                path: path_str.clone(),
                sheet: wanted.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IoError::NoSheets { path: path_str.clone() })?,
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| IoError::Workbook {
        path: path_str.clone(),
        message: format!("failed to read sheet '{sheet_name}': {e}"),
    })?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        log::debug!("{path_str}: sheet '{sheet_name}' is empty");
        return Ok(Vec::new());
    }

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let start_row = (start_row as usize).min(MAX_ROWS);
    let start_col = (start_col as usize).min(MAX_COLS);

    let mut rows: RowMatrix = vec![Vec::new(); start_row];
    for row in range.rows().take(MAX_ROWS - start_row) {
        let mut cells = vec![String::new(); start_col];
        cells.extend(row.iter().take(MAX_COLS - start_col).map(cell_text));
        rows.push(cells);
    }

    log::debug!("{path_str}: read {} rows from sheet '{sheet_name}'", rows.len());
    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Format nicely: integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Write the reconciled table to a single-sheet workbook.
pub fn write_export(rows: &[ExportRow], path: &Path) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(EXPORT_SHEET)
        .map_err(|e| write_err(e.to_string()))?;

    let header_format = Format::new().set_bold();
    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| write_err(e.to_string()))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.cells().iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(r, col as u16, *value)
                .map_err(|e| write_err(e.to_string()))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| write_err(e.to_string()))?;
    worksheet
        .autofilter(0, 0, rows.len() as u32, (EXPORT_HEADERS.len() - 1) as u16)
        .map_err(|e| write_err(e.to_string()))?;

    workbook
        .save(path)
        .map_err(|e| write_err(format!("failed to save XLSX file: {e}")))?;
    Ok(())
}
