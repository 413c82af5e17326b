// CSV import/export

use std::io::Read;
use std::path::Path;

use reitmap_recon::model::{ExportRow, RowMatrix};

use crate::error::IoError;

/// Read a CSV file into a row matrix. The header row is kept as row 0.
pub fn read_rows(path: &Path) -> Result<RowMatrix, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    rows_from_str(&content, delimiter).map_err(|message| IoError::Csv {
        path: path.display().to_string(),
        message,
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel exports are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    Ok(decode_text(bytes, path))
}

/// Decode file bytes as UTF-8 (dropping a BOM), falling back to Windows-1252.
pub(crate) fn decode_text(bytes: Vec<u8>, source: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{} is not UTF-8, decoding as Windows-1252", source.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

fn rows_from_str(content: &str, delimiter: u8) -> Result<RowMatrix, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Write the reconciled table as comma-separated values with a header row.
pub fn write_export(rows: &[ExportRow], path: &Path) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.display().to_string(),
        message,
    };
    let mut writer = csv::Writer::from_path(path).map_err(|e| write_err(e.to_string()))?;

    if rows.is_empty() {
        writer
            .write_record(reitmap_recon::model::EXPORT_HEADERS)
            .map_err(|e| write_err(e.to_string()))?;
    }
    for row in rows {
        writer.serialize(row).map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))?;
    Ok(())
}
