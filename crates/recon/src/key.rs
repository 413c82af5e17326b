//! Canonical device keys and spreadsheet column addressing.

/// Canonicalize a free-text identifier: uppercase, trim, keep only ASCII
/// letters and digits.
///
/// Total and idempotent. Two identifiers refer to the same device iff their
/// keys are equal and non-empty.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Same as [`normalize_key`] for a cell that may be absent.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize_key).unwrap_or_default()
}

/// Widest column address accepted (A..ZZZ).
pub const MAX_COLUMN_LETTERS: usize = 3;

/// Convert a column letter to a zero-based index (A = 0, H = 7, AP = 41).
///
/// Letters are read as a base-26 numeral with 'A' = 1. Returns `None` for
/// empty input, more than [`MAX_COLUMN_LETTERS`] letters, or anything that
/// is not an ASCII letter.
pub fn column_index(letters: &str) -> Option<usize> {
    let letters = letters.trim();
    if letters.is_empty() || letters.len() > MAX_COLUMN_LETTERS {
        return None;
    }
    let mut n: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// Read a cell by index, treating short rows as blank.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}
