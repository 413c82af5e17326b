//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad args; clap uses this too)           |
//! | 3    | Configuration file unreadable or invalid                 |
//! | 4    | Input unreadable or structurally broken (missing sheet,  |
//! |      | KMZ without a .kml entry, malformed KML)                 |
//! | 5    | Output file could not be written                         |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file cannot be read, parsed, or fails validation.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// Input file cannot be read or is structurally unusable.
/// Nothing is written when this is returned.
pub const EXIT_INPUT: u8 = 4;

/// Output file cannot be created or written.
pub const EXIT_OUTPUT: u8 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_CONFIG_INVALID, EXIT_INPUT, EXIT_OUTPUT];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
