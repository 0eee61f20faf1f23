//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified, e.g. cannot write output)|
//! | 2    | CLI usage error (bad args; emitted by clap)          |
//! | 3    | Discrepancies found (only with `--strict`)           |
//! | 4    | Invalid config (TOML parse or validation failure)    |
//! | 5    | Input read/parse failure (records or config file)    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant with the next free number
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use itcmatch_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Reconciliation (3-5)
// =============================================================================

/// `--strict` run found at least one non-matched result.
pub const EXIT_DISCREPANCIES: u8 = 3;

/// Config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Records or config could not be read or parsed.
pub const EXIT_INPUT: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Json(_)
        | ReconError::Csv(_)
        | ReconError::RecordShape(_)
        | ReconError::Io { .. } => EXIT_INPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_DISCREPANCIES,
            EXIT_INVALID_CONFIG,
            EXIT_INPUT,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn engine_errors_map_to_codes() {
        let config = ReconError::ConfigValidation("bad".into());
        assert_eq!(recon_exit_code(&config), EXIT_INVALID_CONFIG);
        let shape = ReconError::RecordShape("bad".into());
        assert_eq!(recon_exit_code(&shape), EXIT_INPUT);
    }
}
