use std::path::PathBuf;

use thiserror::Error;

/// Failures at the engine boundary: config parsing and record loading.
///
/// Matching itself never fails; malformed field values degrade to "unknown".
#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (bad weight sum, out-of-range threshold, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("invalid JSON records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV records: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsed but no record list was found in a recognized envelope.
    #[error("unrecognized record layout: {0}")]
    RecordShape(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReconError>;
