use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the catalog, normalizer and aggregation engine.
///
/// `Io` and `Malformed` together form the read-failure class: the record
/// exists but could not be turned into structured data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("record not found: {filename}")]
    NotFound { filename: String },

    #[error("failed to read record {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized record: neither `results` nor `products` is present")]
    Schema,

    #[error("invalid record name \"{filename}\"")]
    InvalidName { filename: String },
}

impl CatalogError {
    /// Returns `true` for I/O and parse failures on a record that exists.
    #[must_use]
    pub fn is_read_failure(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Malformed { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
