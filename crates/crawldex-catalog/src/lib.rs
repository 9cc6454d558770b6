//! Filesystem-backed catalog of crawler result records.
//!
//! [`scanner`] enumerates a results directory into listing metadata;
//! [`store`] addresses single records by filename for detail, statistics and
//! product browsing. Every call re-reads the files it needs; nothing is
//! cached.

pub mod scanner;
pub mod store;

pub use crawldex_core::{CatalogError, ListingEntry};
pub use scanner::{list_all, RECORD_EXTENSION};
pub use store::ResultStore;

use std::path::Path;

/// Reads a record file, reporting a vanished file as `NotFound`.
pub(crate) fn read_record_bytes(path: &Path, filename: &str) -> Result<Vec<u8>, CatalogError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CatalogError::NotFound {
                filename: filename.to_string(),
            }
        } else {
            CatalogError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
