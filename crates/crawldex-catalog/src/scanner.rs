use std::io;
use std::path::Path;

use crawldex_core::{CatalogError, ListingEntry, ResultRecord};

use crate::read_record_bytes;

/// File extension of result records written by the crawler.
pub const RECORD_EXTENSION: &str = "json";

/// Lists every result record in `dir`, newest `crawl_time` first.
///
/// Records that cannot be read or parsed are logged and skipped; one corrupt
/// file never aborts the listing. `crawl_time` is compared as a plain string,
/// so entries without one sort last. Ties are ordered by filename.
///
/// A directory that does not exist lists as empty.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the directory exists but cannot be read.
pub fn list_all(dir: &Path) -> Result<Vec<ListingEntry>, CatalogError> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "results directory missing, listing is empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(CatalogError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut entries: Vec<ListingEntry> = read_dir
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(error) => {
                tracing::warn!(dir = %dir.display(), error = %error, "failed to read directory entry");
                None
            }
        })
        .filter(|path| is_record_file(path))
        .map(|path| scan_entry(&path))
        .filter_map(|scanned| match scanned {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::warn!(error = %error, "skipping unreadable result record");
                None
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.crawl_time
            .cmp(&a.crawl_time)
            .then_with(|| a.filename.cmp(&b.filename))
    });

    tracing::debug!(dir = %dir.display(), count = entries.len(), "listed result records");
    Ok(entries)
}

fn is_record_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) && path.is_file()
}

fn scan_entry(path: &Path) -> Result<ListingEntry, CatalogError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes = read_record_bytes(path, &filename)?;
    let record: ResultRecord =
        serde_json::from_slice(&bytes).map_err(|source| CatalogError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let filepath = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    Ok(ListingEntry::from_record(
        filename,
        filepath,
        bytes.len() as u64,
        &record,
    ))
}
