use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crawldex_core::{
    browse_products, compute_statistics, CatalogError, ListingEntry, ProductPage, ProductQuery,
    ResultRecord, Statistics,
};
use serde::de::DeserializeOwned;

use crate::{read_record_bytes, scanner};

/// Result records in one directory, addressed by filename.
///
/// Holds only the directory path. Each call reads the file afresh, so a
/// record deleted after a listing surfaces as [`CatalogError::NotFound`].
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists every record in the directory. See [`scanner::list_all`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<ListingEntry>, CatalogError> {
        scanner::list_all(&self.dir)
    }

    /// Maps a filename to its path inside the results directory.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidName`] unless `filename` is a single
    /// plain path component.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, CatalogError> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == OsStr::new(filename) => {
                Ok(self.dir.join(name))
            }
            _ => Err(CatalogError::InvalidName {
                filename: filename.to_string(),
            }),
        }
    }

    /// Returns the record exactly as stored.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `NotFound`, or a read failure (`Io` / `Malformed`).
    pub fn detail(&self, filename: &str) -> Result<serde_json::Value, CatalogError> {
        self.load(filename)
    }

    /// Returns the record parsed into its detected layout.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `NotFound`, or a read failure (`Io` / `Malformed`).
    pub fn record(&self, filename: &str) -> Result<ResultRecord, CatalogError> {
        self.load(filename)
    }

    /// Computes statistics for one record.
    ///
    /// # Errors
    ///
    /// Everything [`ResultStore::record`] returns, plus `Schema` for a record
    /// with neither `results` nor `products`.
    pub fn statistics(&self, filename: &str) -> Result<Statistics, CatalogError> {
        compute_statistics(&self.record(filename)?)
    }

    /// Browses the products of one record.
    ///
    /// # Errors
    ///
    /// Same as [`ResultStore::statistics`].
    pub fn products(
        &self,
        filename: &str,
        query: &ProductQuery,
    ) -> Result<ProductPage, CatalogError> {
        browse_products(&self.record(filename)?, query)
    }

    fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T, CatalogError> {
        let path = self.resolve(filename)?;
        let bytes = read_record_bytes(&path, filename)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read result record");
        serde_json::from_slice(&bytes).map_err(|source| CatalogError::Malformed { path, source })
    }
}
