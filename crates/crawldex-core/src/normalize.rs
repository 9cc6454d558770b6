//! Normalization from either record layout to a uniform per-source view.
//!
//! All layout sensitivity lives here: statistics and product browsing only
//! ever see a [`NormalizedView`].

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::error::CatalogError;
use crate::record::{Product, RecordLayout, ResultRecord};
use crate::UNKNOWN_SOURCE;

/// Status synthesized for legacy records, which only ever stored successes.
const LEGACY_STATUS: &str = "success";

/// One source's results, borrowed from the underlying record.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceGroup<'a> {
    pub total_products: Option<u64>,
    pub status: Option<Cow<'a, str>>,
    pub execution_time: Option<f64>,
    pub products: &'a [Product],
}

/// Source name → results, in the order the record lists them.
pub type NormalizedView<'a> = IndexMap<&'a str, SourceGroup<'a>>;

/// Normalizes a parsed record into a per-source view.
///
/// Multi-source records map through unchanged. Legacy records become a single
/// group keyed by `platform` (or `"unknown"`) with status `"success"`, an
/// execution time of zero and `total_products` equal to the product count.
///
/// # Errors
///
/// Returns [`CatalogError::Schema`] when the record has neither `results`
/// nor `products`.
pub fn normalize(record: &ResultRecord) -> Result<NormalizedView<'_>, CatalogError> {
    match &record.layout {
        RecordLayout::MultiSource(results) => Ok(results
            .iter()
            .map(|(name, result)| {
                (
                    name.as_str(),
                    SourceGroup {
                        total_products: result.total_products,
                        status: result.status.as_deref().map(Cow::Borrowed),
                        execution_time: result.execution_time,
                        products: &result.products,
                    },
                )
            })
            .collect()),
        RecordLayout::Legacy { platform, products } => {
            let name = platform.as_deref().unwrap_or(UNKNOWN_SOURCE);
            let group = SourceGroup {
                total_products: Some(products.len() as u64),
                status: Some(Cow::Borrowed(LEGACY_STATUS)),
                execution_time: Some(0.0),
                products,
            };
            Ok(IndexMap::from([(name, group)]))
        }
        RecordLayout::Unrecognized { .. } => Err(CatalogError::Schema),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
