//! Per-source counts and cross-source price statistics for one record.
//!
//! Counts trust each source's self-reported `total_products`; price figures
//! are computed only from the products actually present in the record. The
//! two can legitimately disagree for the same record.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CatalogError;
use crate::normalize::{normalize, SourceGroup};
use crate::record::{Product, ResultRecord};

const UNKNOWN_STATUS: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub keyword: String,
    pub total_products: u64,
    #[serde(rename = "platforms")]
    pub sources: IndexMap<String, SourceStats>,
    pub price_stats: PriceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStats {
    pub product_count: u64,
    pub status: String,
    pub execution_time: f64,
}

/// Price distribution over every positively priced product.
///
/// When no product carries a price all four fields are zero; `total == 0` is
/// the only way to tell that apart from real data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub total: u64,
}

impl PriceStats {
    /// Summarizes a sequence of prices. Callers filter out unpriced items.
    #[must_use]
    pub fn from_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut iter = prices.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };

        let (min, max, sum, count) = iter.fold((first, first, first, 1_u64), |acc, p| {
            (acc.0.min(p), acc.1.max(p), acc.2 + p, acc.3 + 1)
        });

        #[allow(clippy::cast_precision_loss)]
        let average = sum / count as f64;

        Self {
            min,
            max,
            average,
            total: count,
        }
    }
}

impl SourceStats {
    fn from_group(group: &SourceGroup<'_>) -> Self {
        Self {
            product_count: group
                .total_products
                .unwrap_or(group.products.len() as u64),
            status: group
                .status
                .as_deref()
                .unwrap_or(UNKNOWN_STATUS)
                .to_string(),
            execution_time: group.execution_time.unwrap_or(0.0),
        }
    }
}

/// Computes per-source counts and price statistics for a record.
///
/// # Errors
///
/// Returns [`CatalogError::Schema`] when the record has neither `results`
/// nor `products`.
pub fn compute_statistics(record: &ResultRecord) -> Result<Statistics, CatalogError> {
    let view = normalize(record)?;

    let sources: IndexMap<String, SourceStats> = view
        .iter()
        .map(|(name, group)| ((*name).to_string(), SourceStats::from_group(group)))
        .collect();

    // Reported counts come straight from the file; clamp rather than wrap.
    let total_products = sources
        .values()
        .map(|s| s.product_count)
        .fold(0, u64::saturating_add);

    let price_stats = PriceStats::from_prices(
        view.values()
            .flat_map(|group| group.products.iter())
            .filter_map(Product::listed_price),
    );

    Ok(Statistics {
        keyword: record.keyword.clone().unwrap_or_default(),
        total_products,
        sources,
        price_stats,
    })
}
