//! On-disk result records as written by the crawler.
//!
//! Two layouts exist in the wild:
//!
//! - **Multi-source** (current): a top-level `results` object mapping each
//!   source name to a [`SourceResult`].
//! - **Legacy** (single source): a top-level `platform` string next to a flat
//!   `products` array.
//!
//! The layout is detected exactly once, when the record is deserialized, and
//! carried as [`RecordLayout`]. Nothing downstream inspects field presence
//! again.
//!
//! Parsing is lenient below the top level: a record must be a JSON object and
//! `results`/`products` must have their container type, but any other field
//! holding an unexpected type is treated as absent.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::UNKNOWN_SOURCE;

/// One collected item, kept verbatim.
///
/// Only a handful of fields are ever interpreted; everything else passes
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(Map<String, Value>);

impl Product {
    /// The numeric `price` field, if present and a JSON number.
    #[must_use]
    pub fn price(&self) -> Option<f64> {
        self.0.get("price").and_then(Value::as_f64)
    }

    /// The price if it counts towards price statistics (strictly positive).
    #[must_use]
    pub fn listed_price(&self) -> Option<f64> {
        self.price().filter(|p| *p > 0.0)
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Source name the crawler stamped on the product itself, if any.
    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.0.get("platform").and_then(Value::as_str)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Product {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Per-source outcome inside a multi-source record.
///
/// Built from whatever JSON sits under the source key; a `null` or non-object
/// entry is a source with nothing known about it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct SourceResult {
    /// Count reported by the source collector. May disagree with
    /// `products.len()`; both are kept.
    pub total_products: Option<u64>,
    pub status: Option<String>,
    pub execution_time: Option<f64>,
    pub products: Vec<Product>,
}

impl From<Value> for SourceResult {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        let products = match fields.remove("products") {
            Some(Value::Array(items)) => products_from(items),
            _ => Vec::new(),
        };
        Self {
            total_products: fields.get("total_products").and_then(count),
            status: string_field(&fields, "status"),
            execution_time: fields.get("execution_time").and_then(Value::as_f64),
            products,
        }
    }
}

/// Shape of a record, resolved once at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordLayout {
    MultiSource(IndexMap<String, SourceResult>),
    Legacy {
        platform: Option<String>,
        products: Vec<Product>,
    },
    /// Neither `results` nor `products` was present.
    Unrecognized { platform: Option<String> },
}

impl RecordLayout {
    /// Source names in file order: the keys of `results`, or the single
    /// legacy `platform` (defaulting to `"unknown"`).
    #[must_use]
    pub fn source_names(&self) -> Vec<String> {
        match self {
            Self::MultiSource(results) => results.keys().cloned().collect(),
            Self::Legacy { platform, .. } | Self::Unrecognized { platform } => {
                vec![platform
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())]
            }
        }
    }
}

/// A parsed result record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ResultRecord {
    pub keyword: Option<String>,
    /// Opaque timestamp string; compared as text, never parsed.
    pub crawl_time: Option<String>,
    /// Top-level product count written by the crawler, if any.
    pub total_products: Option<u64>,
    pub layout: RecordLayout,
}

/// A layout field that is present but holds the wrong kind of JSON value.
#[derive(Debug, thiserror::Error)]
#[error("`{field}` must be {expected}")]
pub struct LayoutTypeError {
    field: &'static str,
    expected: &'static str,
}

impl TryFrom<Map<String, Value>> for ResultRecord {
    type Error = LayoutTypeError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let platform = string_field(&fields, "platform");
        let results = fields.remove("results").filter(|v| !v.is_null());
        let products = fields.remove("products").filter(|v| !v.is_null());

        let layout = match (results, products) {
            (Some(Value::Object(results)), _) => RecordLayout::MultiSource(
                results
                    .into_iter()
                    .map(|(name, source)| (name, SourceResult::from(source)))
                    .collect(),
            ),
            (Some(_), _) => {
                return Err(LayoutTypeError {
                    field: "results",
                    expected: "an object",
                })
            }
            (None, Some(Value::Array(items))) => RecordLayout::Legacy {
                platform,
                products: products_from(items),
            },
            (None, Some(_)) => {
                return Err(LayoutTypeError {
                    field: "products",
                    expected: "an array",
                })
            }
            (None, None) => RecordLayout::Unrecognized { platform },
        };

        Ok(Self {
            keyword: string_field(&fields, "keyword"),
            crawl_time: string_field(&fields, "crawl_time"),
            total_products: fields.get("total_products").and_then(count),
            layout,
        })
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Non-negative whole numbers, including ones written as floats (`12.0`).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
fn count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0 && n.trunc() == *n)
            .map(|n| n as u64)
    })
}

/// Keeps object entries only; anything else in a product array carries no
/// fields to read.
fn products_from(items: Vec<Value>) -> Vec<Product> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(Product(fields)),
            _ => None,
        })
        .collect()
}

/// Lightweight catalog metadata for one record file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingEntry {
    pub filename: String,
    pub filepath: PathBuf,
    pub keyword: String,
    pub total_products: u64,
    pub crawl_time: String,
    pub file_size: u64,
    pub platforms: Vec<String>,
}

impl ListingEntry {
    /// Builds a listing entry, applying the catalog defaults for missing
    /// fields.
    #[must_use]
    pub fn from_record(
        filename: String,
        filepath: PathBuf,
        file_size: u64,
        record: &ResultRecord,
    ) -> Self {
        Self {
            filename,
            filepath,
            keyword: record
                .keyword
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            total_products: record.total_products.unwrap_or(0),
            crawl_time: record.crawl_time.clone().unwrap_or_default(),
            file_size,
            platforms: record.layout.source_names(),
        }
    }
}
