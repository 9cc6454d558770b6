pub mod app_config;
pub mod browse;
pub mod config;
pub mod error;
pub mod normalize;
pub mod record;
pub mod stats;

pub use app_config::{AppConfig, Environment};
pub use browse::{browse_products, ProductItem, ProductPage, ProductQuery, ProductSort};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{CatalogError, ConfigError};
pub use normalize::{normalize, NormalizedView, SourceGroup};
pub use record::{ListingEntry, Product, RecordLayout, ResultRecord, SourceResult};
pub use stats::{compute_statistics, PriceStats, SourceStats, Statistics};

/// Source name used whenever a record does not say where its products came from.
pub const UNKNOWN_SOURCE: &str = "unknown";
