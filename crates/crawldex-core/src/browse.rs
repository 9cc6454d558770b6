//! Flattened, filterable product listing across every source of a record.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::normalize::normalize;
use crate::record::{Product, ResultRecord};

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    PriceAsc,
    PriceDesc,
    TitleAsc,
    Source,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductQuery {
    /// Only keep products from this source.
    pub source: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort: ProductSort,
    /// 1-based page number.
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductItem {
    pub source: String,
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub items: Vec<ProductItem>,
    /// Number of products matching the filters, across all pages.
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Price used for filtering and sorting; unpriced products count as zero.
fn sort_price(product: &Product) -> f64 {
    product.price().unwrap_or(0.0)
}

/// Flattens, filters, sorts and paginates the products of a record.
///
/// Each product is attributed to its own `platform` field when present,
/// otherwise to the source it was listed under.
///
/// # Errors
///
/// Returns [`CatalogError::Schema`] when the record has neither `results`
/// nor `products`.
pub fn browse_products(
    record: &ResultRecord,
    query: &ProductQuery,
) -> Result<ProductPage, CatalogError> {
    let view = normalize(record)?;

    let min_price = query.min_price.unwrap_or(0.0);
    let max_price = query.max_price.unwrap_or(f64::INFINITY);

    let mut matches: Vec<(&str, &Product)> = view
        .iter()
        .flat_map(|(&name, group)| {
            group
                .products
                .iter()
                .map(move |product| (product.platform().unwrap_or(name), product))
        })
        .filter(|(source, _)| query.source.as_deref().is_none_or(|want| want == *source))
        .filter(|(_, product)| {
            let price = sort_price(product);
            price >= min_price && price <= max_price
        })
        .collect();

    matches.sort_by(|a, b| compare(query.sort, a, b));

    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);
    let total = matches.len();

    let items = matches
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .map(|(source, product)| ProductItem {
            source: source.to_string(),
            product: product.clone(),
        })
        .collect();

    Ok(ProductPage {
        items,
        total,
        page,
        per_page,
        total_pages: total.div_ceil(per_page),
    })
}

fn compare(sort: ProductSort, a: &(&str, &Product), b: &(&str, &Product)) -> Ordering {
    match sort {
        ProductSort::PriceAsc => sort_price(a.1).total_cmp(&sort_price(b.1)),
        ProductSort::PriceDesc => sort_price(b.1).total_cmp(&sort_price(a.1)),
        ProductSort::TitleAsc => a.1.title().unwrap_or("").cmp(b.1.title().unwrap_or("")),
        ProductSort::Source => a.0.cmp(b.0),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn parse(value: Value) -> ResultRecord {
        serde_json::from_value(value).expect("record should parse")
    }

    fn sample() -> ResultRecord {
        parse(json!({
            "results": {
                "momo": { "products": [
                    { "title": "Charlie", "price": 300 },
                    { "title": "Alpha", "price": 100 }
                ] },
                "pchome": { "products": [
                    { "title": "Bravo", "price": 200 },
                    { "title": "Delta" }
                ] }
            }
        }))
    }

    fn titles(page: &ProductPage) -> Vec<&str> {
        page.items
            .iter()
            .map(|i| i.product.title().unwrap_or(""))
            .collect()
    }

    #[test]
    fn default_query_sorts_by_price_ascending() {
        let page = browse_products(&sample(), &ProductQuery::default()).unwrap();
        assert_eq!(titles(&page), vec!["Delta", "Alpha", "Bravo", "Charlie"]);
        assert_eq!(page.total, 4);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn price_desc_and_title_sorts() {
        let query = ProductQuery {
            sort: ProductSort::PriceDesc,
            ..ProductQuery::default()
        };
        let page = browse_products(&sample(), &query).unwrap();
        assert_eq!(titles(&page), vec!["Charlie", "Bravo", "Alpha", "Delta"]);

        let query = ProductQuery {
            sort: ProductSort::TitleAsc,
            ..ProductQuery::default()
        };
        let page = browse_products(&sample(), &query).unwrap();
        assert_eq!(titles(&page), vec!["Alpha", "Bravo", "Charlie", "Delta"]);
    }

    #[test]
    fn filters_by_source_and_price_range() {
        let query = ProductQuery {
            source: Some("momo".into()),
            min_price: Some(150.0),
            ..ProductQuery::default()
        };
        let page = browse_products(&sample(), &query).unwrap();
        assert_eq!(titles(&page), vec!["Charlie"]);
        assert_eq!(page.items[0].source, "momo");

        let query = ProductQuery {
            max_price: Some(200.0),
            ..ProductQuery::default()
        };
        let page = browse_products(&sample(), &query).unwrap();
        assert_eq!(page.total, 3, "unpriced product counts as price zero");
    }

    #[test]
    fn product_platform_overrides_source_key() {
        let record = parse(json!({
            "platform": "legacy",
            "products": [{ "title": "X", "price": 1, "platform": "momo" }, { "title": "Y", "price": 2 }]
        }));
        let page = browse_products(&record, &ProductQuery::default()).unwrap();
        let sources: Vec<_> = page.items.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["momo", "legacy"]);
    }

    #[test]
    fn sort_by_source_is_stable() {
        let query = ProductQuery {
            sort: ProductSort::Source,
            ..ProductQuery::default()
        };
        let page = browse_products(&sample(), &query).unwrap();
        assert_eq!(titles(&page), vec!["Charlie", "Alpha", "Bravo", "Delta"]);
    }

    #[test]
    fn paginates_and_clamps() {
        let query = ProductQuery {
            page: Some(2),
            per_page: Some(3),
            ..ProductQuery::default()
        };
        let page = browse_products(&sample(), &query).unwrap();
        assert_eq!(titles(&page), vec!["Charlie"]);
        assert_eq!(page.total_pages, 2);

        let query = ProductQuery {
            page: Some(0),
            per_page: Some(0),
            ..ProductQuery::default()
        };
        let page = browse_products(&sample(), &query).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.total_pages, 4);

        let query = ProductQuery {
            page: Some(9),
            ..ProductQuery::default()
        };
        let page = browse_products(&sample(), &query).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 4);
    }

    #[test]
    fn unrecognized_record_is_schema_error() {
        let record = parse(json!({ "keyword": "x" }));
        assert!(matches!(
            browse_products(&record, &ProductQuery::default()),
            Err(CatalogError::Schema)
        ));
    }

    #[test]
    fn sort_deserializes_from_snake_case() {
        let sort: ProductSort = serde_json::from_value(json!("price_desc")).unwrap();
        assert_eq!(sort, ProductSort::PriceDesc);
    }
}
