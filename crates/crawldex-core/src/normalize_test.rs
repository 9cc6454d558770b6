use serde_json::{json, Value};

use super::*;

fn parse(value: Value) -> ResultRecord {
    serde_json::from_value(value).expect("record should parse")
}

#[test]
fn legacy_record_becomes_single_group_keyed_by_platform() {
    let record = parse(json!({
        "platform": "shopee",
        "products": [{ "price": 10 }, { "price": 20 }, {}]
    }));
    let view = normalize(&record).unwrap();

    assert_eq!(view.len(), 1);
    let group = &view["shopee"];
    assert_eq!(group.total_products, Some(3));
    assert_eq!(group.status.as_deref(), Some("success"));
    assert_eq!(group.execution_time, Some(0.0));
    assert_eq!(group.products.len(), 3);
}

#[test]
fn legacy_record_without_platform_is_keyed_unknown() {
    let record = parse(json!({ "products": [] }));
    let view = normalize(&record).unwrap();
    assert_eq!(view.keys().copied().collect::<Vec<_>>(), vec!["unknown"]);
    assert_eq!(view["unknown"].total_products, Some(0));
}

#[test]
fn multi_source_record_maps_through_unchanged() {
    let record = parse(json!({
        "results": {
            "momo": {
                "total_products": 50,
                "status": "success",
                "execution_time": 3.25,
                "products": [{ "price": 1 }]
            },
            "pchome": { "status": "timeout" }
        }
    }));
    let view = normalize(&record).unwrap();

    assert_eq!(view.keys().copied().collect::<Vec<_>>(), vec!["momo", "pchome"]);
    let momo = &view["momo"];
    assert_eq!(momo.total_products, Some(50));
    assert_eq!(momo.status.as_deref(), Some("success"));
    assert_eq!(momo.execution_time, Some(3.25));
    assert_eq!(momo.products.len(), 1);

    let pchome = &view["pchome"];
    assert_eq!(pchome.total_products, None);
    assert_eq!(pchome.status.as_deref(), Some("timeout"));
    assert_eq!(pchome.execution_time, None);
    assert!(pchome.products.is_empty());
}

#[test]
fn empty_results_object_yields_empty_view() {
    let record = parse(json!({ "results": {} }));
    let view = normalize(&record).unwrap();
    assert!(view.is_empty());
}

#[test]
fn unrecognized_record_is_schema_error() {
    let record = parse(json!({ "keyword": "laptop", "crawl_time": "2024-01-01" }));
    let err = normalize(&record).unwrap_err();
    assert!(matches!(err, CatalogError::Schema), "got {err:?}");
}

#[test]
fn normalize_is_deterministic() {
    let record = parse(json!({
        "results": { "b": { "total_products": 1 }, "a": { "total_products": 2 } }
    }));
    assert_eq!(normalize(&record).unwrap(), normalize(&record).unwrap());
}
