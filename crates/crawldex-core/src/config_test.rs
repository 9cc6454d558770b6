use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(parse_environment("development"), Environment::Development);
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test"), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults are valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.results_dir, std::path::PathBuf::from("./results"));
    assert_eq!(cfg.page_size, 12);
    assert_eq!(cfg.rate_limit_per_minute, 120);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("CRAWLDEX_ENV", "production");
    map.insert("CRAWLDEX_BIND_ADDR", "127.0.0.1:8080");
    map.insert("CRAWLDEX_LOG_LEVEL", "debug");
    map.insert("CRAWLDEX_RESULTS_DIR", "/srv/crawler/results");
    map.insert("CRAWLDEX_PAGE_SIZE", "24");
    map.insert("CRAWLDEX_RATE_LIMIT_PER_MINUTE", "30");
    let cfg = build_app_config(lookup_from_map(&map)).expect("overrides are valid");
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8080");
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(
        cfg.results_dir,
        std::path::PathBuf::from("/srv/crawler/results")
    );
    assert_eq!(cfg.page_size, 24);
    assert_eq!(cfg.rate_limit_per_minute, 30);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("CRAWLDEX_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CRAWLDEX_BIND_ADDR"),
        "expected InvalidEnvVar(CRAWLDEX_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_non_numeric_page_size() {
    let mut map = HashMap::new();
    map.insert("CRAWLDEX_PAGE_SIZE", "twelve");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CRAWLDEX_PAGE_SIZE"),
        "expected InvalidEnvVar(CRAWLDEX_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_page_size() {
    let mut map = HashMap::new();
    map.insert("CRAWLDEX_PAGE_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, ref reason }) if var == "CRAWLDEX_PAGE_SIZE" && reason.contains("greater than zero")),
        "expected InvalidEnvVar(CRAWLDEX_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_rate_limit() {
    let mut map = HashMap::new();
    map.insert("CRAWLDEX_RATE_LIMIT_PER_MINUTE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CRAWLDEX_RATE_LIMIT_PER_MINUTE"),
        "expected InvalidEnvVar(CRAWLDEX_RATE_LIMIT_PER_MINUTE), got: {result:?}"
    );
}
