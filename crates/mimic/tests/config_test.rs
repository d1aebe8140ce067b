//! Tests for configuration layering.

use mimic::MimicConfig;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_bundled_defaults() {
    let config = MimicConfig::from_toml("").unwrap();

    assert_eq!(config, MimicConfig::default());
    assert_eq!(config.cache_dir(), &PathBuf::from("cache"));
    assert_eq!(*config.cache_ttl_hours(), 24);
    assert_eq!(*config.time_span_months(), 3);
    assert!(config.excluded_users().is_empty());
}

#[test]
fn test_overrides_replace_defaults() {
    let config = MimicConfig::from_toml(
        r#"
        cache_dir = "/var/cache/mimic"
        cache_ttl_hours = 6
        excluded_users = ["111", "222"]
        "#,
    )
    .unwrap();

    assert_eq!(config.cache_dir(), &PathBuf::from("/var/cache/mimic"));
    assert_eq!(*config.cache_ttl_hours(), 6);
    assert_eq!(*config.max_batches(), 30);
    assert_eq!(config.excluded_users().iter().collect::<Vec<_>>(), vec!["111", "222"]);
}

#[test]
fn test_excluded_users_accepts_csv() {
    let config = MimicConfig::from_toml(r#"excluded_users = "111, 222,,333""#).unwrap();

    assert_eq!(config.excluded_users().len(), 3);
    assert!(config.excluded_users().is_excluded("333"));
}

#[test]
fn test_component_configs_follow_settings() {
    let config = MimicConfig::from_toml(
        r#"
        cache_ttl_hours = 12
        max_batches = 5
        page_size = 50
        maintenance_concurrency = 2
        "#,
    )
    .unwrap();

    let cache = config.cache_config().unwrap();
    assert_eq!(*cache.ttl_hours(), 12);
    assert_eq!(cache.ttl(), chrono::Duration::hours(12));
    assert_eq!(*cache.maintenance_concurrency(), 2);

    let fetch = config.fetch_config().unwrap();
    assert_eq!(*fetch.max_batches(), 5);
    assert_eq!(*fetch.page_size(), 50);
    assert_eq!(config.cache_config().unwrap().cache_dir(), config.cache_dir());
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(MimicConfig::from_toml("page_size = 0").is_err());
    assert!(MimicConfig::from_toml("page_size = 101").is_err());
    assert!(MimicConfig::from_toml("cache_ttl_hours = 0").is_err());
    assert!(MimicConfig::from_toml("time_span_months = \"three\"").is_err());
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mimic.toml");
    std::fs::write(&path, "time_span_months = 6\n").unwrap();

    let config = MimicConfig::from_file(&path).unwrap();
    assert_eq!(*config.time_span_months(), 6);

    assert!(MimicConfig::from_file(dir.path().join("missing.toml")).is_err());
}
