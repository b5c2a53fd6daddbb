//! Layering of TOML file values and environment overrides.

use std::{fs, time::Duration};

use marquee_config::{
    ConfigLoadError, ConfigLoader, EnvConfig, StaleResponseMode,
};
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("marquee.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn file_values_are_applied() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
        [tmdb]
        api_key = "file-key"
        language = "en-US"
        request_timeout = "5s"

        [catalog]
        default_region = "GB"
        fetch_max_attempts = 3
        fetch_backoff = "100ms"
        stale_responses = "discard"
        event_capacity = 32
        "#,
    );

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .expect("config");
    let config = load.config;

    assert_eq!(config.tmdb.api_key, "file-key");
    assert_eq!(config.tmdb.language.as_deref(), Some("en-US"));
    assert_eq!(config.tmdb.request_timeout, Duration::from_secs(5));
    assert_eq!(config.catalog.default_region.as_deref(), Some("GB"));
    assert_eq!(config.catalog.fetch.max_attempts, 3);
    assert_eq!(config.catalog.fetch.backoff, Duration::from_millis(100));
    assert_eq!(config.catalog.stale_responses, StaleResponseMode::Discard);
    assert_eq!(config.catalog.event_capacity, 32);
    assert_eq!(config.metadata.config_path, Some(path));
    assert!(load.warnings.is_empty());
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
        [tmdb]
        api_key = "file-key"
        region = "DE"

        [catalog]
        stale_responses = "discard"
        "#,
    );
    let env = EnvConfig::from_pairs([
        ("TMDB_API_KEY", "env-key"),
        ("TMDB_REGION", "FR"),
        ("MARQUEE_STALE_RESPONSES", "commit"),
    ]);

    let config = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env)
        .expect("config")
        .config;

    assert_eq!(config.tmdb.api_key, "env-key");
    assert_eq!(config.tmdb.region.as_deref(), Some("FR"));
    assert_eq!(config.catalog.stale_responses, StaleResponseMode::Commit);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("nope.toml");

    let err = ConfigLoader::new()
        .with_config_path(&missing)
        .load_with_env(EnvConfig::default())
        .expect_err("missing config");

    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn malformed_toml_reports_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "[catalog\nfetch_max_attempts = ");

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .expect_err("parse error");

    match err {
        ConfigLoadError::Parse { path: reported, .. } => {
            assert_eq!(reported, path)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn retries_without_backoff_warn() {
    let env = EnvConfig::from_pairs([
        ("TMDB_API_KEY", "k"),
        ("MARQUEE_FETCH_MAX_ATTEMPTS", "4"),
        ("MARQUEE_FETCH_BACKOFF", "0s"),
    ]);

    let load = ConfigLoader::new().load_with_env(env).expect("config");

    assert_eq!(load.config.catalog.fetch.max_attempts, 4);
    assert_eq!(load.warnings.len(), 1);
}
