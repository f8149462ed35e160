use std::fs;

use repost_core::{
    config::{self, config_path_at},
    AppConfig, ConfigError,
};
use rstest::rstest;
use tempfile::TempDir;

#[test]
fn init_writes_starter_config_once() {
    let home = TempDir::new().unwrap();
    let (first, created) = config::init_at(home.path(), false).unwrap();
    assert!(created);
    assert!(config_path_at(home.path()).exists());

    let mut edited = first.clone();
    edited.categories_term_set_id = "custom".to_string();
    config::save_at(home.path(), &edited).unwrap();

    let (second, created) = config::init_at(home.path(), false).unwrap();
    assert!(!created, "init must be idempotent");
    assert_eq!(second.categories_term_set_id, "custom");
}

#[test]
fn force_init_overwrites() {
    let home = TempDir::new().unwrap();
    let mut config = AppConfig::starter();
    config.categories_term_set_id = "custom".to_string();
    config::save_at(home.path(), &config).unwrap();

    let (written, created) = config::init_at(home.path(), true).unwrap();
    assert!(created);
    assert_eq!(written, AppConfig::starter());
}

#[test]
fn init_rejects_existing_invalid_config() {
    let home = TempDir::new().unwrap();
    let path = config_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "repost_content_type_id: 0x01\ncategories_term_set_id: ts\nnews_link_template: https://x/\n",
    )
    .unwrap();

    match config::init_at(home.path(), false).unwrap_err() {
        ConfigError::Invalid { field, .. } => assert_eq!(field, "news_link_template"),
        other => panic!("unexpected error: {other}"),
    }

    let (_, created) = config::init_at(home.path(), true).unwrap();
    assert!(created, "--force replaces an invalid config");
}

#[test]
fn save_load_roundtrip() {
    let home = TempDir::new().unwrap();
    let config = AppConfig::starter();
    config::save_at(home.path(), &config).unwrap();
    let loaded = config::load_at(home.path()).unwrap();
    assert_eq!(loaded, config);

    let tmp_path = config_path_at(home.path()).with_extension("yaml.tmp");
    assert!(!tmp_path.exists(), "tmp file should be renamed away");
}

#[test]
fn missing_config_is_reported() {
    let home = TempDir::new().unwrap();
    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
}

#[test]
fn malformed_yaml_reports_path() {
    let home = TempDir::new().unwrap();
    let path = config_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "repost_content_type_id: [unclosed").unwrap();
    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[rstest]
#[case("repost_content_type_id: ''\ncategories_term_set_id: ts\nnews_link_template: https://x/{0}\n", "repost_content_type_id")]
#[case("repost_content_type_id: 0x01\ncategories_term_set_id: ''\nnews_link_template: https://x/{0}\n", "categories_term_set_id")]
#[case("repost_content_type_id: 0x01\ncategories_term_set_id: ts\nnews_link_template: https://x/\n", "news_link_template")]
fn invalid_settings_are_fatal(#[case] yaml: &str, #[case] expected_field: &str) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.yaml");
    fs::write(&path, yaml).unwrap();
    match config::load_from(&path).unwrap_err() {
        ConfigError::Invalid { field, .. } => assert_eq!(field, expected_field),
        other => panic!("unexpected error: {other}"),
    }
}
