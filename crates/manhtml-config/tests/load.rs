#![allow(clippy::expect_used, reason = "Expect is acceptable in tests")]

use std::fs;

use manhtml_config::{Config, ConfigError};
use manhtml_roff::OutputMode;
use tempfile::tempdir;

#[test]
fn test_files_merge_in_order_then_overrides_apply() {
  let dir = tempdir().expect("tempdir");
  let base = dir.path().join("base.toml");
  let site = dir.path().join("site.json");

  fs::write(&base, "mode = \"jekyll\"\nlayout = \"page\"\n").expect("write");
  fs::write(&site, r#"{ "layout": "manpage", "permalink": "/man/" }"#)
    .expect("write");

  let config = Config::load(&[base, site], &["permalink=/docs/".to_string()])
    .expect("load");

  assert_eq!(config.output_mode().expect("mode"), OutputMode::Jekyll);
  assert_eq!(config.layout.as_deref(), Some("manpage"));
  assert_eq!(config.permalink.as_deref(), Some("/docs/"));
}

#[test]
fn test_invalid_mode_in_file_is_fatal() {
  let dir = tempdir().expect("tempdir");
  let path = dir.path().join("bad.toml");
  fs::write(&path, "mode = \"pdf\"\n").expect("write");

  let err = Config::load(&[path], &[]).expect_err("invalid mode");
  assert!(matches!(err, ConfigError::Roff(_)));
  assert!(err.to_string().contains("pdf"));
}

#[test]
fn test_unknown_keys_and_extensions_are_rejected() {
  let dir = tempdir().expect("tempdir");
  let unknown = dir.path().join("unknown.toml");
  let yaml = dir.path().join("config.yaml");
  fs::write(&unknown, "colour = \"red\"\n").expect("write");
  fs::write(&yaml, "mode: raw\n").expect("write");

  assert!(matches!(
    Config::from_file(&unknown),
    Err(ConfigError::Toml { path, .. }) if path == unknown
  ));
  let err = Config::from_file(&yaml).expect_err("unsupported");
  assert!(err.to_string().contains("Unsupported config file format"));
}

#[test]
fn test_read_and_parse_failures_keep_the_path() {
  let dir = tempdir().expect("tempdir");
  let missing = dir.path().join("missing.toml");
  let broken_json = dir.path().join("broken.json");
  let broken_toml = dir.path().join("broken.toml");
  fs::write(&broken_json, "{ \"mode\": ").expect("write");
  fs::write(&broken_toml, "mode = ").expect("write");

  let err = Config::from_file(&missing).expect_err("missing file");
  assert!(matches!(&err, ConfigError::Io { path, .. } if *path == missing));
  assert!(err.to_string().contains("missing.toml"));

  let err = Config::from_file(&broken_json).expect_err("broken json");
  assert!(matches!(
    &err,
    ConfigError::Json { path, .. } if *path == broken_json
  ));
  assert!(err.to_string().starts_with("Failed to parse JSON config from"));

  let err =
    Config::load(&[broken_toml.clone()], &[]).expect_err("broken toml");
  assert!(matches!(
    &err,
    ConfigError::Toml { path, .. } if *path == broken_toml
  ));
}
