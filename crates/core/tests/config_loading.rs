use std::path::PathBuf;

use crashsift_core::config::{AnalyzerConfig, ConfigError, DEFAULT_MAX_FRAMES};
use tempfile::tempdir;

#[test]
fn loads_partial_json_with_defaults() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("crashsift.json");
    std::fs::write(&path, r#"{ "tools": { "gdb": "/opt/gdb/bin/gdb" }, "timeout_secs": 30 }"#)
        .unwrap();

    let config = AnalyzerConfig::load(&path).expect("config");
    assert_eq!(config.tools.gdb, PathBuf::from("/opt/gdb/bin/gdb"));
    assert_eq!(config.tools.dbx, PathBuf::from("dbx"));
    assert_eq!(config.timeout_secs, Some(30));
    assert_eq!(config.max_frames, DEFAULT_MAX_FRAMES);
}

#[test]
fn loads_yaml_config() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("crashsift.yml");
    std::fs::write(&path, "max_frames: 20\nuser: ci\ntools:\n  strings: /usr/bin/strings\n")
        .unwrap();

    let config = AnalyzerConfig::load(&path).expect("config");
    assert_eq!(config.max_frames, 20);
    assert_eq!(config.user.as_deref(), Some("ci"));
    assert_eq!(config.tools.strings, PathBuf::from("/usr/bin/strings"));
}

#[test]
fn rejects_unknown_extension() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("crashsift.toml");
    std::fs::write(&path, "max_frames = 3").unwrap();
    let err = AnalyzerConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "toml"));
}

#[test]
fn reports_corrupt_json() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("bad.json");
    std::fs::write(&path, "not-json").unwrap();
    let err = AnalyzerConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config JSON"), "unexpected error: {err}");
}

#[test]
fn missing_file_is_read_error() {
    let temp = tempdir().unwrap();
    let err = AnalyzerConfig::load(&temp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
