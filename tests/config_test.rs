//! Tests for config module

use dexgraph::config::Config;
use dexgraph::ontology::OutputFormat;
use std::path::{Path, PathBuf};

#[test]
fn test_config_file_exists() {
    let config_path = Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_config_toml_readable() {
    let content =
        std::fs::read_to_string("config.toml").expect("Should be able to read config.toml");

    for section in [
        "[inputs]",
        "[references]",
        "[translations]",
        "[augment]",
        "[output]",
        "[logging]",
    ] {
        assert!(content.contains(section), "config.toml should have {section} section");
    }
}

#[test]
fn test_config_toml_loads_and_validates() {
    let config = Config::from_file(Path::new("config.toml")).unwrap();
    config.validate().unwrap();

    assert_eq!(config.inputs.data_dir, Some(PathBuf::from("data")));
    assert_eq!(config.vocabulary_file_name(), Some("vocabulary.ttl"));
    assert_eq!(config.output.format, OutputFormat::Turtle);
    assert_eq!(config.augment.templates.len(), 2);
    assert!(config.linking.mint_hidden_abilities);
}

#[test]
fn test_missing_config_file_errors() {
    let err = Config::from_file(Path::new("no-such-config.toml")).unwrap_err();
    assert!(err.to_string().contains("no-such-config.toml"));
}

#[test]
fn test_malformed_config_errors() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[output\npath = ").unwrap();
    assert!(Config::from_file(&path).is_err());
}
