//! Configuration management for dexgraph
//!
//! This module handles loading and validating the merge configuration from a
//! TOML file. Command-line flags override individual values after loading.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ontology::augment::AugmentConfig;
use crate::ontology::linker::LinkerConfig;
use crate::ontology::storage::OutputFormat;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vocabulary and per-category graphs
    pub inputs: InputsConfig,

    /// Reference graphs the linker checks against
    pub references: ReferencesConfig,

    /// Link rule switches
    pub linking: LinkingConfig,

    /// Translation tables
    pub translations: TranslationsConfig,

    /// External-link augmentation
    pub augment: AugmentSection,

    /// Output graph and report
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Input graphs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    /// Vocabulary file declaring the classes
    pub vocabulary: Option<PathBuf>,

    /// Directory whose `.ttl` files are all loaded (vocabulary excluded)
    pub data_dir: Option<PathBuf>,

    /// Additional data files, loaded after the directory
    pub files: Vec<PathBuf>,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            vocabulary: Some(PathBuf::from("data/vocabulary.ttl")),
            data_dir: Some(PathBuf::from("data")),
            files: Vec::new(),
        }
    }
}

/// Reference graphs; an unset entry means "check the unified graph"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencesConfig {
    pub types: Option<PathBuf>,
    pub abilities: Option<PathBuf>,
    pub egg_groups: Option<PathBuf>,
}

/// Link rule switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Mint hidden abilities missing from the abilities reference
    pub mint_hidden_abilities: bool,

    /// Link moves to their type
    pub link_move_types: bool,

    /// Link episodes to the Pokémon debuting in them
    pub link_episode_debuts: bool,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            mint_hidden_abilities: true,
            link_move_types: true,
            link_episode_debuts: true,
        }
    }
}

impl LinkingConfig {
    /// Linker configuration for these switches
    pub fn linker_config(&self) -> LinkerConfig {
        LinkerConfig::builder()
            .mint_hidden_abilities(self.mint_hidden_abilities)
            .link_move_types(self.link_move_types)
            .link_episode_debuts(self.link_episode_debuts)
            .build()
    }
}

/// Translation tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationsConfig {
    /// TSV files with a `type id label language` header
    pub files: Vec<PathBuf>,
}

/// External-link augmentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentSection {
    /// Link graphs (scraped page metadata with `dbo:wikiPageExternalLink`)
    pub link_graphs: Vec<PathBuf>,

    /// Derived identifier templates (`{name}` or `{key}` placeholder)
    pub templates: Vec<String>,
}

impl Default for AugmentSection {
    fn default() -> Self {
        Self {
            link_graphs: Vec::new(),
            templates: AugmentConfig::default().templates,
        }
    }
}

impl AugmentSection {
    pub fn augment_config(&self) -> AugmentConfig {
        AugmentConfig {
            templates: self.templates.clone(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Merged graph destination
    pub path: PathBuf,

    /// Serialization format
    pub format: OutputFormat,

    /// JSON run report destination
    pub report: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output/pokemon.ttl"),
            format: OutputFormat::Turtle,
            report: Some(PathBuf::from("output/report.json")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.inputs.data_dir.is_none() && self.inputs.files.is_empty() {
            anyhow::bail!("inputs: set data_dir or list at least one file");
        }

        if self.output.path.as_os_str().is_empty() {
            anyhow::bail!("output.path must not be empty");
        }

        if self.output.report.as_deref() == Some(self.output.path.as_path()) {
            anyhow::bail!("output.report must differ from output.path");
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            );
        }

        if !LOG_FORMATS.contains(&self.logging.format.to_lowercase().as_str()) {
            anyhow::bail!("logging.format must be text or json, got '{}'", self.logging.format);
        }

        self.augment
            .augment_config()
            .validate()
            .context("Invalid [augment] section")?;

        Ok(())
    }

    /// Vocabulary file name inside `data_dir`, excluded from the data files
    pub fn vocabulary_file_name(&self) -> Option<&str> {
        self.inputs
            .vocabulary
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_inputs() {
        let mut config = Config::default();
        config.inputs.data_dir = None;
        assert!(config.validate().is_err());

        config.inputs.files.push(PathBuf::from("pokemon.ttl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = String::from("loud");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_template() {
        let mut config = Config::default();
        config.augment.templates = vec![String::from("http://dbpedia.org/resource/")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [output]
            path = "merged.nt"
            format = "ntriples"
            "#,
        )
        .unwrap();
        assert_eq!(config.output.format, OutputFormat::NTriples);
        assert_eq!(config.output.report, Some(PathBuf::from("output/report.json")));
        assert!(config.linking.mint_hidden_abilities);
        assert_eq!(config.vocabulary_file_name(), Some("vocabulary.ttl"));
    }
}
