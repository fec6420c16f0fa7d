use anyhow::{Context, Result};
use std::path::PathBuf;

use dexgraph::config::Config;
use dexgraph::error::Error;
use dexgraph::ontology::{OutputFormat, Pipeline};
use dexgraph::utils::{format_bytes, format_duration_ms};

/// Command-line values that override the config file
#[derive(Debug, Default)]
pub struct MergeOverrides {
    pub vocabulary: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    pub translations: Vec<PathBuf>,
    pub link_graphs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub report: Option<PathBuf>,
    pub strict_hidden_abilities: bool,
}

impl MergeOverrides {
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(vocabulary) = self.vocabulary {
            config.inputs.vocabulary = Some(vocabulary);
        }
        if let Some(dir) = self.data_dir {
            config.inputs.data_dir = Some(dir);
        }
        config.inputs.files.extend(self.files);
        config.translations.files.extend(self.translations);
        config.augment.link_graphs.extend(self.link_graphs);
        if let Some(output) = self.output {
            config.output.path = output;
        }
        if let Some(format) = self.format {
            config.output.format = OutputFormat::parse(&format)
                .with_context(|| format!("Unknown output format: {format}"))?;
        }
        if let Some(report) = self.report {
            config.output.report = Some(report);
        }
        if self.strict_hidden_abilities {
            config.linking.mint_hidden_abilities = false;
        }
        Ok(())
    }
}

pub fn merge(config_path: Option<PathBuf>, overrides: MergeOverrides) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    overrides.apply(&mut config)?;
    config
        .validate()
        .map_err(|e| Error::config(format!("{e:#}")))?;

    println!("Merging Bulbapedia graphs");
    println!("=========================");
    if let Some(path) = &config_path {
        println!("Config: {}", path.display());
    }
    if let Some(dir) = &config.inputs.data_dir {
        println!("Data directory: {}", dir.display());
    }
    println!();

    let pipeline = Pipeline::new(config);
    let (_graph, report) = pipeline.run().context("Merge failed")?;

    println!("{}", report.summary());

    println!("Stage Timings");
    println!("-------------");
    for timing in &report.timings {
        println!("  {:12} {}", timing.name, format_duration_ms(timing.duration_ms));
    }

    let skipped = report.audit.counts_by_kind();
    if !skipped.is_empty() {
        println!("\nSkipped Items");
        println!("-------------");
        for (kind, count) in skipped {
            println!("  {kind:?}: {count}");
        }
    }

    println!("\nDigest: {}", report.stats.digest);
    println!("Written: {}", format_bytes(report.bytes_written as u64));
    if let Some(path) = &pipeline.config().output.report {
        println!("Report: {}", path.display());
    }

    Ok(())
}
