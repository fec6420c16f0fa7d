use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use dexgraph::ontology::records::{build_file, BuildOptions};
use dexgraph::ontology::{read_turtle, write_graph, EntityKind, OutputFormat, Vocabulary};

pub fn build(
    kind: String,
    input: PathBuf,
    output: PathBuf,
    vocabulary: Option<PathBuf>,
    hidden_abilities: Option<PathBuf>,
    format: String,
) -> Result<()> {
    let kind = EntityKind::parse(&kind).with_context(|| format!("Unknown entity kind: {kind}"))?;
    let format =
        OutputFormat::parse(&format).with_context(|| format!("Unknown output format: {format}"))?;

    let vocabulary = match &vocabulary {
        Some(path) => {
            let graph = read_turtle(path)
                .with_context(|| format!("Failed to load vocabulary: {}", path.display()))?;
            Vocabulary::from_graph(&graph)
        }
        None => {
            tracing::warn!("No vocabulary given, class checks will pass");
            Vocabulary::absent()
        }
    };

    let mut options = BuildOptions::default();
    if let Some(path) = &hidden_abilities {
        let file = File::open(path).with_context(|| {
            format!("Failed to open hidden abilities listing: {}", path.display())
        })?;
        options = options.with_hidden_listing(BufReader::new(file))?;
        tracing::info!(count = options.hidden_abilities.len(), "Loaded hidden abilities listing");
    }

    println!("Building {kind} graph from {}", input.display());

    let (graph, report) = build_file(kind, &input, &vocabulary, &options)
        .with_context(|| format!("Failed to build {kind} graph"))?;
    let bytes = write_graph(&graph, &output, format)?;

    println!();
    println!("Records read: {}", report.records_read);
    println!("Records skipped: {}", report.records_skipped);
    println!("Entities: {}", report.entities);
    println!("Values omitted: {}", report.invalid_values);
    println!("Triples: {}", report.triples);
    println!("Output: {} ({bytes} bytes)", output.display());

    for entry in report.audit.entries() {
        tracing::debug!(item = %entry.item, kind = ?entry.kind, "{}", entry.detail);
    }

    Ok(())
}
