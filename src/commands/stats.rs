use anyhow::{Context, Result};
use std::path::PathBuf;

use dexgraph::ontology::translations::languages_by_subject;
use dexgraph::ontology::{read_turtle, GraphStats, PipelineReport};
use dexgraph::utils::truncate_text;

const AUDIT_PREVIEW: usize = 20;

pub fn stats(graph_path: PathBuf, report_path: Option<PathBuf>) -> Result<()> {
    if !graph_path.exists() {
        println!("Graph not found: {}", graph_path.display());
        println!("Run a merge first to create it.");
        return Ok(());
    }

    let graph = read_turtle(&graph_path)
        .with_context(|| format!("Failed to load graph: {}", graph_path.display()))?;
    let stats = GraphStats::from_graph(&graph);

    println!("Graph Statistics");
    println!("================");
    println!("File: {}", graph_path.display());
    println!();
    print!("{}", stats.detailed_report());

    let languages = languages_by_subject(&graph);
    if !languages.is_empty() {
        let mut per_language = std::collections::BTreeMap::new();
        for tags in languages.values() {
            for tag in tags {
                *per_language.entry(tag.as_str()).or_insert(0usize) += 1;
            }
        }
        println!("\nTranslated Names");
        println!("----------------");
        println!("Subjects with names: {}", languages.len());
        for (tag, count) in per_language {
            println!("  {tag:10} {count:>8}");
        }
    }

    if let Some(path) = report_path {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read report: {}", path.display()))?;
        let report: PipelineReport = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse report: {}", path.display()))?;

        println!("\nLast Run ({})", report.finished_at.to_rfc3339());
        println!("--------");
        print!("{}", report.summary());

        for entry in report.audit.entries().iter().take(AUDIT_PREVIEW) {
            println!(
                "  [{}] {:?} {}: {}",
                entry.stage,
                entry.kind,
                truncate_text(&entry.item, 48),
                truncate_text(&entry.detail, 72)
            );
        }
        if report.audit.len() > AUDIT_PREVIEW {
            println!("  ... {} more", report.audit.len() - AUDIT_PREVIEW);
        }
    }

    Ok(())
}
