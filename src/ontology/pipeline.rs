//! Merge pipeline
//!
//! Runs the stages in order over one graph value:
//!
//! ```text
//! load ──▶ link ──▶ translate ──▶ augment ──▶ serialize
//! ```
//!
//! Each stage takes the graph and hands back the updated graph plus its
//! report. Per-item failures are recovered inside the stage and recorded in
//! the audit log; only [`OntologyError::NoUsableInput`] and a failed write
//! abort the run.
//!
//! # Example
//!
//! ```no_run
//! use dexgraph::config::Config;
//! use dexgraph::ontology::pipeline::Pipeline;
//!
//! # fn example() -> Result<(), dexgraph::ontology::OntologyError> {
//! let pipeline = Pipeline::new(Config::default());
//! let (graph, report) = pipeline.run()?;
//! println!("{} triples, digest {}", graph.len(), report.stats.digest);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::augment::{augment, AugmentReport};
use super::error::{OntologyError, OntologyResult};
use super::graph::Graph;
use super::linker::{link_all, LinkReport, References};
use super::loader::{load, load_reference, read_turtle, turtle_files, LoadReport, Loaded};
use super::stats::{AuditKind, AuditLog, GraphStats, PipelineProfiler, Stage, StageTiming};
use super::storage::{write_atomic, write_graph, OutputFormat};
use super::translations::{merge_table, read_translations, TranslationReport, TranslationTable};
use crate::config::Config;

// ============================================================================
// Report
// ============================================================================

/// Everything a run did, serialized as the JSON run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Where the graph was written, if it was
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub bytes_written: usize,

    pub load: LoadReport,
    pub link: LinkReport,

    /// Absent when no translation table was configured
    pub translations: Option<TranslationReport>,

    /// Absent when no link graph was configured
    pub augment: Option<AugmentReport>,

    pub stats: GraphStats,
    pub timings: Vec<StageTiming>,
    pub audit: AuditLog,
}

impl PipelineReport {
    /// Human-readable run summary
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Loaded {} of {} files ({} failed)\n",
            self.load.loaded_count(),
            self.load.files.len(),
            self.load.failed_count()
        ));

        let links = &self.link.totals;
        out.push_str(&format!(
            "Links: {} added, {} existing, {} minted, {} unresolved",
            links.linked, links.already_linked, links.minted, links.unresolved
        ));
        if !self.link.skipped_rules.is_empty() {
            out.push_str(&format!(" (skipped: {})", self.link.skipped_rules.join(", ")));
        }
        out.push('\n');

        match &self.translations {
            Some(t) => out.push_str(&format!(
                "Translations: {} rows, {} entities updated, {} literals added, \
                 {} unmatched keys, {} dropped\n",
                t.rows_read,
                t.entities_updated,
                t.literals_added,
                t.unmatched_keys,
                t.rows_dropped_language + t.rows_malformed
            )),
            None => out.push_str("Translations: none configured\n"),
        }

        match &self.augment {
            Some(a) => out.push_str(&format!(
                "External links: {} of {} subjects augmented, {} triples added, {} collisions\n",
                a.subjects_augmented, a.subjects_considered, a.triples_added, a.collisions
            )),
            None => out.push_str("External links: none configured\n"),
        }

        out.push_str(&self.stats.summary());
        out.push('\n');
        if let Some(path) = &self.output {
            out.push_str(&format!("Output: {} ({} bytes)\n", path.display(), self.bytes_written));
        }
        out.push_str(&format!("Audit entries: {}\n", self.audit.len()));
        out
    }

    /// Persist the report as pretty JSON
    pub fn write(&self, path: &Path) -> OntologyResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)?;
        tracing::info!(path = %path.display(), entries = self.audit.len(), "Run report written");
        Ok(())
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// The configured merge
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Data files to load: the directory listing, then the explicit files
    pub fn data_files(&self, audit: &mut AuditLog) -> Vec<PathBuf> {
        let inputs = &self.config.inputs;
        let mut files = Vec::new();

        if let Some(dir) = &inputs.data_dir {
            match turtle_files(dir, self.config.vocabulary_file_name()) {
                Ok(found) => files.extend(found.into_iter().filter(|f| !self.is_lookup_file(f))),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Data directory unreadable");
                    audit.record(
                        Stage::Load,
                        AuditKind::FileMissing,
                        dir.display().to_string(),
                        e.to_string(),
                    );
                }
            }
        }

        for file in &inputs.files {
            if !files.contains(file) {
                files.push(file.clone());
            }
        }
        files
    }

    /// Link graphs and translation tables are lookups, never merged as data
    fn is_lookup_file(&self, path: &Path) -> bool {
        self.config
            .augment
            .link_graphs
            .iter()
            .chain(&self.config.translations.files)
            .any(|lookup| same_file(lookup, path))
    }

    /// Load the vocabulary and data files plus the configured reference graphs
    pub fn load_stage(&self, audit: &mut AuditLog) -> OntologyResult<(Loaded, References)> {
        let files = self.data_files(audit);
        if files.is_empty() {
            return Err(OntologyError::NoUsableInput { attempted: 0 });
        }

        let mut loaded = load(self.config.inputs.vocabulary.as_deref(), &files)?;
        audit.append(&mut loaded.report.audit);

        let refs = &self.config.references;
        let references = References {
            types: load_reference("types", refs.types.as_deref(), audit),
            abilities: load_reference("abilities", refs.abilities.as_deref(), audit),
            egg_groups: load_reference("egg_groups", refs.egg_groups.as_deref(), audit),
        };
        Ok((loaded, references))
    }

    /// Add every configured translation table
    pub fn translate_stage(
        &self,
        graph: Graph,
        audit: &mut AuditLog,
    ) -> (Graph, Option<TranslationReport>) {
        let paths = &self.config.translations.files;
        if paths.is_empty() {
            return (graph, None);
        }

        let mut table = TranslationTable::default();
        for path in paths {
            match read_translations(path) {
                Ok(mut read) => {
                    tracing::debug!(
                        path = %path.display(),
                        rows = read.rows.len(),
                        "Read translation table"
                    );
                    table.rows.append(&mut read.rows);
                    table.malformed.append(&mut read.malformed);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping translation table"
                    );
                    let kind = if path.exists() {
                        AuditKind::ParseFailed
                    } else {
                        AuditKind::FileMissing
                    };
                    audit.record(Stage::Translate, kind, path.display().to_string(), e.to_string());
                }
            }
        }

        let (graph, mut report) = merge_table(graph, table);
        audit.append(&mut report.audit);
        (graph, Some(report))
    }

    /// Attach external links from every configured link graph
    pub fn augment_stage(
        &self,
        graph: Graph,
        audit: &mut AuditLog,
    ) -> (Graph, Option<AugmentReport>) {
        let paths = &self.config.augment.link_graphs;
        if paths.is_empty() {
            return (graph, None);
        }

        let mut link_graph = Graph::new();
        for path in paths {
            match read_turtle(path) {
                Ok(g) => {
                    link_graph.extend(g);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping link graph");
                    let kind = match e {
                        OntologyError::InputMissing { .. } => AuditKind::FileMissing,
                        _ => AuditKind::ParseFailed,
                    };
                    audit.record(Stage::Augment, kind, path.display().to_string(), e.to_string());
                }
            }
        }

        let config = self.config.augment.augment_config();
        let (graph, mut report) = augment(graph, &link_graph, &config);
        audit.append(&mut report.audit);
        (graph, Some(report))
    }

    /// Run every stage except writing
    pub fn merge(&self) -> OntologyResult<(Graph, PipelineReport)> {
        let started_at = Utc::now();
        let mut profiler = PipelineProfiler::new();
        let mut audit = AuditLog::new();
        profiler.start();

        profiler.begin_stage(Stage::Load.to_string());
        let (loaded, references) = self.load_stage(&mut audit)?;
        let Loaded {
            graph,
            vocabulary,
            report: load_report,
        } = loaded;

        profiler.begin_stage(Stage::Link.to_string());
        let rules = self.config.linking.linker_config().rules();
        let (graph, mut link_report) = link_all(graph, &rules, &references, &vocabulary);
        audit.append(&mut link_report.audit);

        profiler.begin_stage(Stage::Translate.to_string());
        let (graph, translations) = self.translate_stage(graph, &mut audit);

        profiler.begin_stage(Stage::Augment.to_string());
        let (graph, augment_report) = self.augment_stage(graph, &mut audit);
        profiler.end_stage();

        let report = PipelineReport {
            started_at,
            finished_at: Utc::now(),
            output: None,
            format: self.config.output.format,
            bytes_written: 0,
            load: load_report,
            link: link_report,
            translations,
            augment: augment_report,
            stats: GraphStats::from_graph(&graph),
            timings: profiler.summary(),
            audit,
        };
        Ok((graph, report))
    }

    /// Run every stage and write the graph (and the report, when configured)
    pub fn run(&self) -> OntologyResult<(Graph, PipelineReport)> {
        let (graph, mut report) = self.merge()?;

        let output = &self.config.output;
        let start = std::time::Instant::now();
        report.bytes_written = write_graph(&graph, &output.path, output.format)?;
        report.output = Some(output.path.clone());
        report.timings.push(StageTiming {
            name: Stage::Serialize.to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        });
        report.finished_at = Utc::now();

        if let Some(path) = &output.report {
            report.write(path)?;
        }

        tracing::info!(
            triples = report.stats.triples,
            digest = %report.stats.digest,
            audit = report.audit.len(),
            "Merge complete"
        );
        Ok((graph, report))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
