//! Run statistics, audit trail and stage profiling
//!
//! Every skipped or dropped item is recorded as an [`AuditEntry`] so a run can
//! be reviewed after the fact; [`GraphStats`] summarizes a graph's shape for
//! the `stats` command and the final report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use super::graph::{Graph, Term};
use super::vocab::{EntityKind, PREFIXES};

// ============================================================================
// Audit Log
// ============================================================================

/// Pipeline stage that produced an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Link,
    Translate,
    Augment,
    Build,
    Serialize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Link => "link",
            Stage::Translate => "translate",
            Stage::Augment => "augment",
            Stage::Build => "build",
            Stage::Serialize => "serialize",
        };
        f.write_str(name)
    }
}

/// What happened to the skipped item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    FileMissing,
    ParseFailed,
    UnresolvedReference,
    UndeclaredClass,
    UnknownLanguage,
    MalformedRow,
    UnmatchedTranslation,
    NameCollision,
    InvalidValue,
}

/// One skipped or dropped item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub stage: Stage,
    pub kind: AuditKind,
    /// Subject IRI, file path or table row the entry is about
    pub item: String,
    pub detail: String,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:?} {}: {}",
            self.stage, self.kind, self.item, self.detail
        )
    }
}

/// Ordered record of everything a run skipped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn record(
        &mut self,
        stage: Stage,
        kind: AuditKind,
        item: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.entries.push(AuditEntry {
            stage,
            kind,
            item: item.into(),
            detail: detail.into(),
        });
    }

    /// Move all entries of `other` into this log
    pub fn append(&mut self, other: &mut AuditLog) {
        self.entries.append(&mut other.entries);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of one kind
    pub fn count(&self, kind: AuditKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Entry counts grouped by kind
    pub fn counts_by_kind(&self) -> BTreeMap<AuditKind, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        counts
    }
}

// ============================================================================
// Graph Statistics
// ============================================================================

/// Shape of a graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub triples: usize,
    pub subjects: usize,

    /// Instances per known class, keyed by class name
    pub instances: BTreeMap<String, usize>,

    /// Triples per predicate, keyed by prefixed name where possible
    pub predicates: BTreeMap<String, usize>,

    pub digest: String,
}

impl GraphStats {
    pub fn from_graph(graph: &Graph) -> Self {
        let mut instances = BTreeMap::new();
        for kind in EntityKind::ALL {
            let count = graph.subjects_of_type(&kind.class()).len();
            if count > 0 {
                instances.insert(kind.class_name().to_string(), count);
            }
        }

        let mut predicates = BTreeMap::new();
        for (_, p, _) in graph.iter() {
            *predicates.entry(compact(p)).or_insert(0) += 1;
        }

        Self {
            triples: graph.len(),
            subjects: graph.subjects().count(),
            instances,
            predicates,
            digest: graph.digest(),
        }
    }

    /// Number of typed instances of `kind`
    pub fn instances_of(&self, kind: EntityKind) -> usize {
        self.instances.get(kind.class_name()).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "Triples: {} | Subjects: {} | Pokemon: {} | Moves: {} | Abilities: {} | Episodes: {}",
            self.triples,
            self.subjects,
            self.instances_of(EntityKind::Pokemon),
            self.instances_of(EntityKind::Move),
            self.instances_of(EntityKind::Ability),
            self.instances_of(EntityKind::Episode),
        )
    }

    /// Multi-line report
    pub fn detailed_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("Graph ({} triples, {} subjects)\n", self.triples, self.subjects));
        report.push_str(&format!("{:-<48}\n", ""));
        report.push_str("Instances:\n");
        for (class, count) in &self.instances {
            report.push_str(&format!("  {class:28} {count:>8}\n"));
        }
        report.push_str("Predicates:\n");
        for (predicate, count) in &self.predicates {
            report.push_str(&format!("  {predicate:28} {count:>8}\n"));
        }
        report.push_str(&format!("Digest: {}\n", self.digest));
        report
    }
}

/// Prefixed form of an IRI term, or its N-Triples form
fn compact(term: &Term) -> String {
    if let Some(iri) = term.as_iri() {
        for ns in PREFIXES {
            if let Some(local) = iri.strip_prefix(ns.base()) {
                return format!("{}:{}", ns.prefix(), local);
            }
        }
    }
    term.to_ntriples()
}

// ============================================================================
// Pipeline Profiler
// ============================================================================

/// Tracks how long each pipeline stage took
#[derive(Debug, Clone, Default)]
pub struct PipelineProfiler {
    stages: Vec<(String, Duration)>,
    current_stage: Option<(String, Instant)>,
    total_start: Option<Instant>,
}

impl PipelineProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start profiling
    pub fn start(&mut self) {
        self.total_start = Some(Instant::now());
        self.stages.clear();
        self.current_stage = None;
    }

    /// Begin a stage, closing the previous one
    pub fn begin_stage(&mut self, name: impl Into<String>) {
        self.end_stage();
        self.current_stage = Some((name.into(), Instant::now()));
    }

    /// End current stage
    pub fn end_stage(&mut self) {
        if let Some((name, start)) = self.current_stage.take() {
            self.stages.push((name, start.elapsed()));
        }
    }

    /// Get stage duration in milliseconds
    pub fn stage_ms(&self, name: &str) -> u64 {
        self.stages
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Get total elapsed milliseconds
    pub fn total_ms(&self) -> u64 {
        self.total_start
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Stage timings in execution order
    pub fn summary(&self) -> Vec<StageTiming> {
        self.stages
            .iter()
            .map(|(name, duration)| StageTiming {
                name: name.clone(),
                duration_ms: duration.as_millis() as u64,
            })
            .collect()
    }
}

/// Timing for a single stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    pub name: String,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::vocab::{rdf_type, rdfs_label, EX};

    #[test]
    fn test_audit_log_counts() {
        let mut log = AuditLog::new();
        log.record(Stage::Load, AuditKind::FileMissing, "moves.ttl", "not found");
        log.record(Stage::Link, AuditKind::UnresolvedReference, "ex:Bulbasaur", "Shadow");
        log.record(Stage::Link, AuditKind::UnresolvedReference, "ex:Ivysaur", "Shadow");

        assert_eq!(log.len(), 3);
        assert_eq!(log.count(AuditKind::UnresolvedReference), 2);
        assert_eq!(log.counts_by_kind().get(&AuditKind::FileMissing), Some(&1));
    }

    #[test]
    fn test_audit_append() {
        let mut a = AuditLog::new();
        let mut b = AuditLog::new();
        b.record(Stage::Augment, AuditKind::NameCollision, "pikachu", "two pages");
        a.append(&mut b);
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn test_audit_entry_serializes_snake_case() {
        let entry = AuditEntry {
            stage: Stage::Translate,
            kind: AuditKind::UnknownLanguage,
            item: "row 4".to_string(),
            detail: "Klingon".to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"translate\""));
        assert!(json.contains("\"unknown_language\""));
    }

    #[test]
    fn test_graph_stats() {
        let mut graph = Graph::new();
        graph.insert(EX.term("Bulbasaur"), rdf_type(), EntityKind::Pokemon.class());
        graph.insert(EX.term("Bulbasaur"), rdfs_label(), Term::plain("Bulbasaur"));
        graph.insert(EX.term("Tackle"), rdf_type(), EntityKind::Move.class());

        let stats = GraphStats::from_graph(&graph);
        assert_eq!(stats.triples, 3);
        assert_eq!(stats.subjects, 2);
        assert_eq!(stats.instances_of(EntityKind::Pokemon), 1);
        assert_eq!(stats.predicates.get("rdf:type"), Some(&2));
        assert_eq!(stats.predicates.get("rdfs:label"), Some(&1));
        assert!(stats.summary().contains("Pokemon: 1"));
    }

    #[test]
    fn test_profiler_records_stages_in_order() {
        let mut profiler = PipelineProfiler::new();
        profiler.start();
        profiler.begin_stage("load");
        profiler.begin_stage("link");
        profiler.end_stage();

        let names: Vec<_> = profiler.summary().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["load", "link"]);
    }
}
