//! Graph loading
//!
//! Reads the vocabulary first (when present) and then each per-category data
//! file, unioning everything into one [`Graph`]. A file that is missing or
//! fails to parse is logged, recorded and skipped; only a load in which every
//! requested data file failed is an error.

use rio_api::model::{Literal as RioLiteral, Subject, Term as RioTerm};
use rio_api::parser::TriplesParser;
use rio_turtle::TurtleParser;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::error::{OntologyError, OntologyResult};
use super::graph::{Graph, Term};
use super::normalize::to_uri_token;
use super::stats::{AuditKind, AuditLog, Stage};
use super::vocab::Vocabulary;

// ============================================================================
// Parsing
// ============================================================================

/// Parse Turtle from a reader
///
/// Blank node labels are scoped with `scope` so blank nodes from different
/// files never merge.
pub fn parse_turtle<R: BufRead>(reader: R, scope: &str) -> Result<Graph, String> {
    let mut parser = TurtleParser::new(reader, None);
    let mut graph = Graph::new();

    parser
        .parse_all(&mut |triple| {
            let subject = match triple.subject {
                Subject::NamedNode(n) => Some(Term::iri(n.iri)),
                Subject::BlankNode(b) => Some(scoped_blank(scope, b.id)),
                _ => None,
            };
            let object = match triple.object {
                RioTerm::NamedNode(n) => Some(Term::iri(n.iri)),
                RioTerm::BlankNode(b) => Some(scoped_blank(scope, b.id)),
                RioTerm::Literal(lit) => Some(convert_literal(lit)),
                _ => None,
            };
            if let (Some(s), Some(o)) = (subject, object) {
                graph.insert(s, Term::iri(triple.predicate.iri), o);
            }
            Ok(()) as Result<(), Box<dyn std::error::Error + Send + Sync>>
        })
        .map_err(|e| e.to_string())?;

    Ok(graph)
}

/// Parse Turtle from a string
pub fn parse_turtle_str(turtle: &str) -> Result<Graph, String> {
    parse_turtle(turtle.as_bytes(), "doc")
}

fn scoped_blank(scope: &str, id: &str) -> Term {
    if scope.is_empty() {
        Term::blank(id)
    } else {
        Term::blank(format!("{scope}_{id}"))
    }
}

fn convert_literal(lit: RioLiteral<'_>) -> Term {
    match lit {
        RioLiteral::Simple { value } => Term::plain(value),
        RioLiteral::LanguageTaggedString { value, language } => Term::lang(value, language),
        RioLiteral::Typed { value, datatype } => Term::typed(value, datatype.iri),
    }
}

/// Read a single Turtle file
pub fn read_turtle(path: &Path) -> OntologyResult<Graph> {
    if !path.exists() {
        return Err(OntologyError::InputMissing {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)
        .map_err(|e| OntologyError::io_error("open", Some(path.to_path_buf()), e))?;
    let scope = path
        .file_stem()
        .map(|s| to_uri_token(&s.to_string_lossy()))
        .unwrap_or_default();
    parse_turtle(BufReader::new(file), &scope)
        .map_err(|reason| OntologyError::parse_failed(path, reason))
}

// ============================================================================
// Load Report
// ============================================================================

/// Outcome of loading one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Loaded { triples: usize },
    Missing,
    ParseFailed { reason: String },
}

/// One file and what happened to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLoad {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileLoad {
    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome, FileOutcome::Loaded { .. })
    }
}

/// Summary of a load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Vocabulary file, if one was requested
    pub vocabulary: Option<FileLoad>,

    /// Data files in load order
    pub files: Vec<FileLoad>,

    /// Classes declared by the vocabulary
    pub declared_classes: usize,

    /// Triples in the unified graph
    pub total_triples: usize,

    #[serde(skip)]
    pub audit: AuditLog,
}

impl LoadReport {
    pub fn loaded_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_loaded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.files.len() - self.loaded_count()
    }

    fn record(&mut self, path: &Path, result: &OntologyResult<Graph>) -> FileLoad {
        let outcome = match result {
            Ok(graph) => FileOutcome::Loaded {
                triples: graph.len(),
            },
            Err(OntologyError::InputMissing { .. }) => {
                tracing::warn!(path = %path.display(), "Input file not found, skipping");
                self.audit.record(
                    Stage::Load,
                    AuditKind::FileMissing,
                    path.display().to_string(),
                    "file not found",
                );
                FileOutcome::Missing
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load file, skipping");
                self.audit.record(
                    Stage::Load,
                    AuditKind::ParseFailed,
                    path.display().to_string(),
                    e.to_string(),
                );
                FileOutcome::ParseFailed {
                    reason: e.to_string(),
                }
            }
        };
        FileLoad {
            path: path.to_path_buf(),
            outcome,
        }
    }
}

/// Result of a load: the unified graph, its vocabulary and the report
#[derive(Debug, Clone)]
pub struct Loaded {
    pub graph: Graph,
    pub vocabulary: Vocabulary,
    pub report: LoadReport,
}

// ============================================================================
// Loading
// ============================================================================

/// Load the vocabulary (if any) and then every data file in order
///
/// Fails with [`OntologyError::NoUsableInput`] only when at least one data
/// file was requested and none could be loaded.
pub fn load(vocabulary: Option<&Path>, data_paths: &[PathBuf]) -> OntologyResult<Loaded> {
    let mut report = LoadReport::default();
    let mut graph = Graph::new();

    let vocab = match vocabulary {
        Some(path) => {
            let result = read_turtle(path);
            let entry = report.record(path, &result);
            report.vocabulary = Some(entry);
            match result {
                Ok(vocab_graph) => {
                    let vocab = Vocabulary::from_graph(&vocab_graph);
                    tracing::info!(
                        path = %path.display(),
                        classes = vocab.class_count(),
                        "Loaded vocabulary"
                    );
                    graph.extend(vocab_graph);
                    vocab
                }
                Err(_) => {
                    tracing::warn!("Vocabulary unavailable, class checks will pass");
                    Vocabulary::absent()
                }
            }
        }
        None => {
            tracing::warn!("No vocabulary configured, class checks will pass");
            Vocabulary::absent()
        }
    };
    report.declared_classes = vocab.class_count();

    for path in data_paths {
        let result = read_turtle(path);
        let entry = report.record(path, &result);
        if let Ok(file_graph) = result {
            let added = graph.extend(file_graph);
            tracing::debug!(path = %path.display(), added, "Merged data file");
        }
        report.files.push(entry);
    }

    if !data_paths.is_empty() && report.loaded_count() == 0 {
        return Err(OntologyError::NoUsableInput {
            attempted: data_paths.len(),
        });
    }

    report.total_triples = graph.len();
    tracing::info!(
        files = report.loaded_count(),
        failed = report.failed_count(),
        triples = report.total_triples,
        "Graph loaded"
    );

    Ok(Loaded {
        graph,
        vocabulary: vocab,
        report,
    })
}

/// Turtle files in `dir`, sorted by name, excluding `exclude`
pub fn turtle_files(dir: &Path, exclude: Option<&str>) -> OntologyResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| OntologyError::io_error("read directory", Some(dir.to_path_buf()), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| OntologyError::io_error("read directory", Some(dir.to_path_buf()), e))?
            .path();
        let is_turtle = path.extension().is_some_and(|ext| ext == "ttl");
        let is_excluded = exclude.is_some_and(|name| path.file_name().is_some_and(|f| f == name));
        if path.is_file() && is_turtle && !is_excluded {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every `.ttl` file in a directory, treating `vocabulary_file` as the vocabulary
pub fn load_dir(dir: &Path, vocabulary_file: &str) -> OntologyResult<Loaded> {
    let data = turtle_files(dir, Some(vocabulary_file))?;
    if data.is_empty() {
        return Err(OntologyError::NoUsableInput { attempted: 0 });
    }
    load(Some(&dir.join(vocabulary_file)), &data)
}

/// Load an optional reference graph
///
/// Returns `None` when no path is configured or the file cannot be loaded; the
/// caller then checks against the unified graph.
pub fn load_reference(name: &str, path: Option<&Path>, audit: &mut AuditLog) -> Option<Graph> {
    let path = path?;
    match read_turtle(path) {
        Ok(graph) => {
            tracing::info!(reference = name, triples = graph.len(), "Loaded reference graph");
            Some(graph)
        }
        Err(e) => {
            tracing::warn!(
                reference = name,
                error = %e,
                "Reference graph unavailable, checking against the unified graph"
            );
            let kind = match e {
                OntologyError::InputMissing { .. } => AuditKind::FileMissing,
                _ => AuditKind::ParseFailed,
            };
            audit.record(Stage::Load, kind, path.display().to_string(), e.to_string());
            None
        }
    }
}
