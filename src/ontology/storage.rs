//! Graph serialization and persistence
//!
//! Writes the merged graph as Turtle (fixed prefixes, one block per subject)
//! or N-Triples. Output goes to a temporary sibling file that is renamed over
//! the destination only after a successful flush, so a failed run never
//! leaves a truncated graph behind.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::error::{OntologyError, OntologyResult};
use super::graph::{escape_literal, Graph, Term};
use super::vocab::{rdf_type, PREFIXES};

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Turtle,
    NTriples,
}

impl OutputFormat {
    /// Parse from a name or file extension
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "turtle" | "ttl" => Some(OutputFormat::Turtle),
            "ntriples" | "n-triples" | "nt" => Some(OutputFormat::NTriples),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Turtle => "ttl",
            OutputFormat::NTriples => "nt",
        }
    }
}

// ============================================================================
// Turtle
// ============================================================================

fn is_safe_local(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Prefixed name for an IRI when one of the fixed prefixes covers it
fn prefixed(iri: &str) -> Option<String> {
    PREFIXES.iter().find_map(|ns| {
        iri.strip_prefix(ns.base())
            .filter(|local| is_safe_local(local))
            .map(|local| format!("{}:{}", ns.prefix(), local))
    })
}

fn turtle_iri(iri: &str) -> String {
    prefixed(iri).unwrap_or_else(|| format!("<{iri}>"))
}

/// Render one term in Turtle syntax
pub fn turtle_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => turtle_iri(iri),
        Term::Blank(id) => format!("_:{id}"),
        Term::Literal(lit) => {
            let quoted = format!("\"{}\"", escape_literal(&lit.value));
            match (&lit.language, &lit.datatype) {
                (Some(lang), _) => format!("{quoted}@{lang}"),
                (None, Some(dt)) => format!("{quoted}^^{}", turtle_iri(dt)),
                (None, None) => quoted,
            }
        }
    }
}

/// Serialize a graph as Turtle
pub fn to_turtle(graph: &Graph) -> String {
    let mut out = String::new();
    for ns in PREFIXES {
        let _ = writeln!(out, "@prefix {}: <{}> .", ns.prefix(), ns.base());
    }

    let type_predicate = rdf_type();
    for subject in graph.subjects() {
        let Some(predicates) = graph.describe(subject) else {
            continue;
        };
        out.push('\n');
        out.push_str(&turtle_term(subject));

        // rdf:type first, then predicate order
        let mut entries: Vec<_> = predicates.iter().collect();
        entries.sort_by_key(|(p, _)| **p != type_predicate);

        let count = entries.len();
        for (i, (predicate, objects)) in entries.into_iter().enumerate() {
            let p = if *predicate == type_predicate {
                "a".to_string()
            } else {
                turtle_term(predicate)
            };
            let objects: Vec<String> = objects.iter().map(turtle_term).collect();
            let terminator = if i + 1 == count { " ." } else { " ;" };
            let _ = write!(out, "\n    {p} {}{terminator}", objects.join(", "));
        }
        out.push('\n');
    }
    out
}

/// Serialize a graph as N-Triples
pub fn to_ntriples(graph: &Graph) -> String {
    let mut out = String::new();
    for (s, p, o) in graph.iter() {
        let _ = writeln!(
            out,
            "{} {} {} .",
            s.to_ntriples(),
            p.to_ntriples(),
            o.to_ntriples()
        );
    }
    out
}

/// Serialize in the requested format
pub fn serialize(graph: &Graph, format: OutputFormat) -> String {
    match format {
        OutputFormat::Turtle => to_turtle(graph),
        OutputFormat::NTriples => to_ntriples(graph),
    }
}

// ============================================================================
// Persistence
// ============================================================================

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` to `path` atomically (temp file, flush, rename)
pub fn write_atomic(path: &Path, content: &[u8]) -> OntologyResult<()> {
    let fail = |reason: String| OntologyError::serialization_failed(path, reason);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| fail(format!("cannot create {}: {e}", parent.display())))?;
    }

    let temp = temp_path(path);
    let result = (|| -> std::io::Result<()> {
        let file = File::create(&temp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp);
        return Err(fail(e.to_string()));
    }

    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        fail(format!("rename from {} failed: {e}", temp.display()))
    })
}

/// Serialize and persist a graph; returns the number of bytes written
pub fn write_graph(graph: &Graph, path: &Path, format: OutputFormat) -> OntologyResult<usize> {
    let content = serialize(graph, format);
    write_atomic(path, content.as_bytes())?;
    tracing::info!(
        path = %path.display(),
        triples = graph.len(),
        bytes = content.len(),
        format = ?format,
        "Graph written"
    );
    Ok(content.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::loader::parse_turtle_str;
    use crate::ontology::vocab::{rdfs_label, schema_name, EntityKind, EX, XSD_INTEGER};
    use tempfile::TempDir;

    fn sample() -> Graph {
        let mut graph = Graph::new();
        let bulbasaur = EX.term("Bulbasaur");
        graph.insert(bulbasaur.clone(), rdf_type(), EntityKind::Pokemon.class());
        graph.insert(bulbasaur.clone(), rdfs_label(), Term::plain("Bulbasaur"));
        graph.insert(bulbasaur.clone(), schema_name(), Term::lang("Bulbizarre", "fr"));
        graph.insert(bulbasaur.clone(), schema_name(), Term::lang("Bisasam", "de"));
        graph.insert(bulbasaur.clone(), EX.term("friendship"), Term::typed("50", XSD_INTEGER));
        graph.insert(EX.term("Mr__Mime"), rdfs_label(), Term::plain("Mr. \"Mime\""));
        graph.insert(
            EX.term("Mr__Mime"),
            EX.term("hasImage"),
            Term::iri("https://archives.example/Mr._Mime_(1).png"),
        );
        graph
    }

    #[test]
    fn test_turtle_layout() {
        let turtle = to_turtle(&sample());
        assert!(turtle.starts_with("@prefix ex: <http://example.org/pokemon/> ."));
        assert!(turtle.contains("ex:Bulbasaur\n    a ex:Pokemon ;"));
        assert!(turtle.contains("\"50\"^^xsd:integer"));
        assert!(turtle.contains("\"Bisasam\"@de, \"Bulbizarre\"@fr"));
        assert!(turtle.contains(r#""Mr. \"Mime\"""#));
    }

    #[test]
    fn test_unsafe_local_stays_full_iri() {
        let term = Term::iri("http://example.org/pokemon/Mr._Mime");
        assert_eq!(turtle_term(&term), "<http://example.org/pokemon/Mr._Mime>");
        assert_eq!(turtle_term(&EX.term("Ho_Oh")), "ex:Ho_Oh");
    }

    #[test]
    fn test_turtle_parses_back() {
        let graph = sample();
        let reparsed = parse_turtle_str(&to_turtle(&graph)).unwrap();
        assert_eq!(graph.digest(), reparsed.digest());
    }

    #[test]
    fn test_ntriples_one_line_per_triple() {
        let graph = sample();
        assert_eq!(to_ntriples(&graph).lines().count(), graph.len());
    }

    #[test]
    fn test_write_graph_atomic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("graph.ttl");

        let bytes = write_graph(&sample(), &path, OutputFormat::Turtle).unwrap();
        assert!(bytes > 0);
        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_write_failure_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be
        let path = dir.path().join("graph.ttl");
        std::fs::create_dir_all(&path).unwrap();

        let err = write_graph(&sample(), &path, OutputFormat::Turtle).unwrap_err();
        assert!(matches!(err, OntologyError::SerializationFailed { .. }));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("ttl"), Some(OutputFormat::Turtle));
        assert_eq!(OutputFormat::parse("N-Triples"), Some(OutputFormat::NTriples));
        assert_eq!(OutputFormat::parse("rdfxml"), None);
    }
}
