//! Multilingual name merging
//!
//! Joins a tab-separated translation table (`type id label language`) into the
//! graph as language-tagged `schema:name` literals. Pokémon rows match on the
//! zero-padded national index; every other kind matches the normalized row id
//! against normalized `rdfs:label`s of that kind.
//!
//! A literal is added only if the exact (text, language) pair is not already on
//! the subject. Rows whose language has no tag mapping are dropped.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::{OntologyError, OntologyResult};
use super::graph::{Graph, Term};
use super::normalize::{normalize, zero_pad, NDEX_WIDTH};
use super::stats::{AuditKind, AuditLog, Stage};
use super::vocab::{ndex, rdfs_label, schema_name, EntityKind};

const COLUMNS: [&str; 4] = ["type", "id", "label", "language"];

/// Standard language tag for a language name as used on the wiki
pub fn language_tag(language: &str) -> Option<&'static str> {
    let tag = match language.trim().to_lowercase().as_str() {
        "english" | "en" => "en",
        "french" | "fr" => "fr",
        "german" | "de" => "de",
        "italian" | "it" => "it",
        "spanish" | "es" => "es",
        "japanese" | "ja" => "ja",
        "official roomaji" | "roomaji" | "romaji" | "ja-latn" => "ja-Latn",
        "korean" | "ko" => "ko",
        "chinese" | "zh" => "zh",
        "chinese (simplified)" | "simplified chinese" | "zh-hans" => "zh-Hans",
        "chinese (traditional)" | "traditional chinese" | "zh-hant" => "zh-Hant",
        "czech" | "cs" => "cs",
        _ => return None,
    };
    Some(tag)
}

// ============================================================================
// Table parsing
// ============================================================================

/// One row of the translation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRow {
    pub kind: String,
    pub id: String,
    pub label: String,
    pub language: String,
    /// 1-based line in the source table
    pub line: u64,
}

impl TranslationRow {
    pub fn new(
        kind: impl Into<String>,
        id: impl Into<String>,
        label: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            label: label.into(),
            language: language.into(),
            line: 0,
        }
    }
}

/// Parsed table plus the rows that could not be read
#[derive(Debug, Default)]
pub struct TranslationTable {
    pub rows: Vec<TranslationRow>,
    pub malformed: Vec<OntologyError>,
}

/// Parse a TSV translation table with a `type id label language` header
pub fn parse_translations<R: Read>(reader: R) -> OntologyResult<TranslationTable> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| OntologyError::other(format!("Unreadable translation header: {e}")))?
        .clone();
    let positions = column_positions(&headers)?;

    let mut table = TranslationTable::default();
    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                table.malformed.push(OntologyError::MalformedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let fields: Vec<&str> = positions
            .iter()
            .map(|&idx| record.get(idx).unwrap_or(""))
            .collect();
        if let Some(missing) = fields.iter().position(|f| f.is_empty()) {
            table.malformed.push(OntologyError::MalformedRow {
                line,
                reason: format!("empty '{}' column", COLUMNS[missing]),
            });
            continue;
        }

        table.rows.push(TranslationRow {
            kind: fields[0].to_string(),
            id: fields[1].to_string(),
            label: fields[2].to_string(),
            language: fields[3].to_string(),
            line,
        });
    }

    Ok(table)
}

fn column_positions(headers: &StringRecord) -> OntologyResult<[usize; 4]> {
    let mut positions = [0usize; 4];
    for (slot, column) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .ok_or_else(|| OntologyError::MissingConfig {
                field: format!("translation column '{column}'"),
            })?;
    }
    Ok(positions)
}

/// Read a translation table from disk
pub fn read_translations(path: &Path) -> OntologyResult<TranslationTable> {
    let file = File::open(path).map_err(|e| OntologyError::TranslationTableFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_translations(file).map_err(|e| OntologyError::TranslationTableFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

// ============================================================================
// Merging
// ============================================================================

/// Summary of a translation merge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationReport {
    pub rows_read: usize,
    pub rows_dropped_language: usize,
    pub rows_malformed: usize,

    /// Distinct subjects at least one row matched
    pub entities_matched: usize,

    /// Distinct subjects that gained at least one literal
    pub entities_updated: usize,

    pub literals_added: usize,
    pub literals_already_present: usize,

    /// Distinct (kind, key) pairs with no subject in the graph
    pub unmatched_keys: usize,

    /// Subjects of the translated kinds that no row matched
    pub entities_without_translation: usize,

    #[serde(skip)]
    pub audit: AuditLog,
}

/// Lookup from comparison key to subjects, per kind
#[derive(Debug, Default)]
struct SubjectIndex {
    by_kind: HashMap<EntityKind, HashMap<String, Vec<Term>>>,
}

impl SubjectIndex {
    fn lookup(&mut self, graph: &Graph, kind: EntityKind, key: &str) -> &[Term] {
        self.by_kind
            .entry(kind)
            .or_insert_with(|| index_kind(graph, kind))
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn index_kind(graph: &Graph, kind: EntityKind) -> HashMap<String, Vec<Term>> {
    let key_predicate = match kind {
        EntityKind::Pokemon => ndex(),
        _ => rdfs_label(),
    };
    let mut index: HashMap<String, Vec<Term>> = HashMap::new();
    for subject in graph.subjects_of_type(&kind.class()) {
        for value in graph
            .objects(subject, &key_predicate)
            .filter_map(Term::literal_value)
        {
            let key = match kind {
                EntityKind::Pokemon => zero_pad(value, NDEX_WIDTH),
                _ => normalize(value),
            };
            let subjects = index.entry(key).or_default();
            if !subjects.contains(subject) {
                subjects.push(subject.clone());
            }
        }
    }
    index
}

/// Comparison key of a row for its kind
fn row_key(kind: EntityKind, id: &str) -> String {
    match kind {
        EntityKind::Pokemon => zero_pad(id, NDEX_WIDTH),
        _ => normalize(id),
    }
}

/// Add translation rows to the graph as `schema:name` literals
pub fn merge_translations(mut graph: Graph, rows: &[TranslationRow]) -> (Graph, TranslationReport) {
    let mut report = TranslationReport {
        rows_read: rows.len(),
        ..Default::default()
    };
    let mut index = SubjectIndex::default();
    let mut matched: BTreeSet<Term> = BTreeSet::new();
    let mut updated: BTreeSet<Term> = BTreeSet::new();
    let mut unmatched: BTreeSet<(String, String)> = BTreeSet::new();
    let mut kinds_seen: BTreeSet<EntityKind> = BTreeSet::new();
    let name = schema_name();

    for row in rows {
        let Some(tag) = language_tag(&row.language) else {
            tracing::warn!(
                line = row.line,
                language = %row.language,
                "Unrecognized language, dropping row"
            );
            report.rows_dropped_language += 1;
            report.audit.record(
                Stage::Translate,
                AuditKind::UnknownLanguage,
                format!("line {}", row.line),
                OntologyError::UnknownLanguage {
                    value: row.language.clone(),
                }
                .to_string(),
            );
            continue;
        };

        let kind = EntityKind::parse(&row.kind).map(|k| match k {
            EntityKind::HiddenAbility => EntityKind::Ability,
            other => other,
        });
        let subjects: Vec<Term> = match kind {
            Some(kind) => {
                kinds_seen.insert(kind);
                index.lookup(&graph, kind, &row_key(kind, &row.id)).to_vec()
            }
            None => Vec::new(),
        };

        if subjects.is_empty() {
            let key = (row.kind.to_lowercase(), row.id.clone());
            if unmatched.insert(key) {
                tracing::debug!(kind = %row.kind, id = %row.id, "No entity for translation");
                report.audit.record(
                    Stage::Translate,
                    AuditKind::UnmatchedTranslation,
                    format!("{} {}", row.kind, row.id),
                    format!("no entity matches line {}", row.line),
                );
            }
            continue;
        }

        let literal = Term::lang(row.label.clone(), tag);
        for subject in subjects {
            matched.insert(subject.clone());
            if graph.insert(subject.clone(), name.clone(), literal.clone()) {
                report.literals_added += 1;
                updated.insert(subject);
            } else {
                report.literals_already_present += 1;
            }
        }
    }

    report.entities_matched = matched.len();
    report.entities_updated = updated.len();
    report.unmatched_keys = unmatched.len();
    report.entities_without_translation = kinds_seen
        .iter()
        .flat_map(|kind| graph.subjects_of_type(&kind.class()))
        .filter(|s| !matched.contains(*s))
        .collect::<BTreeSet<_>>()
        .len();

    tracing::info!(
        rows = report.rows_read,
        updated = report.entities_updated,
        added = report.literals_added,
        unmatched = report.unmatched_keys,
        "Translations merged"
    );

    (graph, report)
}

/// Merge a parsed table, carrying its malformed rows into the report
pub fn merge_table(graph: Graph, table: TranslationTable) -> (Graph, TranslationReport) {
    let (graph, mut report) = merge_translations(graph, &table.rows);
    report.rows_malformed = table.malformed.len();
    for err in &table.malformed {
        tracing::warn!(error = %err, "Skipping malformed translation row");
        let line = match err {
            OntologyError::MalformedRow { line, .. } => *line,
            _ => 0,
        };
        report.audit.record(
            Stage::Translate,
            AuditKind::MalformedRow,
            format!("line {line}"),
            err.to_string(),
        );
    }
    (graph, report)
}

/// Languages present per subject, for summaries
pub fn languages_by_subject(graph: &Graph) -> BTreeMap<Term, BTreeSet<String>> {
    let name = schema_name();
    let mut out: BTreeMap<Term, BTreeSet<String>> = BTreeMap::new();
    for (s, _, o) in graph.triples_matching(None, Some(&name), None) {
        if let Some(lang) = o.as_literal().and_then(|l| l.language.clone()) {
            out.entry(s.clone()).or_default().insert(lang);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::vocab::{rdf_type, EX};

    fn graph_with_bulbasaur(ndex_value: &str) -> Graph {
        let mut graph = Graph::new();
        let bulbasaur = EX.term("Bulbasaur");
        graph.insert(bulbasaur.clone(), rdf_type(), EntityKind::Pokemon.class());
        graph.insert(bulbasaur.clone(), rdfs_label(), Term::plain("Bulbasaur"));
        graph.insert(bulbasaur, ndex(), Term::plain(ndex_value));
        graph
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(language_tag("French"), Some("fr"));
        assert_eq!(language_tag("Official roomaji"), Some("ja-Latn"));
        assert_eq!(language_tag(" JAPANESE "), Some("ja"));
        assert_eq!(language_tag("Chinese (Simplified)"), Some("zh-Hans"));
        assert_eq!(language_tag("Klingon"), None);
    }

    #[test]
    fn test_parse_table_with_reordered_columns() {
        let tsv = "id\ttype\tlanguage\tlabel\n0001\tpokemon\tFrench\tBulbizarre\n";
        let table = parse_translations(tsv.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].label, "Bulbizarre");
        assert_eq!(table.rows[0].kind, "pokemon");
        assert_eq!(table.rows[0].line, 2);
    }

    #[test]
    fn test_parse_table_malformed_rows() {
        let tsv = "type\tid\tlabel\tlanguage\n\
                   pokemon\t0001\n\
                   \tability\tx\tFrench\n\
                   pokemon\t0004\tSalamèche\tFrench\n";
        let table = parse_translations(tsv.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.malformed.len(), 2);
    }

    #[test]
    fn test_parse_table_missing_column() {
        let err = parse_translations("type\tid\tlabel\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn test_zero_padded_join() {
        let graph = graph_with_bulbasaur("1");
        let rows = vec![TranslationRow::new("pokemon", "0001", "Bulbizarre", "French")];

        let (graph, report) = merge_translations(graph, &rows);
        assert!(graph.contains(
            &EX.term("Bulbasaur"),
            &schema_name(),
            &Term::lang("Bulbizarre", "fr")
        ));
        assert_eq!(report.entities_updated, 1);
    }

    #[test]
    fn test_duplicate_pair_added_once() {
        let graph = graph_with_bulbasaur("0001");
        let row = TranslationRow::new("pokemon", "1", "Bulbizarre", "French");
        let rows = vec![row.clone(), row];

        let (graph, report) = merge_translations(graph, &rows);
        assert_eq!(report.literals_added, 1);
        assert_eq!(report.literals_already_present, 1);
        assert_eq!(
            graph
                .objects(&EX.term("Bulbasaur"), &schema_name())
                .count(),
            1
        );
    }

    #[test]
    fn test_case_variants_are_not_duplicates() {
        let graph = graph_with_bulbasaur("0001");
        let rows = vec![
            TranslationRow::new("pokemon", "1", "Bulbizarre", "French"),
            TranslationRow::new("pokemon", "1", "bulbizarre", "French"),
        ];
        let (_, report) = merge_translations(graph, &rows);
        assert_eq!(report.literals_added, 2);
    }

    #[test]
    fn test_unknown_language_dropped() {
        let graph = graph_with_bulbasaur("0001");
        let rows = vec![TranslationRow::new("pokemon", "1", "Bulbasaur", "Klingon")];
        let (graph, report) = merge_translations(graph, &rows);
        assert_eq!(report.rows_dropped_language, 1);
        assert_eq!(report.audit.count(AuditKind::UnknownLanguage), 1);
        assert_eq!(graph.objects(&EX.term("Bulbasaur"), &schema_name()).count(), 0);
    }

    #[test]
    fn test_named_kind_matches_normalized_label() {
        let mut graph = Graph::new();
        let move_node = EX.term("Poke_Ball_Toss");
        graph.insert(move_node.clone(), rdf_type(), EntityKind::Move.class());
        graph.insert(move_node.clone(), rdfs_label(), Term::plain("Poké Ball Toss (move)"));

        let rows = vec![TranslationRow::new(
            "move",
            "poke ball toss",
            "Lancer de Poké Ball",
            "French",
        )];
        let (graph, report) = merge_translations(graph, &rows);
        assert_eq!(report.entities_matched, 1);
        let french = Term::lang("Lancer de Poké Ball", "fr");
        assert!(graph.contains(&move_node, &schema_name(), &french));
    }

    #[test]
    fn test_unmatched_kind_is_counted_not_fatal() {
        let graph = graph_with_bulbasaur("0001");
        let rows = vec![
            TranslationRow::new("item", "Potion", "Potion", "French"),
            TranslationRow::new("berry", "Oran", "Baie Oran", "French"),
            TranslationRow::new("pokemon", "0002", "Herbizarre", "French"),
        ];
        let (_, report) = merge_translations(graph, &rows);
        assert_eq!(report.unmatched_keys, 3);
        assert_eq!(report.entities_updated, 0);
        assert_eq!(report.entities_without_translation, 1);
    }

    #[test]
    fn test_merge_table_reports_malformed() {
        let tsv = "type\tid\tlabel\tlanguage\npokemon\t1\tBulbizarre\tFrench\npokemon\t2\n";
        let table = parse_translations(tsv.as_bytes()).unwrap();
        let (graph, report) = merge_table(graph_with_bulbasaur("0001"), table);
        assert_eq!(report.rows_malformed, 1);
        assert_eq!(report.audit.count(AuditKind::MalformedRow), 1);

        let langs = languages_by_subject(&graph);
        assert!(langs[&EX.term("Bulbasaur")].contains("fr"));
    }
}
