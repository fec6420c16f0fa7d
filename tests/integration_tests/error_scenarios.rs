//! Error scenario integration tests
//!
//! Tests the failure modes and how the run recovers:
//! 1. Missing and corrupt input files
//! 2. No usable input at all
//! 3. Missing vocabulary and undeclared classes
//! 4. Unreadable translation tables and link graphs
//! 5. Output that cannot be written

use dexgraph::error::{DexgraphErrorTrait, ErrorCategory};
use dexgraph::ontology::vocab::{has_egg_group, has_type, EX};
use dexgraph::ontology::{AuditKind, OntologyError, Pipeline};

use super::fixtures::Workspace;

// ============================================================================
// Input Errors
// ============================================================================

#[test]
fn test_missing_file_is_skipped() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.inputs.files.push(ws.path("does-not-exist.ttl"));

    let (graph, report) = Pipeline::new(config).merge().unwrap();
    assert_eq!(report.load.failed_count(), 1);
    assert_eq!(report.audit.count(AuditKind::FileMissing), 1);
    assert!(graph.contains(&EX.term("Bulbasaur"), &has_type(), &EX.term("Grass")));
}

#[test]
fn test_corrupt_file_is_skipped() {
    let ws = Workspace::new();
    std::fs::write(ws.data().join("broken.ttl"), "ex:Bulbasaur a .\n<<< not turtle").unwrap();

    let (graph, report) = Pipeline::new(ws.config()).merge().unwrap();
    assert_eq!(report.load.failed_count(), 1);
    assert_eq!(report.audit.count(AuditKind::ParseFailed), 1);
    assert!(graph.has_type(&EX.term("Pikachu"), &EX.term("Pokemon")));
}

#[test]
fn test_all_inputs_failing_is_fatal() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.inputs.data_dir = None;
    config.inputs.files = vec![ws.path("a.ttl"), ws.path("b.ttl")];

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, OntologyError::NoUsableInput { attempted: 2 }));
    assert!(!err.is_recoverable());
    assert_eq!(err.category(), ErrorCategory::Input);
    assert!(!ws.path("output/pokemon.ttl").exists());
}

// ============================================================================
// Vocabulary
// ============================================================================

#[test]
fn test_missing_vocabulary_proceeds() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.inputs.vocabulary = Some(ws.path("nowhere/vocabulary.ttl"));

    let (graph, report) = Pipeline::new(config).merge().unwrap();
    assert!(report.link.skipped_rules.is_empty());
    assert_eq!(report.load.declared_classes, 0);
    assert!(graph.contains(&EX.term("Bulbasaur"), &has_type(), &EX.term("Grass")));
}

#[test]
fn test_undeclared_class_skips_rule() {
    let ws = Workspace::new();
    let vocabulary = r#"
@prefix ex: <http://example.org/pokemon/> .
@prefix ep: <http://example.org/episodes/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
ex:Pokemon a rdfs:Class .
ex:PokemonType a rdfs:Class .
ex:Ability a rdfs:Class .
ex:HiddenAbility a rdfs:Class .
ep:Episode a rdfs:Class .
"#;
    std::fs::write(ws.data().join("vocabulary.ttl"), vocabulary).unwrap();

    let (graph, report) = Pipeline::new(ws.config()).merge().unwrap();
    assert_eq!(report.link.skipped_rules, vec!["pokemon-egg-group".to_string()]);
    assert_eq!(report.audit.count(AuditKind::UndeclaredClass), 1);
    assert_eq!(graph.objects(&EX.term("Bulbasaur"), &has_egg_group()).count(), 0);
    assert!(graph.contains(&EX.term("Bulbasaur"), &has_type(), &EX.term("Grass")));
}

// ============================================================================
// Optional Inputs
// ============================================================================

#[test]
fn test_missing_translation_table_and_link_graph() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.translations.files = vec![ws.path("missing.tsv")];
    config.augment.link_graphs = vec![ws.path("missing-links.ttl")];

    let (_, report) = Pipeline::new(config).merge().unwrap();
    let translations = report.translations.unwrap();
    assert_eq!(translations.rows_read, 0);
    assert_eq!(report.augment.unwrap().subjects_augmented, 0);
    assert_eq!(report.audit.count(AuditKind::FileMissing), 2);
}

// ============================================================================
// Output Errors
// ============================================================================

#[test]
fn test_unwritable_output_is_fatal() {
    let ws = Workspace::new();
    let mut config = ws.config();
    // A directory stands where the output file should go
    let blocked = ws.path("blocked.ttl");
    std::fs::create_dir_all(&blocked).unwrap();
    config.output.path = blocked.clone();

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, OntologyError::SerializationFailed { .. }));
    assert_eq!(err.category(), ErrorCategory::Storage);
    assert!(blocked.is_dir());
    assert!(!ws.path("blocked.ttl.tmp").exists());
}
