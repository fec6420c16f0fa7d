//! End-to-end pipeline integration tests
//!
//! Tests the complete workflow:
//! 1. Vocabulary and category graph loading
//! 2. Reference linking (strict and hidden-ability minting)
//! 3. Translation merging
//! 4. External-link augmentation
//! 5. Serialization and the run report

use dexgraph::ontology::records::{build_file, BuildOptions};
use dexgraph::ontology::vocab::{
    external_link, has_ability, has_egg_group, has_hidden_ability, has_pokemon_debut, has_type,
    rdfs_label, schema_name, EntityKind, Vocabulary, EP, EX, SCHEMA,
};
use dexgraph::ontology::{read_turtle, write_graph, AuditKind, OutputFormat, Pipeline, Term};

use super::fixtures::Workspace;

// ============================================================================
// Complete Pipeline Tests
// ============================================================================

#[test]
fn test_pipeline_writes_output_and_report() {
    let ws = Workspace::new();
    let (graph, report) = Pipeline::new(ws.config()).run().unwrap();

    let output = ws.path("output/pokemon.ttl");
    assert!(output.exists());
    assert!(ws.path("output/report.json").exists());

    let reloaded = read_turtle(&output).unwrap();
    assert_eq!(reloaded.digest(), graph.digest());
    assert_eq!(report.stats.digest, graph.digest());
    assert_eq!(report.load.loaded_count(), 5);
    assert_eq!(report.load.failed_count(), 0);
    assert!(report.bytes_written > 0);
}

#[test]
fn test_pipeline_is_idempotent() {
    let ws = Workspace::new();
    let pipeline = Pipeline::new(ws.config());

    let (first, _) = pipeline.run().unwrap();
    let first_bytes = std::fs::read(ws.path("output/pokemon.ttl")).unwrap();
    let (second, _) = pipeline.run().unwrap();
    let second_bytes = std::fs::read(ws.path("output/pokemon.ttl")).unwrap();

    assert_eq!(first.digest(), second.digest());
    assert_eq!(first_bytes, second_bytes);
}

// ============================================================================
// Linking
// ============================================================================

#[test]
fn test_links_resolve_against_references() {
    let ws = Workspace::new();
    let (graph, report) = Pipeline::new(ws.config()).merge().unwrap();
    let bulbasaur = EX.term("Bulbasaur");

    let types: Vec<_> = graph.objects(&bulbasaur, &has_type()).cloned().collect();
    assert_eq!(types, vec![EX.term("Grass"), EX.term("Poison")]);
    assert!(graph.contains(&bulbasaur, &has_ability(), &EX.term("Overgrow")));
    assert!(graph.contains(&bulbasaur, &has_egg_group(), &EX.term("Monster")));
    assert!(graph.contains(
        &EP.term("Pokemon___I_Choose_You_"),
        &has_pokemon_debut(),
        &EX.term("Pikachu")
    ));
    assert_eq!(report.link.rule("pokemon-type").linked, 5);
}

#[test]
fn test_no_fabricated_links() {
    let ws = Workspace::new();
    let (graph, report) = Pipeline::new(ws.config()).merge().unwrap();
    let missingno = EX.term("MissingNo_");

    assert_eq!(graph.objects(&missingno, &has_type()).count(), 0);
    assert_eq!(graph.objects(&missingno, &has_ability()).count(), 0);
    assert!(graph.describe(&EX.term("Bird")).is_none());
    assert!(graph.describe(&EX.term("Ho_Oh")).is_none());

    // Bird, Glitch and the Ho-Oh debut
    assert_eq!(report.link.totals.unresolved, 3);
    assert_eq!(report.audit.count(AuditKind::UnresolvedReference), 3);
}

#[test]
fn test_hidden_ability_leniency() {
    let ws = Workspace::new();
    let (graph, report) = Pipeline::new(ws.config()).merge().unwrap();
    let lightning_rod = EX.term("Lightning_Rod");

    assert!(graph.contains(&EX.term("Pikachu"), &has_hidden_ability(), &lightning_rod));
    assert!(graph.has_type(&lightning_rod, &EntityKind::Ability.class()));
    assert!(graph.has_type(&lightning_rod, &EntityKind::HiddenAbility.class()));
    assert_eq!(graph.subjects_with(&rdfs_label(), &Term::plain("Lightning Rod")).len(), 1);

    // Listed abilities link without being retyped
    let chlorophyll = EX.term("Chlorophyll");
    assert!(graph.contains(&EX.term("Bulbasaur"), &has_hidden_ability(), &chlorophyll));
    assert!(!graph.has_type(&chlorophyll, &EntityKind::HiddenAbility.class()));

    let counts = report.link.rule("pokemon-hidden-ability");
    assert_eq!(counts.minted, 1);
    assert_eq!(counts.linked, 1);
}

#[test]
fn test_strict_hidden_abilities() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.linking.mint_hidden_abilities = false;
    let (graph, _) = Pipeline::new(config).merge().unwrap();

    assert_eq!(graph.objects(&EX.term("Pikachu"), &has_hidden_ability()).count(), 0);
    assert!(graph.describe(&EX.term("Lightning_Rod")).is_none());
}

// ============================================================================
// Translations
// ============================================================================

#[test]
fn test_translation_scenario() {
    let ws = Workspace::new();
    let (graph, report) = Pipeline::new(ws.config()).merge().unwrap();
    let bulbasaur = EX.term("Bulbasaur");

    let french: Vec<_> = graph
        .objects(&bulbasaur, &schema_name())
        .filter(|o| o.as_literal().and_then(|l| l.language.as_deref()) == Some("fr"))
        .cloned()
        .collect();
    assert_eq!(french, vec![Term::lang("Bulbizarre", "fr")]);

    // "1" and "0001" name the same entity
    assert!(graph.contains(&bulbasaur, &schema_name(), &Term::lang("Bisasam", "de")));
    // "25" in the graph, "0025" in the table
    assert!(graph.contains(&EX.term("Pikachu"), &schema_name(), &Term::lang("ピカチュウ", "ja")));
    assert!(graph.contains(&EX.term("Pikachu"), &schema_name(), &Term::lang("Pikachu", "ja-Latn")));
    assert!(graph.contains(&EX.term("Overgrow"), &schema_name(), &Term::lang("Engrais", "fr")));

    let t = report.translations.unwrap();
    assert_eq!(t.literals_already_present, 1);
    assert_eq!(t.rows_dropped_language, 1);
    assert_eq!(t.rows_malformed, 1);
    // 0999 and the Tackle move that is not in this graph
    assert_eq!(t.unmatched_keys, 2);
    assert_eq!(report.audit.count(AuditKind::UnknownLanguage), 1);
    assert_eq!(report.audit.count(AuditKind::MalformedRow), 1);
}

// ============================================================================
// External links
// ============================================================================

#[test]
fn test_external_links_attached() {
    let ws = Workspace::new();
    let (graph, report) = Pipeline::new(ws.config()).merge().unwrap();
    let mr_mime = EX.term("Mr__Mime");

    assert!(graph.contains(
        &mr_mime,
        &external_link(),
        &Term::iri("https://pokemon.fandom.com/wiki/Mr._Mime")
    ));
    assert!(graph.contains(
        &mr_mime,
        &external_link(),
        &Term::iri("http://dbpedia.org/resource/Mr._Mime")
    ));
    assert!(graph.contains(
        &mr_mime,
        &external_link(),
        &Term::iri("https://www.wikidata.org/wiki/Mr._Mime")
    ));
    assert_eq!(graph.objects(&EX.term("Pikachu"), &external_link()).count(), 0);

    let augment = report.augment.unwrap();
    assert_eq!(augment.lookup_entries, 3);
    assert_eq!(augment.subjects_augmented, 2);
    assert_eq!(augment.collisions, 0);
}

// ============================================================================
// Built category graphs
// ============================================================================

#[test]
fn test_built_moves_merge_without_power() {
    let ws = Workspace::new();
    let (moves, build_report) = build_file(
        EntityKind::Move,
        &ws.path("moves.jsonl"),
        &Vocabulary::absent(),
        &BuildOptions::default(),
    )
    .unwrap();
    assert_eq!(build_report.records_read, 3);
    write_graph(&moves, &ws.data().join("moves.ttl"), OutputFormat::Turtle).unwrap();

    let (graph, report) = Pipeline::new(ws.config()).merge().unwrap();
    let tackle = EX.term("Tackle");

    assert!(graph.has_type(&tackle, &EntityKind::Move.class()));
    assert!(graph.value(&tackle, &SCHEMA.term("power")).is_none());
    assert!(graph.value(&EX.term("Thunderbolt"), &SCHEMA.term("power")).is_some());
    assert!(graph.contains(&tackle, &has_type(), &EX.term("Normal")));
    assert!(graph.contains(&tackle, &schema_name(), &Term::lang("Charge", "fr")));
    assert!(graph.contains(
        &EX.term("Transform"),
        &SCHEMA.term("accuracy"),
        &Term::plain("unlimited")
    ));
    assert_eq!(report.link.rule("move-type").linked, 3);
}

#[test]
fn test_ntriples_output() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.output.path = ws.path("output/pokemon.nt");
    config.output.format = OutputFormat::NTriples;

    let (graph, _) = Pipeline::new(config).run().unwrap();
    let written = std::fs::read_to_string(ws.path("output/pokemon.nt")).unwrap();
    assert_eq!(written.lines().count(), graph.len());
}
