//! Knowledge graph merge, linking and enrichment
//!
//! This module turns the per-category graphs scraped from Bulbapedia into one
//! consistent knowledge graph.
//!
//! # Features
//!
//! - **Loading**: Parse the vocabulary and every category graph into one
//!   unified graph, skipping unreadable files
//! - **Normalization**: One comparison key for names that differ only by case,
//!   diacritics, whitespace or a parenthetical disambiguator
//! - **Linking**: Turn pending name literals into typed relationships, never
//!   pointing at a node that does not exist (hidden abilities excepted)
//! - **Translations**: Language-tagged `schema:name` literals from TSV tables
//! - **External links**: Cross-reference scraped page metadata and attach
//!   DBpedia/Wikidata identifiers
//! - **Serialization**: Turtle or N-Triples, written atomically
//!
//! # Submodules
//!
//! - [`graph`] - Terms, triples and the ordered in-memory graph
//! - [`vocab`] - Namespaces, classes and predicates
//! - [`normalize`] - Name normalization and URI minting
//! - [`loader`] - Turtle loading with per-file outcomes
//! - [`linker`] - Reference resolution rules
//! - [`translations`] - Multilingual name merging
//! - [`augment`] - External-link augmentation
//! - [`storage`] - Serialization and atomic writes
//! - [`records`] - Per-category graph builders for scraped records
//! - [`pipeline`] - The staged merge run
//! - [`stats`] - Audit log, graph statistics and stage timings
//! - [`error`] - Custom error types for ontology operations
//!
//! # Quick Start
//!
//! ```ignore
//! use dexgraph::ontology::{load, link_all, LinkerConfig, References, write_graph, OutputFormat};
//!
//! let loaded = load(Some(Path::new("data/vocabulary.ttl")), &files)?;
//! let rules = LinkerConfig::default().rules();
//! let references = References::default();
//! let (graph, report) = link_all(loaded.graph, &rules, &references, &loaded.vocabulary);
//! write_graph(&graph, Path::new("output/pokemon.ttl"), OutputFormat::Turtle)?;
//! ```

pub mod augment;
pub mod error;
pub mod graph;
pub mod linker;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod stats;
pub mod storage;
pub mod translations;
pub mod vocab;

pub use augment::{augment, AugmentConfig, AugmentReport, LinkLookup};
pub use error::{OntologyError, OntologyResult};
pub use graph::{Graph, Literal, Term, Triple};
pub use linker::{
    link, link_all, LinkOutcome, LinkPolicy, LinkReport, LinkRule, LinkerConfig, References,
};
pub use loader::{load, load_dir, read_turtle, LoadReport, Loaded};
pub use normalize::{mint, normalize, to_uri_token, zero_pad};
pub use pipeline::{Pipeline, PipelineReport};
pub use records::{build_file, build_records, BuildOptions, BuildReport};
pub use stats::{AuditKind, AuditLog, GraphStats, Stage};
pub use storage::{write_graph, OutputFormat};
pub use translations::{merge_translations, read_translations, TranslationReport, TranslationRow};
pub use vocab::{EntityKind, Vocabulary};
