//! Namespaces, classes and predicates of the Pokémon knowledge graph
//!
//! Everything downstream (the linker, the translation merger, the front-end
//! queries) depends on these names staying stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::graph::{Graph, Term};

/// An IRI namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    prefix: &'static str,
    base: &'static str,
}

impl Namespace {
    pub const fn new(prefix: &'static str, base: &'static str) -> Self {
        Self { prefix, base }
    }

    /// Turtle prefix label
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Namespace IRI
    pub fn base(&self) -> &'static str {
        self.base
    }

    /// Full IRI for a local name
    pub fn iri(&self, local: &str) -> String {
        format!("{}{}", self.base, local)
    }

    /// Named node for a local name
    pub fn term(&self, local: &str) -> Term {
        Term::Iri(self.iri(local))
    }
}

// ============================================================================
// Namespaces
// ============================================================================

pub const EX: Namespace = Namespace::new("ex", "http://example.org/pokemon/");
pub const SCHEMA: Namespace = Namespace::new("schema", "http://schema.org/");
pub const EP: Namespace = Namespace::new("ep", "http://example.org/episodes/");
pub const IT: Namespace = Namespace::new("it", "http://example.org/items/");
pub const CH: Namespace = Namespace::new("ch", "http://example.org/characters/");
pub const DBO: Namespace = Namespace::new("dbo", "http://dbpedia.org/ontology/");
pub const DBP: Namespace = Namespace::new("dbp", "http://dbpedia.org/property/");
pub const DBR: Namespace = Namespace::new("dbr", "http://dbpedia.org/resource/");
pub const WD: Namespace = Namespace::new("wd", "https://www.wikidata.org/wiki/");
pub const RDF: Namespace = Namespace::new("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
pub const RDFS: Namespace = Namespace::new("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
pub const XSD: Namespace = Namespace::new("xsd", "http://www.w3.org/2001/XMLSchema#");
pub const FOAF: Namespace = Namespace::new("foaf", "http://xmlns.com/foaf/0.1/");

/// Prefixes written at the top of every Turtle output, in order
pub const PREFIXES: &[Namespace] = &[
    EX, SCHEMA, EP, IT, CH, DBO, DBP, DBR, WD, RDF, RDFS, XSD, FOAF,
];

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

// ============================================================================
// Core predicates
// ============================================================================

pub fn rdf_type() -> Term {
    RDF.term("type")
}

pub fn rdfs_label() -> Term {
    RDFS.term("label")
}

pub fn rdfs_class() -> Term {
    RDFS.term("Class")
}

/// Multilingual name predicate
pub fn schema_name() -> Term {
    SCHEMA.term("name")
}

/// National index (zero-padded string)
pub fn ndex() -> Term {
    EX.term("ndex")
}

/// External cross-reference predicate used by the augmenter
pub fn external_link() -> Term {
    DBO.term("wikiPageExternalLink")
}

// ============================================================================
// Classes
// ============================================================================

/// Entity kinds the graph knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Pokemon,
    Ability,
    HiddenAbility,
    EggGroup,
    PokemonType,
    Move,
    Game,
    Episode,
    Item,
    Character,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Pokemon,
        EntityKind::Ability,
        EntityKind::HiddenAbility,
        EntityKind::EggGroup,
        EntityKind::PokemonType,
        EntityKind::Move,
        EntityKind::Game,
        EntityKind::Episode,
        EntityKind::Item,
        EntityKind::Character,
    ];

    /// Namespace the kind's class and instances live in
    pub fn namespace(&self) -> Namespace {
        match self {
            EntityKind::Episode => EP,
            EntityKind::Item => IT,
            EntityKind::Character => CH,
            _ => EX,
        }
    }

    /// Local name of the class
    pub fn class_name(&self) -> &'static str {
        match self {
            EntityKind::Pokemon => "Pokemon",
            EntityKind::Ability => "Ability",
            EntityKind::HiddenAbility => "HiddenAbility",
            EntityKind::EggGroup => "EggGroup",
            EntityKind::PokemonType => "PokemonType",
            EntityKind::Move => "Move",
            EntityKind::Game => "Game",
            EntityKind::Episode => "Episode",
            EntityKind::Item => "Item",
            EntityKind::Character => "Character",
        }
    }

    /// Class node
    pub fn class(&self) -> Term {
        self.namespace().term(self.class_name())
    }

    /// Parse a kind as written in translation tables and record files
    pub fn parse(value: &str) -> Option<Self> {
        let lowered = value.trim().to_lowercase().replace(['_', '-'], " ");
        let kind = match lowered.as_str() {
            "pokemon" | "pokémon" => EntityKind::Pokemon,
            "ability" | "abilities" => EntityKind::Ability,
            "hidden ability" | "hiddenability" => EntityKind::HiddenAbility,
            "egg group" | "egggroup" => EntityKind::EggGroup,
            "type" | "pokemon type" | "pokemontype" => EntityKind::PokemonType,
            "move" | "moves" => EntityKind::Move,
            "game" | "games" => EntityKind::Game,
            "episode" | "episodes" => EntityKind::Episode,
            "item" | "items" => EntityKind::Item,
            "character" | "characters" => EntityKind::Character,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}

// ============================================================================
// Relationship predicates
// ============================================================================

pub fn has_type() -> Term {
    EX.term("hasType")
}

pub fn has_ability() -> Term {
    EX.term("hasAbility")
}

pub fn has_hidden_ability() -> Term {
    EX.term("hasHiddenAbility")
}

pub fn has_egg_group() -> Term {
    EX.term("hasEggGroup")
}

pub fn has_pokemon_debut() -> Term {
    EP.term("hasPokemonDebut")
}

// Raw names a producer could not resolve itself. The linker turns them into
// relationship triples; they stay in the graph as provenance.

pub fn type_name() -> Term {
    EX.term("typeName")
}

pub fn ability_name() -> Term {
    EX.term("abilityName")
}

pub fn hidden_ability_name() -> Term {
    EX.term("hiddenAbilityName")
}

pub fn egg_group_name() -> Term {
    EX.term("eggGroupName")
}

pub fn debut_name() -> Term {
    EP.term("debutName")
}

/// Object properties declared by the default vocabulary: (property, domain, range)
fn object_properties() -> Vec<(Term, EntityKind, EntityKind)> {
    vec![
        (has_type(), EntityKind::Pokemon, EntityKind::PokemonType),
        (has_ability(), EntityKind::Pokemon, EntityKind::Ability),
        (has_hidden_ability(), EntityKind::Pokemon, EntityKind::HiddenAbility),
        (has_egg_group(), EntityKind::Pokemon, EntityKind::EggGroup),
        (has_pokemon_debut(), EntityKind::Episode, EntityKind::Pokemon),
    ]
}

// ============================================================================
// Vocabulary
// ============================================================================

/// Classes declared by a loaded vocabulary graph
///
/// An absent vocabulary makes every class check pass.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    classes: Option<BTreeSet<Term>>,
}

impl Vocabulary {
    /// No vocabulary loaded
    pub fn absent() -> Self {
        Self { classes: None }
    }

    /// Collect every subject declared `rdf:type rdfs:Class`
    pub fn from_graph(graph: &Graph) -> Self {
        let classes = graph
            .subjects_of_type(&rdfs_class())
            .into_iter()
            .cloned()
            .collect();
        Self {
            classes: Some(classes),
        }
    }

    /// Whether a vocabulary was loaded at all
    pub fn is_loaded(&self) -> bool {
        self.classes.is_some()
    }

    /// Whether `class` may be used as a type target
    pub fn is_declared(&self, class: &Term) -> bool {
        self.classes.as_ref().map_or(true, |c| c.contains(class))
    }

    /// Number of declared classes (0 when absent)
    pub fn class_count(&self) -> usize {
        self.classes.as_ref().map_or(0, BTreeSet::len)
    }
}

/// The vocabulary file shipped with the tool
pub fn default_vocabulary_graph() -> Graph {
    let mut graph = Graph::new();
    let property = RDF.term("Property");

    for kind in EntityKind::ALL {
        let class = kind.class();
        graph.insert(class.clone(), rdf_type(), rdfs_class());
        graph.insert(class, rdfs_label(), Term::lang(kind.class_name(), "en"));
    }
    graph.insert(
        EntityKind::HiddenAbility.class(),
        RDFS.term("subClassOf"),
        EntityKind::Ability.class(),
    );

    for (prop, domain, range) in object_properties() {
        graph.insert(prop.clone(), rdf_type(), property.clone());
        graph.insert(prop.clone(), RDFS.term("domain"), domain.class());
        graph.insert(prop, RDFS.term("range"), range.class());
    }
    graph.insert(has_type(), RDFS.term("domain"), EntityKind::Move.class());

    for prop in [ndex(), schema_name(), external_link()] {
        graph.insert(prop, rdf_type(), property.clone());
    }
    graph
}
