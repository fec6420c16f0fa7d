//! Test fixtures for integration tests
//!
//! Provides small category graphs, a translation table, a link graph and a
//! helper that lays them out in a temporary data directory.

use dexgraph::config::Config;
use dexgraph::ontology::storage::write_graph;
use dexgraph::ontology::vocab::default_vocabulary_graph;
use dexgraph::ontology::OutputFormat;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PREFIXES: &str = r#"
@prefix ex: <http://example.org/pokemon/> .
@prefix ep: <http://example.org/episodes/> .
@prefix schema: <http://schema.org/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix dbo: <http://dbpedia.org/ontology/> .
"#;

/// Pokémon with pending type, ability and egg group names
pub const POKEMON_TTL: &str = r#"
ex:Bulbasaur a ex:Pokemon ;
    rdfs:label "Bulbasaur" ;
    ex:ndex "0001" ;
    ex:typeName "Grass", "Poison" ;
    ex:abilityName "Overgrow" ;
    ex:hiddenAbilityName "Chlorophyll" ;
    ex:eggGroupName "Monster", "Grass" .

ex:Pikachu a ex:Pokemon ;
    rdfs:label "Pikachu" ;
    ex:ndex "25" ;
    ex:typeName "Electric" ;
    ex:abilityName "Static" ;
    ex:hiddenAbilityName "Lightning Rod" ;
    ex:eggGroupName "Field", "Fairy" .

ex:Mr__Mime a ex:Pokemon ;
    rdfs:label "Mr. Mime" ;
    ex:ndex "0122" ;
    ex:typeName "Psychic", "Fairy" .

ex:MissingNo_ a ex:Pokemon ;
    rdfs:label "MissingNo." ;
    ex:typeName "Bird" ;
    ex:abilityName "Glitch" .
"#;

pub const TYPES_TTL: &str = r#"
ex:Grass a ex:PokemonType ; rdfs:label "Grass" .
ex:Poison a ex:PokemonType ; rdfs:label "Poison" .
ex:Electric a ex:PokemonType ; rdfs:label "Electric" .
ex:Psychic a ex:PokemonType ; rdfs:label "Psychic" .
ex:Fairy a ex:PokemonType ; rdfs:label "Fairy" .
ex:Normal a ex:PokemonType ; rdfs:label "Normal" .
"#;

/// Chlorophyll is listed as a regular ability, Lightning Rod is missing
pub const ABILITIES_TTL: &str = r#"
ex:Overgrow a ex:Ability ; rdfs:label "Overgrow" .
ex:Static a ex:Ability ; rdfs:label "Static" .
ex:Chlorophyll a ex:Ability ; rdfs:label "Chlorophyll" .
"#;

pub const EGG_GROUPS_TTL: &str = r#"
ex:Monster a ex:EggGroup ; rdfs:label "Monster" .
ex:Grass a ex:EggGroup ; rdfs:label "Grass" .
ex:Field a ex:EggGroup ; rdfs:label "Field" .
ex:Fairy a ex:EggGroup ; rdfs:label "Fairy" .
"#;

pub const EPISODES_TTL: &str = r#"
ep:Pokemon___I_Choose_You_ a ep:Episode ;
    ep:hasTitle "Pokémon - I Choose You!" ;
    ep:debutName "Pikachu", "Ho-Oh" .
"#;

/// Tackle has no power in the move table
pub const MOVES_JSONL: &str = concat!(
    r#"{"name": "Tackle", "type": "Normal", "category": "Physical", "accuracy": "100%", "power": "—", "pp": "35"}"#,
    "\n",
    r#"{"name": "Thunderbolt", "type": "Electric", "category": "Special", "accuracy": "100%", "power": "90", "pp": "15"}"#,
    "\n",
    r#"{"name": "Transform", "type": "Normal", "category": "Status", "accuracy": "—%", "power": "—", "pp": "10"}"#,
    "\n",
);

pub const TRANSLATIONS_TSV: &str = "type\tid\tlabel\tlanguage
pokemon\t0001\tBulbizarre\tFrench
pokemon\t1\tBisasam\tGerman
pokemon\t0025\tピカチュウ\tJapanese
pokemon\t0025\tPikachu\tofficial roomaji
pokemon\t0001\tBulbizarre\tFrench
pokemon\t0122\tM. Mime\tFrench
move\tTackle\tCharge\tFrench
ability\tOvergrow\tEngrais\tFrench
pokemon\t0999\tNobody\tFrench
pokemon\t0001\tBulbasaur\tKlingon
pokemon\t0001\t\tFrench
";

/// Scraped page metadata with external links
pub const LINKS_TTL: &str = r#"
<http://example.org/bulbapedia/page/Mr._Mime_(Pok%C3%A9mon)>
    dbo:wikiPageExternalLink <https://pokemon.fandom.com/wiki/Mr._Mime> .
<http://example.org/bulbapedia/page/Bulbasaur_(Pok%C3%A9mon)>
    dbo:wikiPageExternalLink <https://pokemon.fandom.com/wiki/Bulbasaur> .
<http://example.org/bulbapedia/page/Arceus>
    dbo:wikiPageExternalLink <https://pokemon.fandom.com/wiki/Arceus> .
"#;

/// A data directory with every fixture written to disk
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();

        write_graph(
            &default_vocabulary_graph(),
            &data.join("vocabulary.ttl"),
            OutputFormat::Turtle,
        )
        .unwrap();
        for (name, body) in [
            ("pokemon.ttl", POKEMON_TTL),
            ("types.ttl", TYPES_TTL),
            ("abilities.ttl", ABILITIES_TTL),
            ("egg_groups.ttl", EGG_GROUPS_TTL),
            ("episodes.ttl", EPISODES_TTL),
        ] {
            std::fs::write(data.join(name), format!("{PREFIXES}{body}")).unwrap();
        }
        std::fs::write(dir.path().join("translations.tsv"), TRANSLATIONS_TSV).unwrap();
        std::fs::write(dir.path().join("links.ttl"), format!("{PREFIXES}{LINKS_TTL}")).unwrap();
        std::fs::write(dir.path().join("moves.jsonl"), MOVES_JSONL).unwrap();

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn data(&self) -> PathBuf {
        self.root().join("data")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Config pointing every stage at the fixtures
    pub fn config(&self) -> Config {
        let data = self.data();
        let mut config = Config::default();
        config.inputs.vocabulary = Some(data.join("vocabulary.ttl"));
        config.inputs.data_dir = Some(data.clone());
        config.references.types = Some(data.join("types.ttl"));
        config.references.abilities = Some(data.join("abilities.ttl"));
        config.references.egg_groups = Some(data.join("egg_groups.ttl"));
        config.translations.files = vec![self.path("translations.tsv")];
        config.augment.link_graphs = vec![self.path("links.ttl")];
        config.output.path = self.path("output/pokemon.ttl");
        config.output.report = Some(self.path("output/report.json"));
        config
    }
}
