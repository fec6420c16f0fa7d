//! Common test utilities

use dexgraph::ontology::loader::parse_turtle_str;
use dexgraph::ontology::Graph;

/// Prefixes shared by the inline Turtle snippets
pub const PREFIXES: &str = "@prefix ex: <http://example.org/pokemon/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix schema: <http://schema.org/> .
";

/// Parse a Turtle body written against [`PREFIXES`]
pub fn graph(body: &str) -> Graph {
    parse_turtle_str(&format!("{PREFIXES}{body}")).unwrap()
}

/// Small Pokémon graph with one pending type name
#[allow(dead_code)]
pub fn bulbasaur_graph() -> Graph {
    graph(
        r#"
ex:Bulbasaur a ex:Pokemon ; rdfs:label "Bulbasaur" ; ex:ndex "0001" ; ex:typeName "Grass" .
ex:Grass a ex:PokemonType ; rdfs:label "Grass" .
"#,
    )
}
