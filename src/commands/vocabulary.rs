use anyhow::Result;
use std::path::PathBuf;

use dexgraph::ontology::storage::{serialize, write_graph};
use dexgraph::ontology::vocab::default_vocabulary_graph;
use dexgraph::ontology::OutputFormat;

pub fn vocabulary(output: Option<PathBuf>) -> Result<()> {
    let graph = default_vocabulary_graph();

    match output {
        Some(path) => {
            write_graph(&graph, &path, OutputFormat::Turtle)?;
            println!("Vocabulary written to {} ({} triples)", path.display(), graph.len());
        }
        None => print!("{}", serialize(&graph, OutputFormat::Turtle)),
    }

    Ok(())
}
