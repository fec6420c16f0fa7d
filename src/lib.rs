//! dexgraph - Bulbapedia knowledge graph merger
//!
//! Merges the per-category RDF graphs scraped from Bulbapedia into one graph,
//! resolving name references into typed links, adding multilingual names and
//! attaching external identifiers.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`ontology`] - Graph model, pipeline stages and serialization
//! - [`error`] - Unified error type
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use dexgraph::config::Config;
//! use dexgraph::ontology::Pipeline;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file(std::path::Path::new("config.toml"))?;
//!     config.validate()?;
//!     let (_graph, report) = Pipeline::new(config).run()?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ontology;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{DexgraphErrorTrait, Error, ErrorCategory, Result};
    pub use crate::ontology::{
        EntityKind, Graph, OntologyError, OutputFormat, Pipeline, PipelineReport, Term,
    };
}

// Direct re-exports for convenience
pub use ontology::{Graph, Pipeline, Term};
