use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dexgraph::error::{self, DexgraphErrorTrait};

mod commands;

#[derive(Parser)]
#[command(
    name = "dexgraph",
    version,
    about = "Merge, link and enrich scraped Bulbapedia RDF graphs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the category graphs into one linked, translated graph
    Merge {
        /// Config file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Vocabulary file declaring the classes
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Directory of category graphs (.ttl)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Additional category graph, may repeat
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Translation table (TSV), may repeat
        #[arg(short, long = "translations")]
        translations: Vec<PathBuf>,

        /// Link graph for external links, may repeat
        #[arg(short, long = "links")]
        links: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (turtle, ntriples)
        #[arg(long)]
        format: Option<String>,

        /// Run report (JSON) path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Do not mint hidden abilities missing from the abilities reference
        #[arg(long, default_value = "false")]
        strict: bool,
    },

    /// Build one category graph from scraped JSON Lines records
    Build {
        /// Entity kind (pokemon, move, ability, type, egg-group, episode, item, game, character)
        #[arg(short, long)]
        kind: String,

        /// JSON Lines input
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Vocabulary file; the kind's class must be declared in it
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Listing of hidden ability names, one per line
        #[arg(long)]
        hidden_abilities: Option<PathBuf>,

        /// Output format (turtle, ntriples)
        #[arg(long, default_value = "turtle")]
        format: String,
    },

    /// Write the vocabulary file declaring every class and relationship
    Vocabulary {
        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show statistics for a merged graph
    Stats {
        /// Graph file
        #[arg(short, long, default_value = "output/pokemon.ttl")]
        graph: PathBuf,

        /// Run report to summarize alongside
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    setup_tracing(&cli.log_format, cli.verbose)?;

    if let Err(err) = run(cli.command) {
        tracing::error!(
            category = ?err.category(),
            recoverable = err.is_recoverable(),
            "{}",
            err.user_message()
        );
        return Err(err.into());
    }
    Ok(())
}

fn run(command: Commands) -> error::Result<()> {
    match command {
        Commands::Merge {
            config,
            vocabulary,
            data_dir,
            files,
            translations,
            links,
            output,
            format,
            report,
            strict,
        } => {
            tracing::info!(
                config = ?config,
                data_dir = ?data_dir,
                files = files.len(),
                translations = translations.len(),
                links = links.len(),
                "Starting merge command"
            );
            let overrides = commands::MergeOverrides {
                vocabulary,
                data_dir,
                files,
                translations,
                link_graphs: links,
                output,
                format,
                report,
                strict_hidden_abilities: strict,
            };
            commands::merge(config, overrides)?;
        }

        Commands::Build {
            kind,
            input,
            output,
            vocabulary,
            hidden_abilities,
            format,
        } => {
            tracing::info!(
                kind = %kind,
                input = %input.display(),
                output = %output.display(),
                "Starting build command"
            );
            commands::build(kind, input, output, vocabulary, hidden_abilities, format)?;
        }

        Commands::Vocabulary { output } => {
            commands::vocabulary(output)?;
        }

        Commands::Stats { graph, report } => {
            commands::stats(graph, report)?;
        }
    }

    tracing::info!("dexgraph completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("dexgraph=debug,info")
        } else {
            tracing_subscriber::EnvFilter::new("dexgraph=info,warn")
        }
    });

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
