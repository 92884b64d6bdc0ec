//! # reqi_router
//!
//! Command-line front-end for the dispatcher. Loads a JSON registry of
//! in-memory systems and either prints the index, resolves a query, or runs
//! a node sequence.
//!
//! ## Startup Sequence
//!
//! 1. Build the [`RouterConfig`] (defaults, then `REQI_REGISTRY`, then flags).
//! 2. Initialise structured logging on stderr.
//! 3. Load the registry and build the dispatcher index.
//! 4. Execute the subcommand and print JSON on stdout.

mod config;
mod registry;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use reqi_dispatch::{Dispatcher, ResolveQuery};
use reqi_system::{Context, Node};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::RouterConfig;

#[derive(Parser)]
#[command(name = "reqi_router", about = "Resolve and route requests across systems")]
struct Cli {
    /// Path to the JSON registry (overrides REQI_REGISTRY)
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    /// Extra tracing directive, e.g. "reqi_dispatch=debug"
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the reverse-lookup index
    Index,

    /// Resolve systems and schemas for the given filters
    Resolve {
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        schema: Option<String>,
        #[arg(long)]
        prop: Option<String>,
        /// Default system (repeatable)
        #[arg(long = "default-system")]
        default_systems: Vec<String>,
        /// Default schema (repeatable)
        #[arg(long = "default-schema")]
        default_schemas: Vec<String>,
    },

    /// Run a JSON array of nodes and print the resulting context
    Run {
        /// File holding the node array
        nodes: PathBuf,
        /// File holding the initial context object
        #[arg(long)]
        ctx: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RouterConfig::from_env();
    if let Some(path) = cli.registry {
        config = config.with_registry_path(path);
    }
    if let Some(directive) = cli.log {
        config = config.with_log_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    info!(registry = %config.registry_path.display(), "router starting");
    let dispatcher = registry::load(&config.registry_path)?;

    let output = match cli.command {
        Command::Index => dispatcher.index().to_json(),
        Command::Resolve {
            system,
            schema,
            prop,
            default_systems,
            default_schemas,
        } => {
            let query = ResolveQuery {
                system,
                schema,
                prop,
                default_systems: (!default_systems.is_empty()).then_some(default_systems),
                default_schemas: (!default_schemas.is_empty()).then_some(default_schemas),
            };
            serde_json::to_value(dispatcher.resolve(&query)?)?
        }
        Command::Run { nodes, ctx } => run(&dispatcher, &nodes, ctx.as_deref())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(dispatcher: &Dispatcher, nodes: &Path, ctx: Option<&Path>) -> Result<serde_json::Value> {
    let nodes: Vec<Node> = read_json(nodes)?;
    let ctx: Option<Context> = ctx.map(read_json::<Context>).transpose()?;

    let mut request = dispatcher.request(nodes, ctx);
    info!(request_id = %request.id(), nodes = request.nodes().len(), "running request");
    let result = request.run()?;
    Ok(result.cloned().map_or(serde_json::Value::Null, serde_json::Value::Object))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("invalid JSON in {}", path.display()))
}
