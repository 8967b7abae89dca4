//! fluxlinq CLI
//!
//! Translates a JSON-encoded query model into Flux:
//! - `translate`: Print the pipeline, the parameter AST or the full request
//! - `config`: Print a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use fluxlinq::config::{generate_default_config, Config, LoggingConfig};
use fluxlinq::query::{QueryModel, QueryVisitor};
use fluxlinq::schema::{EntitySchema, SchemaRegistry};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fluxlinq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate typed entity queries into Flux")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a query model
    Translate {
        /// Query model (JSON)
        #[arg(short, long)]
        query: PathBuf,
        /// Entity schemas (JSON array, or TOML with [[entity]] tables)
        #[arg(short, long)]
        schema: PathBuf,
        /// Bucket (overrides config)
        #[arg(short, long)]
        bucket: Option<String>,
        /// Also print the parameter bindings
        #[arg(long)]
        ast: bool,
        /// Print the full request payload as JSON instead
        #[arg(long, conflicts_with = "ast")]
        payload: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// TOML layout of a schema file
#[derive(Deserialize)]
struct SchemaFile {
    #[serde(default)]
    entity: Vec<EntitySchema>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Translate {
            query,
            schema,
            bucket,
            ast,
            payload,
        } => {
            let schemas = load_schemas(&schema)?;
            let model: QueryModel = serde_json::from_str(
                &std::fs::read_to_string(&query)
                    .with_context(|| format!("Failed to read query model {:?}", query))?,
            )
            .with_context(|| format!("Invalid query model {:?}", query))?;

            let bucket = bucket.unwrap_or(config.client.bucket);
            tracing::debug!(bucket = %bucket, entities = schemas.len(), "Translating query");

            let translation = QueryVisitor::with_options(&bucket, &schemas, &config.translation)
                .translate(&model)?;

            if payload {
                let request = translation.into_flux_query();
                println!("{}", serde_json::to_string_pretty(&request)?);
            } else {
                if ast {
                    println!("{}", translation.ast);
                    println!();
                }
                println!("{}", translation.query);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    eprintln!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn load_schemas(path: &Path) -> anyhow::Result<SchemaRegistry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {:?}", path))?;

    let entities: Vec<EntitySchema> = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str::<SchemaFile>(&content)
            .with_context(|| format!("Invalid schema file {:?}", path))?
            .entity
    } else {
        serde_json::from_str(&content).with_context(|| format!("Invalid schema file {:?}", path))?
    };

    Ok(entities.into_iter().collect())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fluxlinq={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
