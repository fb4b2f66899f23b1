//! oaisync CLI
//!
//! Batch entry point, meant to be run by a scheduler. Exits non-zero when any
//! collection failed or any record could not be applied to the index.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use oaisync::{
    config::{ConfigOverrides, load_config},
    error::Result,
    index::SolrIndex,
    models::Config,
    pipeline,
    services::ResyncCommand,
    storage::JsonRegistry,
};

/// oaisync - ResourceSync collection mirror and Solr indexer
#[derive(Parser, Debug)]
#[command(
    name = "oaisync",
    version,
    about = "Mirror member institution collections and index them in Solr"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "storage/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Registry file (overrides registry.path)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Solr core URL (overrides index.url)
    #[arg(long, global = true)]
    solr_url: Option<String>,

    /// Replication program (overrides replication.program)
    #[arg(long, global = true)]
    resync: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replicate collections and apply their changes to the index
    Sync {
        /// Only sync the collection with this key
        #[arg(long)]
        collection: Option<String>,
    },

    /// Validate configuration and registry rows
    Validate,

    /// List collections and their next sync mode
    Info,
}

/// Initialize logging at the given default level.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        Config::load(&cli.config)
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string())
    };
    init_logging(&level);

    log::info!("oaisync starting...");

    let overrides = ConfigOverrides {
        registry: cli.registry.clone(),
        solr_url: cli.solr_url.clone(),
        program: cli.resync.clone(),
    };

    match cli.command {
        Command::Sync { collection } => {
            let config = load_config(&cli.config, &overrides)?;
            log::info!("Loaded configuration from {}", cli.config.display());

            let registry = JsonRegistry::from_config(&config.registry);
            let replicator = ResyncCommand::new(&config.replication.program);
            let index = SolrIndex::new(&config.index)?;

            let report =
                pipeline::run_sync(&registry, &replicator, &index, collection.as_deref()).await?;

            if report.has_failures() {
                log::error!("Sync finished with errors");
                return Ok(ExitCode::FAILURE);
            }
            log::info!("Sync complete!");
        }

        Command::Validate => {
            let mut config = Config::load_or_default(&cli.config);
            overrides.apply(&mut config);
            let registry = JsonRegistry::from_config(&config.registry);

            if let Err(e) = pipeline::run_validate(&config, &registry).await {
                log::error!("Validation failed: {}", e);
                return Ok(ExitCode::FAILURE);
            }
            log::info!("All validations passed!");
        }

        Command::Info => {
            let config = load_config(&cli.config, &overrides)?;
            let registry = JsonRegistry::from_config(&config.registry);
            pipeline::run_info(&registry).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
