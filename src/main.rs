//! Caption Cache command line.
//!
//! - `convert <plan>` - print the index operations for a legacy plan
//! - `migrate <plan> --state <file>` - apply a plan once, recording it
//! - `check` - load configuration and connect to configured backends

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use caption_cache::AppState;
use caption_cache::config::Config;
use caption_cache::migrations::{MigrationPlan, StateFile};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Debug, Parser)]
#[command(name = "caption-cache", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the operations replacing a plan's index_together declarations.
    Convert {
        /// JSON plan file.
        plan: PathBuf,
    },
    /// Apply a plan's migration to a state file, once.
    Migrate {
        /// JSON plan file.
        plan: PathBuf,
        /// JSON state file, created if missing.
        #[arg(long)]
        state: PathBuf,
    },
    /// Load configuration and connect to the configured backends.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("caption_cache=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Convert { plan } => {
            let migration = MigrationPlan::load(&plan)?.to_migration()?;
            println!("{}", serde_json::to_string_pretty(&migration.operations)?);
        }
        Command::Migrate { plan, state } => {
            let plan = MigrationPlan::load(&plan)?;
            let mut file = StateFile::load(&state)?;

            if file.apply_plan(&plan)? {
                file.save(&state)?;
            } else {
                info!("{}.{} already applied, nothing to do", plan.app_label, plan.name);
            }
        }
        Command::Check => {
            let config = Config::from_env()?;
            info!("Configuration loaded: {:?}", config);

            let state = AppState::connect(&config).await?;
            info!("{:?}", state);
        }
    }

    Ok(())
}
