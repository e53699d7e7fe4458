mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use device_catalog::SyncPipeline;
use device_catalog_http::RestCatalogClient;
use device_catalog_store::DeviceStore;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "device-sync")]
#[command(about = "Sync a public device catalog into a local store")]
struct Cli {
    /// SQLite database file (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the catalog, store new devices, and apply the capacity rewrite
    Sync {
        /// Catalog endpoint (overrides the config file)
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// List stored devices
    List {
        /// Only show devices with exactly this capacity
        #[arg(long)]
        capacity: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("could not determine data directory")?;
    let dir = base.join("device-sync");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory: {}", dir.display()))?;
    Ok(dir)
}

fn db_path(cli_db: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    match cli_db.or_else(|| config.database.clone()) {
        Some(path) => Ok(path),
        None => Ok(data_dir()?.join("devices.db")),
    }
}

fn build_store(path: &Path) -> Result<DeviceStore> {
    DeviceStore::open(path)
        .with_context(|| format!("failed to open device store at {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut app_config = config::load_config();

    match cli.command {
        Command::Sync { endpoint } => {
            if let Some(endpoint) = endpoint {
                app_config.endpoint = endpoint;
            }

            let store = Arc::new(build_store(&db_path(cli.db, &app_config)?)?);
            let client = RestCatalogClient::new(app_config.client_config())?;
            let pipeline =
                SyncPipeline::new(Arc::new(client), store, app_config.pipeline_config());

            commands::sync::run(&pipeline).await?;
            Ok(())
        }
        Command::List { capacity } => {
            let store = build_store(&db_path(cli.db, &app_config)?)?;
            commands::list::run(&store, capacity.as_deref())
        }
    }
}
