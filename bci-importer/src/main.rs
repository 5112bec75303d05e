//! bci-importer - Bulk CSV Importer
//!
//! Imports tabular records into entities, attaching remote files as
//! deduplicated assets.
//!
//! Commands:
//! - `serve`: HTTP service (`POST /import` multipart upload)
//! - `import <FILE>`: one synchronous import against the local database

use anyhow::{Context, Result};
use bci_common::config::{
    default_bind_address, default_config_path, load_toml_config, RootFolderInitializer,
    RootFolderResolver,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use bci_importer::config::ImportSettings;
use bci_importer::models::Upload;
use bci_importer::services::{self, HttpFetcher};
use bci_importer::AppState;

const MODULE_NAME: &str = "bci-importer";

/// Command-line arguments for bci-importer
#[derive(Parser, Debug)]
#[command(name = "bci-importer")]
#[command(about = "Bulk CSV importer with remote asset upload")]
#[command(version)]
struct Args {
    /// Root folder holding the database and stored assets
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// TOML config file (default: <config_dir>/bci/bci-importer.toml)
    #[arg(short, long, global = true, env = "BCI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to listen on (overrides TOML bind_address)
        #[arg(short, long, env = "BCI_BIND_ADDRESS")]
        bind: Option<String>,
    },
    /// Import one CSV file and print the summary
    Import {
        /// CSV file to import
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(|| default_config_path(MODULE_NAME));
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => Default::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!("Starting {} v{}", MODULE_NAME, env!("CARGO_PKG_VERSION"));

    let resolver = RootFolderResolver::new(MODULE_NAME)
        .with_toml_config(toml_config.clone())
        .with_cli_arg(args.root_folder.clone());
    let initializer = RootFolderInitializer::new(resolver.resolve());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = bci_common::db::init_database(&db_path).await?;

    let fetcher = Arc::new(HttpFetcher::new()?);

    match args.command {
        Command::Serve { bind } => {
            let bind = bind
                .or_else(|| toml_config.bind_address.clone())
                .unwrap_or_else(default_bind_address);

            let state = AppState::new(
                db_pool,
                fetcher,
                toml_config.import.clone(),
                initializer.asset_dir(),
            )
            .with_resolved_asset_base_url()
            .await?;
            info!("Serving assets under {}", state.asset_base_url);
            let app = bci_importer::build_router(state);

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("Listening on http://{}", bind);
            info!("Health check: http://{}/health", bind);

            axum::serve(listener, app).await?;
        }
        Command::Import { file } => {
            let settings =
                ImportSettings::resolve(&db_pool, &toml_config.import, initializer.asset_dir())
                    .await?;
            let orchestrator = services::sqlite_orchestrator(&db_pool, fetcher, &settings);

            let handle = std::fs::File::open(&file)
                .with_context(|| format!("Unable to open {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let summary = orchestrator
                .run(Upload::new(file_name, std::io::BufReader::new(handle)))
                .await?;

            bci_importer::db::import_runs::save_run(&db_pool, &summary).await?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
            println!("{}", summary.message());
        }
    }

    Ok(())
}
