//! # Command Line Interface
//!
//! CLI commands for running the control plane and for offline
//! configuration checks.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::start_api_server;
use crate::config::AppConfig;
use crate::domain::Configuration;
use crate::{observability, storage, validation, ControlPlane, APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "gateplane")]
#[command(about = "Gateplane reverse-proxy configuration control plane")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the control plane server
    Serve {
        /// Port to bind to (overrides GATEPLANE_API_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind to (overrides GATEPLANE_API_BIND)
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Validate a configuration file without touching any state
    Validate {
        /// Path to a configuration JSON file
        file: PathBuf,
    },
}

/// Run CLI commands
pub async fn run_cli() -> crate::Result<()> {
    // Load .env before anything reads the environment; a missing file is fine
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("warning: error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    observability::init_tracing(&config.observability)?;

    match cli.command {
        Some(Commands::Serve { port, addr }) => serve(config, port, addr).await,
        Some(Commands::Validate { file }) => validate_file(&file),
        None => serve(config, None, None).await,
    }
}

async fn serve(
    mut config: AppConfig,
    port: Option<u16>,
    addr: Option<String>,
) -> crate::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(addr) = addr {
        config.server.bind_address = addr;
    }
    config.validate()?;

    info!(
        app_name = APP_NAME,
        version = VERSION,
        data_dir = %config.storage.data_dir.display(),
        engine = %config.engine.admin_endpoint,
        history_retention = config.storage.history_retention,
        "starting Gateplane control plane"
    );

    let control = Arc::new(ControlPlane::open(&config)?);
    start_api_server(&config.server, control).await
}

fn validate_file(file: &std::path::Path) -> crate::Result<()> {
    let config: Configuration = storage::read_json(file)?;
    let report = validation::validate(&config);

    if report.valid {
        println!("{}: valid", file.display());
        return Ok(());
    }

    eprintln!("{}: {} validation error(s)", file.display(), report.errors.len());
    for error in &report.errors {
        eprintln!("  - {}", error);
    }
    process::exit(1);
}
