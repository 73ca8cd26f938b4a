use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use demand_board::config::{BoardConfig, DEFAULT_CONFIG_FILE, LogFormat, LoggingSection};

mod cmd;

#[derive(Parser)]
#[command(name = "demand-board")]
#[command(version, about = "Multi-tenant Kanban board for prioritized demands")]
pub struct Cli {
    /// Path to the configuration file (missing file means defaults)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the board HTTP API
    Serve {
        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Enable dev mode (permissive CORS, bind on all interfaces)
        #[arg(long)]
        dev: bool,
    },
    /// Create the database schema
    Init {
        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Also seed a demo company with an admin, a collaborator and a board
        #[arg(long)]
        demo: bool,
    },
}

fn init_tracing(logging: &LoggingSection) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.context("Failed to initialize logging")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = BoardConfig::load_or_default(&cli.config)?;
    config.apply_env()?;

    match cli.command {
        Commands::Serve { port, db_path, dev } => {
            config.apply_cli(port, db_path, dev);
            init_tracing(&config.logging)?;
            for warning in config.validate() {
                warn!("{}", warning);
            }
            cmd::cmd_serve(config).await?;
        }
        Commands::Init { db_path, demo } => {
            config.apply_cli(None, db_path, false);
            init_tracing(&config.logging)?;
            cmd::cmd_init(&config, demo)?;
        }
    }

    Ok(())
}
