use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sportsforecast::{api, cli, AppConfig};

#[derive(Parser)]
#[command(name = "sportsforecast")]
#[command(about = "Predict match outcomes from historical results")]
struct Cli {
    /// Match history CSV (overrides DATA_PATH)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Train the model and report held-out accuracy
    Train,
    /// Predict a single fixture
    Predict {
        #[arg(long)]
        home: String,
        #[arg(long)]
        away: String,
        /// Treat the fixture as played on neutral ground
        #[arg(long)]
        neutral: bool,
    },
    /// Query team statistics
    Team {
        #[arg(short, long)]
        name: String,
    },
    /// List all teams in the history
    Teams,
    /// Show the most recent matches
    Matches {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Write a synthetic match history CSV
    Sample {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, default_value = "100")]
        count: usize,
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            tracing::info!("Starting prediction API server on port {}", config.port);
            api::serve(config).await?;
        }
        Some(Commands::Train) => {
            cli::train(&config)?;
        }
        Some(Commands::Predict { home, away, neutral }) => {
            cli::predict(&config, &home, &away, neutral)?;
        }
        Some(Commands::Team { name }) => {
            tracing::info!("Querying team: {}", name);
            cli::query_team(&config, &name)?;
        }
        Some(Commands::Teams) => {
            cli::list_teams(&config)?;
        }
        Some(Commands::Matches { limit }) => {
            cli::recent_matches(&config, limit)?;
        }
        Some(Commands::Sample { output, count, seed }) => {
            cli::write_sample(&output, count, seed)?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting prediction API server on port {}", config.port);
            api::serve(config).await?;
        }
    }

    Ok(())
}
