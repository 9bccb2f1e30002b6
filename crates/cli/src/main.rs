//! Matchcast CLI
//!
//! A command-line front end for the matchcast outcome model: train from a
//! CSV of historical fixtures, predict a single fixture, and inspect
//! persisted model artifacts. The core library has no CLI surface of its
//! own; this binary is strictly a caller.

mod commands;
mod config;
mod dataset;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Matchcast outcome prediction CLI
#[derive(Parser)]
#[command(name = "matchcast")]
#[command(author, version, about = "Train and query the match outcome model", long_about = None)]
pub struct Cli {
    /// Directory holding persisted model artifacts
    /// (can also be set via MATCHCAST_MODELS_DIR)
    #[arg(long, global = true)]
    pub models_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model from a CSV of historical fixtures
    Train {
        /// CSV file with columns home_form,market_margin,home_implied,outcome
        #[arg(long)]
        data: PathBuf,

        /// Override the maximum number of training epochs
        #[arg(long)]
        epochs: Option<usize>,

        /// Override the learning rate
        #[arg(long)]
        lr: Option<f64>,

        /// Override the feature-embedding width
        #[arg(long)]
        embed_dim: Option<usize>,

        /// Override the number of refinement steps
        #[arg(long)]
        steps: Option<usize>,

        /// Seed for deterministic weight initialization
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Predict the outcome distribution for a single fixture
    Predict {
        /// Home-team recent form
        #[arg(long)]
        home_form: f64,

        /// Bookmaker market margin
        #[arg(long)]
        market_margin: f64,

        /// Home-team implied probability
        #[arg(long)]
        home_implied: f64,
    },

    /// Show persisted model artifacts
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = config::CliConfig::load()?;
    let models_dir = cli
        .models_dir
        .unwrap_or_else(|| PathBuf::from(&settings.models_dir));

    match cli.command {
        Commands::Train {
            data,
            epochs,
            lr,
            embed_dim,
            steps,
            seed,
        } => commands::train::run(
            &data,
            &models_dir,
            commands::train::Overrides {
                epochs,
                lr,
                embed_dim,
                steps,
                seed,
            },
            cli.format,
        ),
        Commands::Predict {
            home_form,
            market_margin,
            home_implied,
        } => commands::predict::run(
            &models_dir,
            home_form,
            market_margin,
            home_implied,
            cli.format,
        ),
        Commands::Inspect => commands::inspect::run(&models_dir, cli.format),
    }
}
