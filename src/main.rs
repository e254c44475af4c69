// src/main.rs

//! tubepulse: YouTube Non-Trending Dataset Collector CLI
//!
//! Collects video metadata via the YouTube Data API v3 into a labeled
//! CSV dataset and offers maintenance operations over accumulated files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tubepulse::error::Result;
use tubepulse::models::Config;
use tubepulse::pipeline::{run_clean, run_collect, run_filter, run_prepare_trending, run_validate};
use tubepulse::utils::log;

#[derive(Parser, Debug)]
#[command(
    name = "tubepulse",
    version = "0.1.0",
    about = "YouTube Non-Trending Dataset Collector"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// CLI Commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Collect non-trending video metadata into the output CSV
    Collect {
        /// Override the output CSV path
        #[arg(short, long)]
        output: Option<String>,

        /// Override the target record count
        #[arg(short, long)]
        target: Option<usize>,
    },
    /// Validate configuration
    Validate,
    /// Dataset maintenance over accumulated CSV files
    Dataset {
        #[command(subcommand)]
        operation: DatasetOp,
    },
}

/// Dataset maintenance operations
#[derive(Subcommand, Debug)]
enum DatasetOp {
    /// Drop rows with null-like values in required columns
    Clean {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Report per-year row counts split by trending label
    Filter {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, default_value_t = 2022)]
        from: i32,
        #[arg(long, default_value_t = 2025)]
        to: i32,
    },
    /// Label a raw trending export and drop its extra columns
    PrepareTrending {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 2022)]
        from: i32,
    },
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config);

    if cli.quiet {
        config.logging.level = "warn".to_string();
    }
    log::init(&config.logging.level);

    match cli.command {
        Command::Collect { output, target } => {
            if let Some(path) = output {
                config.paths.output_file = path;
            }
            if let Some(count) = target {
                config.collection.target_count = count;
            }
            run_collect(&config).await?;
        }
        Command::Validate => run_validate(&config)?,
        Command::Dataset { operation } => match operation {
            DatasetOp::Clean { input, output } => run_clean(&input, &output)?,
            DatasetOp::Filter { input, from, to } => run_filter(&input, from, to)?,
            DatasetOp::PrepareTrending {
                input,
                output,
                from,
            } => run_prepare_trending(&input, &output, from)?,
        },
    }

    Ok(())
}
