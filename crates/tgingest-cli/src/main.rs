mod crawl;
mod db;
mod detect;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Default location of the cleaned CSV written by `clean`.
const DEFAULT_CLEANED_PATH: &str = "./data/cleaned_data.csv";

#[derive(Debug, Parser)]
#[command(name = "tgingest")]
#[command(about = "Telegram channel ingestion pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl channels into the raw dataset file
    Crawl {
        /// Crawl only this channel (repeatable); defaults to the configured channels
        #[arg(long = "channel")]
        channels: Vec<String>,

        /// Re-fetch sequences already present in the dataset
        #[arg(long)]
        full: bool,
    },
    /// Clean the raw dataset into a CSV of cleaned rows
    Clean {
        /// Raw dataset to read; defaults to the configured dataset path
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_CLEANED_PATH)]
        output: PathBuf,
    },
    /// Clean the raw dataset and load it into `cleaned_data`
    Load {
        /// File to read; the raw dataset unless `--from-cleaned` is given
        #[arg(long)]
        input: Option<PathBuf>,

        /// Read an already cleaned CSV instead of cleaning the raw dataset
        #[arg(long)]
        from_cleaned: bool,
    },
    /// Report dataset image paths that are missing on disk
    VerifyMedia {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Run object detection over downloaded images
    Detect {
        /// Image folder; defaults to the configured media directory
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Detector command line; overrides `TGINGEST_DETECTOR_COMMAND`
        #[arg(long)]
        command: Option<String>,

        /// Insert detections into `object_detections` instead of printing them
        #[arg(long)]
        store: bool,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check the database connection
    Ping,
    /// Apply pending schema migrations
    Init,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = tgingest_core::load_app_config()?;
    init_tracing(&config.log_level);
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Crawl { channels, full }) => {
            crawl::run_crawl(&config, &channels, full).await?;
        }
        Some(Commands::Clean { input, output }) => {
            let input = input.unwrap_or_else(|| config.dataset_path.clone());
            pipeline::run_clean(&input, &output)?;
        }
        Some(Commands::Load {
            input,
            from_cleaned,
        }) => {
            pipeline::run_load(&config, input, from_cleaned).await?;
        }
        Some(Commands::VerifyMedia { input }) => {
            let input = input.unwrap_or_else(|| config.dataset_path.clone());
            pipeline::run_verify_media(&input)?;
        }
        Some(Commands::Detect {
            folder,
            command,
            store,
        }) => {
            let folder = folder.unwrap_or_else(|| config.media_dir.clone());
            detect::run_detect(&config, &folder, command.as_deref(), store).await?;
        }
        Some(Commands::Db { command }) => match command {
            DbCommands::Ping => db::run_ping(&config).await?,
            DbCommands::Init => db::run_init(&config).await?,
        },
        None => println!("tgingest: no command given, see --help"),
    }

    Ok(())
}
