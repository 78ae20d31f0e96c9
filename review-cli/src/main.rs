#![warn(clippy::all)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use review_analysis::{AnalysisOutcome, ClientConfig, ResilientClient};
use review_common::config::{config_path, Config};
use review_common::logging::init_logging;

mod report;

/// Aspect-based sentiment analysis for a single review.
#[derive(Parser, Debug)]
#[command(name = "review-cli")]
#[command(version)]
#[command(about = "Break a review down into per-aspect sentiment.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one review (from TEXT, --file, or stdin)
    Analyze {
        /// Review text
        text: Option<String>,

        /// Read the review from a text file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Analysis endpoint (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Retries after the first attempt (overrides config)
        #[arg(long)]
        retries: Option<u32>,

        /// Print the outcome and summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Write a default config file instead of printing
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_env().context("Failed to load configuration")?;
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    match cli.command {
        Commands::Config { init: true } => {
            let path = config_path();
            Config::init_at(&path).context("Failed to write default configuration")?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Config { init: false } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Analyze {
            text,
            file,
            endpoint,
            retries,
            json,
        } => {
            let mut config = config;
            if let Some(endpoint) = endpoint {
                config.client.endpoint = endpoint;
            }
            if let Some(retries) = retries {
                config.client.max_retries = retries;
            }
            let config = config.validated().context("Invalid configuration")?;

            let review = read_review(text, file)?;
            let succeeded = analyze(&config, review, json).await?;
            if !succeeded {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn read_review(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read review from {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read review from stdin")?;
    Ok(buf)
}

/// Run one submission; Ctrl-C abandons it. Returns whether it succeeded.
async fn analyze(config: &Config, review: String, json: bool) -> Result<bool> {
    let client = ResilientClient::new(&ClientConfig::from(&config.client));
    tracing::debug!(endpoint = %config.client.endpoint, "Submitting review");

    let submission = client.spawn(review);
    let outcome = tokio::select! {
        outcome = submission.outcome() => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, abandoning submission");
            None
        }
    };

    let Some(outcome) = outcome else {
        eprintln!("Analysis abandoned.");
        return Ok(false);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&outcome))?);
    } else {
        print!("{}", report::render(&outcome));
    }
    Ok(outcome.is_success())
}

fn to_json(outcome: &AnalysisOutcome) -> serde_json::Value {
    serde_json::json!({
        "outcome": outcome,
        "summary": outcome.summary(),
        "message": outcome.error_message(),
    })
}
