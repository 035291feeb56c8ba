//! Compose the daily briefing and deliver it to every subscriber

#![deny(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::must_use_candidate)]

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use herald::{ConsoleTransport, Digest, HeraldConfig, SummarizerConfig, compose, render_report};
use herald_common::{
    Signal, internal, logging,
    tracing::{error, info, warn},
};
use herald_delivery::{Cancellation, DeliveryProcessor};
use tokio::{io::AsyncReadExt, sync::broadcast};

/// Compose and deliver the daily briefing
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Deliver the daily briefing to subscribers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a message to every configured subscriber
    Send {
        /// Test mode: segment and report, but never call the transport
        #[arg(long)]
        test: bool,

        /// Read the message text from a file
        #[arg(long, conflicts_with = "digest")]
        message: Option<PathBuf>,

        /// Compose the briefing from a RON file of headlines per category
        #[arg(long)]
        digest: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Send {
            test,
            message,
            digest,
            json,
        } => send(cli.config, test, message, digest, json).await,
    }
}

async fn send(
    config_path: Option<PathBuf>,
    test: bool,
    message: Option<PathBuf>,
    digest: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let path = HeraldConfig::find(config_path.as_deref())?;
    let mut config = HeraldConfig::load(&path)?;
    internal!(level = INFO, path = %path.display(), "Loaded configuration");

    if test {
        config.delivery.dry_run = true;
    }
    if config.delivery.dry_run {
        info!("**TEST MODE ENABLED** - no messages will be sent");
    }

    if config.subscribers.is_empty() {
        anyhow::bail!("No subscribers configured in {}", path.display());
    }

    let text = read_message(message, digest, &config.summarizer).await?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let cancellation = Cancellation::from_signal(shutdown_rx);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, finishing in-flight segments");
                let _ = shutdown_tx.send(Signal::Shutdown);
            }
            Err(e) => error!("Unable to listen for Ctrl-C: {e}"),
        }
    });

    let processor = DeliveryProcessor::new(config.delivery, Arc::new(ConsoleTransport::new()))?;
    let report = processor
        .send_bulk_until(&text, &config.subscribers, &cancellation)
        .await;

    for failure in report.failures() {
        error!(recipient = %failure.recipient, outcome = ?failure.outcome, "Delivery failed");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if report.failed_count > 0 {
        anyhow::bail!(
            "{} of {} deliveries failed",
            report.failed_count,
            report.total_recipients
        );
    }

    Ok(())
}

async fn read_message(
    message: Option<PathBuf>,
    digest: Option<PathBuf>,
    summarizer: &SummarizerConfig,
) -> anyhow::Result<String> {
    if let Some(path) = message {
        return tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read message from {}", path.display()));
    }

    if let Some(path) = digest {
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read digest from {}", path.display()))?;
        let digest: Digest = ron::from_str(&content)
            .with_context(|| format!("Failed to parse digest {}", path.display()))?;
        internal!(
            level = INFO,
            provider = %summarizer.provider,
            model = summarizer.model(),
            "Summarising digest"
        );
        let summarizer = summarizer.build();
        return Ok(compose(&digest, summarizer.as_ref(), chrono::Local::now().date_naive()).await);
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read message from stdin")?;
    Ok(text)
}
