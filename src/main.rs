use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use homework_bot::config;
use homework_bot::notifier::TelegramNotifier;
use homework_bot::poller::Poller;
use homework_bot::practicum::PracticumClient;

#[derive(Debug, Parser)]
#[command(author, version, about = "Forward homework review status changes to Telegram")]
struct Args {
    /// Path to YAML settings file (defaults to ./config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    dotenvy::dotenv().ok();
    let cfg = config::load(args.config.as_deref(), config::env_lookup)
        .context("failed to load configuration")?;

    let api = PracticumClient::from_config(&cfg)?;
    let notifier = TelegramNotifier::from_config(&cfg);
    let mut poller = Poller::new(api, notifier, cfg.poll_interval());

    info!("starting homework bot");
    tokio::select! {
        _ = poller.run() => {}
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for ctrl-c")?;
            info!("shutting down");
        }
    }
    Ok(())
}
