// Entry point for the daily arXiv digest

mod config;
mod job;
mod scheduler;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{DigestConfig, Secrets};
use crate::job::DigestJob;

#[derive(Parser, Debug)]
#[command(name = "arxiv-digest")]
#[command(about = "Fetch, rank and summarize new arXiv papers, then deliver a digest")]
pub struct Cli {
    /// Run once and exit instead of scheduling
    #[arg(long)]
    pub once: bool,

    /// Daily run time, HH:MM (UTC)
    #[arg(long)]
    pub time: Option<String>,

    /// Fetch papers submitted in the last N days
    #[arg(long)]
    pub days: Option<u32>,

    /// Number of papers to summarize and deliver
    #[arg(long)]
    pub top: Option<usize>,

    /// arXiv categories, e.g. cs.AI cs.LG
    #[arg(long, num_args = 1..)]
    pub categories: Option<Vec<String>>,

    /// TOML config file (default: ./digest.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for Markdown reports
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,curation=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = DigestConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    config.validate()?;
    let secrets = Secrets::from_env();

    tracing::info!(
        categories = ?config.aggregator.categories,
        top_n = config.aggregator.top_n,
        lookback_days = config.aggregator.lookback_days,
        relevance_filter = config.aggregator.interests().is_some(),
        openai = secrets.has_openai_key,
        telegram = secrets.has_telegram(),
        s2_api_key = secrets.s2_api_key.is_some(),
        "Starting arXiv digest"
    );

    let job = DigestJob::from_config(&config, &secrets)
        .await
        .context("Failed to set up digest")?;

    if cli.once {
        job.run_once().await?;
        return Ok(());
    }

    scheduler::run_daily(Arc::new(job), &config.schedule).await
}
