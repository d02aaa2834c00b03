use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::path::PathBuf;

use dripfeed::config::Settings;
use dripfeed::content::GeminiClient;
use dripfeed::pipeline;
use dripfeed::publish::TypefullyClient;

/// Get the default config file path (~/.config/dripfeed/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("dripfeed")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "dripfeed",
    about = "Summarizes yesterday's feed items and schedules them across the day"
)]
struct Args {
    /// Config file path (defaults to ~/.config/dripfeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Build drafts and the run log without publishing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut settings = Settings::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    if args.dry_run {
        settings.dry_run = true;
    }

    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let summarizer = GeminiClient::new(
        client.clone(),
        SecretString::from(settings.gemini_api_key.clone()),
        settings.gemini_model.clone(),
        settings.max_attempts,
    );
    let publisher = TypefullyClient::new(
        client.clone(),
        SecretString::from(settings.typefully_api_key.clone()),
        settings.max_attempts,
    );

    let report = pipeline::run(&client, &settings, &summarizer, &publisher).await?;

    match &report.log_path {
        Some(path) => println!(
            "Scheduled {} post(s) for {}; run log at {}",
            report.drafts.len(),
            report.target_date,
            path.display()
        ),
        None => println!("No items for {}, nothing scheduled.", report.target_date),
    }

    Ok(())
}
