use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xmltv_grabber::{
    config::Config,
    models::load_channel_sources,
    normalizer::Normalizer,
    pipeline::GuideOrchestrator,
    sources::{ProviderFactory, ProviderKind},
    utils::time::{listing_window, local_today},
};

#[derive(Parser)]
#[command(name = "xmltv-grabber")]
#[command(version)]
#[command(about = "Fetch TV listings from an EPG provider and write an XMLTV guide")]
#[command(long_about = None)]
struct Cli {
    /// Listing provider
    #[arg(value_enum, required_unless_present = "print_default_config")]
    provider: Option<ProviderKind>,

    /// Channel file: JSON array of channel descriptors or an XML channel list
    #[arg(default_value = "channels.json")]
    input: PathBuf,

    /// Output XMLTV file (overrides config; defaults per provider)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Number of days to fetch, starting today (overrides config)
    #[arg(long, value_name = "N")]
    days: Option<u32>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("xmltv_grabber={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.print_default_config {
        print!("{}", Config::default_toml()?);
        return Ok(());
    }

    run(cli).await.inspect_err(|e| error!("{e:#}"))
}

async fn run(cli: Cli) -> Result<()> {
    let kind = cli.provider.context("a provider is required")?;
    info!("Starting xmltv-grabber v{} ({})", env!("CARGO_PKG_VERSION"), kind);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(days) = cli.days {
        config.window.days = days;
    }
    if config.window.days == 0 {
        bail!("Configuration error: window.days must be at least 1");
    }

    let sources = load_channel_sources(&cli.input)?;
    info!("Loaded {} channel(s) from {}", sources.len(), cli.input.display());
    if sources.is_empty() {
        warn!("No usable channels in {}, output file not created", cli.input.display());
        return Ok(());
    }

    let provider = ProviderFactory::create_provider(kind, &config)?;
    let source_info = provider.source_info().clone();
    let window = listing_window(local_today(), config.window.days);

    let orchestrator = GuideOrchestrator::new(provider, Normalizer::new(&config.normalize), window);
    let output = orchestrator.run(&sources).await;

    let output_path = cli
        .output
        .or_else(|| config.output.path.clone())
        .unwrap_or_else(|| PathBuf::from(kind.default_output()));

    let document = output
        .into_document(source_info)
        .with_doctype(config.output.doctype);
    document
        .write_to_path(&output_path)
        .await
        .with_context(|| format!("Failed to write XMLTV guide to {}", output_path.display()))?;

    info!(
        "Success! EPG data saved to {} (channels={}, programs={})",
        output_path.display(),
        document.channels.len(),
        document.programs.len()
    );
    Ok(())
}
