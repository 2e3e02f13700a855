//! Fire-weather product runner.
//!
//! Resolves the latest published Alaska RTMA analysis, computes one product
//! (a grid or a criteria mask), crops it to a named region and prints a JSON
//! summary. The full output can be written to a file for the plotting layer.

mod summary;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use dap_client::DapClient;
use firewx_common::{Clock, FixedClock, RegionTable, SystemClock};
use grid_processor::{FireWxConfig, OpendapSource, Product, ProductService};

use summary::Summary;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "firewx")]
#[command(about = "Compute a fire-weather product from the latest Alaska RTMA analysis")]
struct Args {
    /// Product name, e.g. relative-humidity or hot-dry-windy-gust
    #[arg(short, long)]
    product: String,

    /// Region from regions.yaml
    #[arg(short, long, default_value = "alaska")]
    region: String,

    /// Directory holding firewx.yaml and regions.yaml
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Dataset URL template with {date} and {hour} placeholders
    #[arg(long, env = "FIREWX_BASE_URL")]
    base_url: Option<String>,

    /// How far back from the current cycle to look for a published analysis
    #[arg(long)]
    lookback_hours: Option<u32>,

    /// Resolve as if the current time were this instant (RFC 3339)
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Write the full product (values included) as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Log format
    #[arg(long, value_enum, default_value = "json")]
    log_format: LogFormat,
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the summary
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

/// `firewx.yaml` if present, then environment and CLI overrides.
fn load_config(args: &Args) -> Result<FireWxConfig> {
    let path = args.config_dir.join("firewx.yaml");
    let config = if path.exists() {
        FireWxConfig::load(&path)?
    } else {
        info!(path = %path.display(), "No config file, using defaults");
        FireWxConfig::default()
    };
    let mut config = config.apply_env()?;

    if let Some(url) = &args.base_url {
        config.source.url_template = url.clone();
    }
    if let Some(hours) = args.lookback_hours {
        config.resolver.lookback_cycles = lookback_cycles(hours, config.source.cadence_minutes);
    }
    config.validate()?;
    Ok(config)
}

/// Cycles probed to cover `hours` back from the current cycle, inclusive.
fn lookback_cycles(hours: u32, cadence_minutes: u32) -> u32 {
    hours.saturating_mul(60) / cadence_minutes.max(1) + 1
}

fn load_regions(config_dir: &Path) -> Result<RegionTable> {
    let path = config_dir.join("regions.yaml");
    RegionTable::load(&path).with_context(|| format!("loading regions from {}", path.display()))
}

async fn run(args: Args) -> Result<()> {
    let product: Product = args.product.parse()?;
    let config = load_config(&args)?;
    let regions = load_regions(&args.config_dir)?;
    let bbox = regions.get(&args.region)?;

    info!(
        product = %product,
        region = %args.region,
        url_template = %config.source.url_template,
        lookback_cycles = config.resolver.lookback_cycles,
        "Starting firewx run"
    );

    let client = DapClient::new(config.dap_client_config()).context("building DAP client")?;
    let source = Arc::new(OpendapSource::new(
        client,
        config.source.url_template.clone(),
        config.cadence(),
    ));
    let clock: Arc<dyn Clock> = match args.at {
        Some(at) => Arc::new(FixedClock(at)),
        None => Arc::new(SystemClock),
    };
    let service = ProductService::from_config(&config, source, clock);

    let output = service
        .compute(product)
        .await
        .with_context(|| format!("computing {}", product))?;
    let output = output
        .crop(&bbox)
        .with_context(|| format!("cropping to region {}", args.region))?;

    if let Some(path) = &args.output {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer(std::io::BufWriter::new(file), &output)?;
        info!(path = %path.display(), "Wrote product");
    }

    let summary = Summary::new(product, &args.region, &output);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(cache) = service.fetcher().cache() {
        let stats = cache.stats().await;
        info!(
            entries = stats.entries,
            hits = stats.hits,
            misses = stats.misses,
            "Grid cache"
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = run(args).await {
        let code = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<firewx_common::FireWxError>())
            .map(|fe| fe.code())
            .unwrap_or("error");
        error!(code, error = format!("{:#}", e), "firewx run failed");
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
