//! Command-line front ends of the two pipelines.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::input::load_identifiers;
use crate::output::{ArtifactWriter, write_json_atomic};
use crate::runner::{DiscoveryPipeline, ProfilePipeline, RunStatus, Runner};
use crate::search::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DiscoveryRecord};
use crate::{EtfError, JustEtfClient};

const DEFAULT_BASE_URL: &str = "https://www.justetf.com";

/// Fetch justETF profile pages for a list of ISINs and store one JSON file per fund.
#[derive(Debug, Parser)]
#[command(name = "justetf-profiles", version, about)]
pub struct ProfileArgs {
    /// JSON file holding an array of ISIN strings.
    pub input_path: PathBuf,

    /// Directory receiving `<ISIN>.json` and `errors.json`.
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Seconds to wait between two ISINs.
    #[arg(long, default_value = "0.8", value_parser = parse_seconds)]
    pub delay: Duration,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "30", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Save every raw response body into this directory.
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Site root the pages are fetched from.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,
}

/// Resolve ticker symbols to the ISINs justETF lists for them.
#[derive(Debug, Parser)]
#[command(name = "justetf-discover", version, about)]
pub struct DiscoveryArgs {
    /// JSON file holding an array of ticker strings.
    pub tickers_path: PathBuf,

    /// Output file for the discovered (ticker, ISIN, name) rows.
    #[arg(long, default_value = "ticker_isin_discovery.json")]
    pub output: PathBuf,

    /// Seconds to wait between two tickers.
    #[arg(long, default_value = "1.0", value_parser = parse_seconds)]
    pub delay: Duration,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "30", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Rows requested per results page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: u32,

    /// Maximum number of results pages per ticker.
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// Output file for tickers that failed.
    #[arg(long, default_value = "ticker_isin_discovery_errors.json")]
    pub errors_output: PathBuf,

    /// Save every raw response body into this directory.
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Site root the pages are fetched from.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{s}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("`{s}`: {e}"))
}

/// Installs a stderr fmt subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_client(
    base_url: &Url,
    timeout: Duration,
    debug_dir: Option<&PathBuf>,
) -> Result<JustEtfClient, EtfError> {
    let mut builder = JustEtfClient::builder()
        .base_host(base_url.clone())
        .timeout(timeout)
        .connect_timeout(timeout);
    if let Some(dir) = debug_dir {
        builder = builder.debug_dir(dir);
    }
    builder.build()
}

/// Runs the ISIN to profile pipeline.
pub async fn run_profiles(args: &ProfileArgs) -> RunStatus {
    let isins = match load_identifiers(&args.input_path) {
        Ok(ids) => ids,
        Err(e) => {
            error!("{e}");
            return RunStatus::InputError;
        }
    };
    if isins.is_empty() {
        warn!("no ISIN to process");
        return RunStatus::Success;
    }
    let client = match build_client(&args.base_url, args.timeout, args.debug_dir.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            error!("cannot set up HTTP client: {e}");
            return RunStatus::InputError;
        }
    };

    let mut pipeline = ProfilePipeline::new(client, ArtifactWriter::new(&args.output_dir));
    let result = Runner::new(args.delay).run(&mut pipeline, &isins).await;

    info!(
        ok = result.successes.len(),
        failed = result.errors.len(),
        "profiles done"
    );
    if !result.errors.is_empty() {
        match pipeline.writer().write_errors(&result.errors) {
            Ok(path) => warn!("errors written to {}", path.display()),
            Err(e) => error!("{e}"),
        }
    }
    result.status()
}

/// Runs the ticker to ISIN discovery pipeline.
pub async fn run_discovery(args: &DiscoveryArgs) -> RunStatus {
    let tickers = match load_identifiers(&args.tickers_path) {
        Ok(ids) => ids,
        Err(e) => {
            error!("{e}");
            return RunStatus::InputError;
        }
    };
    if tickers.is_empty() {
        warn!("no ticker to process");
        return RunStatus::Success;
    }
    let client = match build_client(&args.base_url, args.timeout, args.debug_dir.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            error!("cannot set up HTTP client: {e}");
            return RunStatus::InputError;
        }
    };

    let mut pipeline = DiscoveryPipeline::new(client)
        .page_size(args.page_size)
        .max_pages(args.max_pages);
    let result = Runner::new(args.delay).run(&mut pipeline, &tickers).await;

    let records: Vec<DiscoveryRecord> = result
        .successes
        .iter()
        .flat_map(|(_, rows)| rows.iter().cloned())
        .collect();
    info!(
        records = records.len(),
        failed = result.errors.len(),
        "discovery done"
    );

    let mut status = result.status();
    match write_json_atomic(&args.output, &records) {
        Ok(()) => info!("results written to {}", args.output.display()),
        Err(e) => {
            error!("{e}");
            status = RunStatus::PartialFailure;
        }
    }
    if !result.errors.is_empty() {
        match write_json_atomic(&args.errors_output, &result.errors) {
            Ok(()) => warn!("errors written to {}", args.errors_output.display()),
            Err(e) => error!("{e}"),
        }
    }
    status
}
