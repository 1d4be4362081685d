mod analyzer;
mod config;
mod dashboard;
mod export;
mod fetcher;
mod model;
mod normalizer;
mod parser;
mod pipeline;
mod sentiment;
mod utils;

use chrono::Utc;
use clap::Parser as ClapParser;
use config::{AppConfig, load_config};
use dashboard::listener::listen_for_commands;
use dashboard::{Dashboard, TABLE_TAIL, render};
use fetcher::{CachedSource, MarketDataSource, NewsSource, YahooChartSource, YahooRssSource, build_client};
use model::{FetchRequest, InputError};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Interactive stock dashboard: prices, returns, moving averages, volatility, correlation and news.
#[derive(Debug, ClapParser)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Comma-separated tickers, e.g. "AAPL, MSFT"
    #[arg(short, long)]
    tickers: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(short, long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), exclusive
    #[arg(short, long)]
    end: Option<String>,

    /// Write the derived dataset to this CSV file
    #[arg(long)]
    export: Option<String>,

    /// Fetch, print the analysis and exit
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn wants_fetch(&self) -> bool {
        self.once || self.tickers.is_some() || self.start.is_some() || self.end.is_some()
    }

    /// Builds the initial request, falling back to the configured tickers and lookback.
    fn request(&self, config: &AppConfig) -> Result<FetchRequest, InputError> {
        let end = match &self.end {
            Some(raw) => utils::parse_date(raw)?,
            None => Utc::now().date_naive(),
        };
        let start = match &self.start {
            Some(raw) => utils::parse_date(raw)?,
            None => utils::lookback_start(end, config.lookback_days)?,
        };
        let tickers = self.tickers.as_deref().unwrap_or(&config.default_tickers);
        utils::build_request(tickers, start, end)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        error!("😱 Panic occurred: {}", panic_info);
    }));

    let cli = Cli::parse();

    let config: Arc<AppConfig> = match load_config(&cli.config) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match build_client(&config.http) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let market: Arc<dyn MarketDataSource> = Arc::new(CachedSource::new(YahooChartSource::new(client.clone())));
    let news: Option<Arc<dyn NewsSource>> = if config.news.enabled {
        match YahooRssSource::new(client) {
            Ok(source) => Some(Arc::new(source)),
            Err(e) => {
                warn!("News disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    let mut dashboard = Dashboard::new(config.clone(), market, news);
    info!("🚀 stock-scope started");

    if cli.wants_fetch() {
        let request = match cli.request(&config) {
            Ok(r) => r,
            Err(e) => {
                error!("Invalid input: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = dashboard.fetch(request).await {
            error!("Fetch failed: {}", e);
            if cli.once {
                return ExitCode::FAILURE;
            }
        } else if let (Some(outcome), Some(report)) = (dashboard.session().outcome(), dashboard.session().report()) {
            println!("{}", render::render_prices(outcome, report, TABLE_TAIL));
        }
    }

    if cli.once {
        if let Err(e) = dashboard.show_analysis() {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
        if let (Some(outcome), Some(report)) = (dashboard.session().outcome(), dashboard.session().report()) {
            println!("{}", render::render_analysis(outcome, report));
        }
        if let (Some(path), Some(report)) = (&cli.export, dashboard.session().report()) {
            if let Err(e) = export::export_to_file(report, path) {
                error!("Export failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    if cli.export.is_some() {
        warn!("--export only applies with --once; use the `export` command instead");
    }
    listen_for_commands(&mut dashboard).await;
    info!("👋 stock-scope stopped");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("stock-scope").chain(args.iter().copied()))
    }

    #[test]
    fn request_defaults_come_from_config() {
        let c = cli(&[]);
        assert!(!c.wants_fetch());
        let req = c.request(&AppConfig::default()).unwrap();
        assert_eq!(req.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!((req.end - req.start).num_days(), 90);
    }

    #[test]
    fn explicit_range_and_tickers() {
        let c = cli(&["--tickers", "tsla, nvda", "--start", "2024-01-01", "--end", "2024-03-01", "--once"]);
        assert!(c.wants_fetch());
        let req = c.request(&AppConfig::default()).unwrap();
        assert_eq!(req.tickers, vec!["TSLA", "NVDA"]);
        assert_eq!(req.start.to_string(), "2024-01-01");
    }

    #[test]
    fn oversized_lookback_is_an_input_error() {
        let mut cfg = AppConfig::default();
        cfg.lookback_days = 9_000_000_000_000;
        assert!(matches!(
            cli(&[]).request(&cfg),
            Err(InputError::LookbackOutOfRange { .. })
        ));
        // an explicit start date does not need the lookback
        let c = cli(&["--start", "2024-01-01", "--end", "2024-02-01"]);
        assert!(c.request(&cfg).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let c = cli(&["--start", "2024-03-01", "--end", "2024-01-01"]);
        assert!(matches!(
            c.request(&AppConfig::default()),
            Err(InputError::InvertedRange { .. })
        ));
    }
}
