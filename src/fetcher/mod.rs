pub mod cache;
pub mod market;
pub mod news;
pub mod traits;

pub use cache::CachedSource;
pub use market::YahooChartSource;
pub use news::YahooRssSource;
pub use traits::{MarketDataSource, NewsSource};

use crate::config::HttpConfig;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client for the remote sources.
pub fn build_client(cfg: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(Duration::from_secs(cfg.timeout_seconds))
        .build()
}
