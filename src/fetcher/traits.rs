use crate::model::{Article, NewsError, RetrievalError, TimeSeries};
use chrono::NaiveDate;

/// Daily OHLCV history for one ticker. An unknown ticker or empty range is an
/// `Err(RetrievalError::Empty)`, never a panic.
#[async_trait::async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, RetrievalError>;
}

/// Recent articles for one ticker, newest first as the feed provides them.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_recent(&self, ticker: &str, max_items: usize) -> Result<Vec<Article>, NewsError>;
}
