use crate::fetcher::traits::MarketDataSource;
use crate::model::{RetrievalError, TimeSeries};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

type CacheKey = (String, NaiveDate, NaiveDate);

/// Session-lifetime memoization of successful fetches keyed by (ticker, start, end).
/// Failures are not cached, so a retry hits the network again.
pub struct CachedSource<S> {
    inner: S,
    entries: Arc<Mutex<HashMap<CacheKey, TimeSeries>>>,
}

impl<S: MarketDataSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl<S: MarketDataSource> MarketDataSource for CachedSource<S> {
    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, RetrievalError> {
        let key = (ticker.to_string(), start, end);
        if let Some(hit) = self.entries.lock().await.get(&key) {
            debug!("cache hit for {} [{} .. {})", ticker, start, end);
            return Ok(hit.clone());
        }

        // Lock is not held across the network call; concurrent misses for
        // different tickers proceed independently.
        let series = self.inner.fetch(ticker, start, end).await?;
        let mut entries = self.entries.lock().await;
        entries.insert(key, series.clone());
        debug!("cached {} ({} entries)", ticker, entries.len());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{date, series};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MarketDataSource for CountingSource {
        async fn fetch(&self, ticker: &str, _: NaiveDate, _: NaiveDate) -> Result<TimeSeries, RetrievalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if ticker == "NOPE" {
                return Err(RetrievalError::Empty(ticker.to_string()));
            }
            Ok(series(ticker, &[1.0, 2.0]))
        }
    }

    #[tokio::test]
    async fn repeats_are_served_from_memory() {
        let cached = CachedSource::new(CountingSource { calls: AtomicUsize::new(0) });
        let (s, e) = (date(0), date(30));

        cached.fetch("AAPL", s, e).await.unwrap();
        cached.fetch("AAPL", s, e).await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);

        // different range is a different key
        cached.fetch("AAPL", s, date(31)).await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.entries.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cached = CachedSource::new(CountingSource { calls: AtomicUsize::new(0) });
        assert!(cached.fetch("NOPE", date(0), date(5)).await.is_err());
        assert!(cached.fetch("NOPE", date(0), date(5)).await.is_err());
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.entries.lock().await.len(), 0);
    }
}
