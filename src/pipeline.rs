// Fetch orchestration: validation, per-ticker isolated retrieval, warnings
use crate::fetcher::{MarketDataSource, NewsSource};
use crate::normalizer::normalize_bars;
use crate::model::{Article, FetchRequest, PipelineError, RetrievalError, TimeSeries};
use futures::future::join_all;
use std::fmt;
use tracing::{info, warn};

/// A ticker-level problem that did not stop the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchWarning {
    pub ticker: String,
    pub message: String,
}

impl fmt::Display for FetchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ticker, self.message)
    }
}

/// Tickers that survived retrieval, in request order, plus what went wrong with the rest.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub request: FetchRequest,
    pub batch: Vec<TimeSeries>,
    pub warnings: Vec<FetchWarning>,
}

/// News result for one ticker. A failed feed is kept as its error message.
#[derive(Debug, Clone)]
pub struct NewsFeed {
    pub ticker: String,
    pub articles: Result<Vec<Article>, String>,
}

async fn fetch_one(
    source: &dyn MarketDataSource,
    ticker: &str,
    request: &FetchRequest,
) -> Result<TimeSeries, RetrievalError> {
    info!("Fetching {}...", ticker);
    source.fetch(ticker, request.start, request.end).await
}

/// Fetches every ticker of the request. Failures become warnings; only a batch with
/// no usable ticker at all is an error.
pub async fn fetch_batch(
    source: &dyn MarketDataSource,
    request: FetchRequest,
    concurrent: bool,
) -> Result<BatchOutcome, PipelineError> {
    let results: Vec<Result<TimeSeries, RetrievalError>> = if concurrent {
        let tasks: Vec<_> = request
            .tickers
            .iter()
            .map(|t| fetch_one(source, t, &request))
            .collect();
        join_all(tasks).await
    } else {
        let mut out = Vec::with_capacity(request.tickers.len());
        for t in &request.tickers {
            out.push(fetch_one(source, t, &request).await);
        }
        out
    };

    let mut batch = Vec::new();
    let mut warnings = Vec::new();
    for (ticker, result) in request.tickers.iter().zip(results) {
        match result {
            Ok(mut series) => {
                if !series.is_chronological() {
                    warn!("{} arrived out of order, re-sorting", ticker);
                    series = normalize_bars(&series.ticker, series.bars);
                }
                if !series.adjusted {
                    warnings.push(FetchWarning {
                        ticker: ticker.clone(),
                        message: "no adjusted close from provider, return figures use raw close".into(),
                    });
                }
                batch.push(series);
            }
            Err(e) => {
                warn!("❌ Dropping {}: {}", ticker, e);
                warnings.push(FetchWarning {
                    ticker: ticker.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    if batch.is_empty() {
        return Err(PipelineError::NoUsableData);
    }
    info!("✅ Loaded {}/{} tickers", batch.len(), request.tickers.len());
    Ok(BatchOutcome { request, batch, warnings })
}

/// Fetches news for each ticker independently.
pub async fn fetch_news(source: &dyn NewsSource, tickers: &[String], max_items: usize) -> Vec<NewsFeed> {
    let tasks = tickers.iter().map(|t| async move {
        let articles = source.fetch_recent(t, max_items).await.map_err(|e| {
            warn!("News for {} failed: {}", t, e);
            e.to_string()
        });
        NewsFeed { ticker: t.clone(), articles }
    });
    join_all(tasks).await
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use crate::model::NewsError;
    use crate::model::fixtures::series;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned series; unknown tickers come back empty.
    pub struct StaticSource {
        pub data: HashMap<String, Vec<f64>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StaticSource {
        pub fn new(entries: &[(&str, &[f64])]) -> Self {
            Self {
                data: entries.iter().map(|(t, c)| (t.to_string(), c.to_vec())).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl MarketDataSource for StaticSource {
        async fn fetch(&self, ticker: &str, _: NaiveDate, _: NaiveDate) -> Result<TimeSeries, RetrievalError> {
            self.calls.lock().unwrap().push(ticker.to_string());
            match self.data.get(ticker) {
                Some(closes) => Ok(series(ticker, closes)),
                None => Err(RetrievalError::Empty(ticker.to_string())),
            }
        }
    }

    pub struct StaticNews;

    #[async_trait::async_trait]
    impl NewsSource for StaticNews {
        async fn fetch_recent(&self, ticker: &str, max_items: usize) -> Result<Vec<Article>, NewsError> {
            if ticker == "FAIL" {
                return Err(NewsError::InvalidResponse(503));
            }
            Ok((0..max_items)
                .map(|i| Article {
                    title: format!("{} headline {}", ticker, i),
                    summary: String::new(),
                    published_at: None,
                    title_sentiment: 0.0,
                    summary_sentiment: 0.0,
                })
                .collect())
        }
    }
}
