use crate::fetcher::traits::MarketDataSource;
use crate::model::{RetrievalError, TimeSeries};
use crate::normalizer::normalize_series;
use crate::parser::{ChartParser, Parser};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Daily bars from the public Yahoo Finance chart endpoint.
pub struct YahooChartSource {
    client: Client,
    base_url: String,
    parser: ChartParser,
}

impl YahooChartSource {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            parser: ChartParser::new(),
        }
    }

    fn build_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), ticker)
    }

    /// Unix-second bounds. The end date is exclusive.
    fn period(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
        let to_ts = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp()).unwrap_or(0);
        (to_ts(start), to_ts(end))
    }
}

#[async_trait::async_trait]
impl MarketDataSource for YahooChartSource {
    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, RetrievalError> {
        let url = self.build_url(ticker);
        let (period1, period2) = Self::period(start, end);
        debug!("GET {} [{} .. {})", url, start, end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| if e.is_timeout() { RetrievalError::Timeout } else { RetrievalError::Http(e) })?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(RetrievalError::Empty(ticker.to_string()));
        }
        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(RetrievalError::InvalidResponse { status: status.as_u16(), body: snippet });
        }

        let raw = self.parser.parse(&body)?;
        let series = normalize_series(ticker, raw);
        if series.is_empty() {
            return Err(RetrievalError::Empty(ticker.to_string()));
        }
        info!("📈 {}: {} bars ({} .. {})", series.ticker, series.len(), start, end);
        Ok(series)
    }
}
