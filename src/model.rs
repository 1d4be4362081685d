// Core structs: PriceBar, TimeSeries, Article and the error taxonomy
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One trading day for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: Option<f64>,
    pub volume: u64,
}

impl PriceBar {
    /// Price used for return calculations: adjusted close, or raw close when the
    /// provider supplied no adjustment.
    pub fn return_basis(&self) -> f64 {
        self.adjusted_close.unwrap_or(self.close)
    }
}

/// A bar as delivered by a provider, before normalization. Any price may be missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawBar {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adjusted_close: Option<f64>,
    pub volume: Option<u64>,
}

/// Bars for a single ticker, ascending by date with no duplicate dates.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
    /// True when every bar carried a provider-supplied adjusted close.
    pub adjusted: bool,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn is_chronological(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].date < w[1].date)
    }
}

/// What the user asked for, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A news item with precomputed sentiment for title and summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    pub title_sentiment: f64,
    pub summary_sentiment: f64,
}

/// Rejected before any network or computation work begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("no tickers given")]
    EmptyTickers,
    #[error("invalid ticker symbol: {0:?}")]
    InvalidTicker(String),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("start date {start} must be before end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("cannot look back {days} days from {end}")]
    LookbackOutOfRange { end: NaiveDate, days: i64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("malformed JSON: {0}")]
    Json(String),
    #[error("malformed document: {0}")]
    Document(String),
    #[error("provider reported an error: {0}")]
    Provider(String),
}

/// Per-ticker retrieval failure. Never aborts the batch.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    InvalidResponse { status: u16, body: String },
    #[error("could not decode provider payload: {0}")]
    Parse(#[from] ParserError),
    #[error("no data for {0} in the requested range")]
    Empty(String),
    #[error("request timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("news feed returned status {0}")]
    InvalidResponse(u16),
    #[error("could not parse news feed: {0}")]
    Parse(#[from] ParserError),
    #[error("request timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures that stop a whole fetch request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("no usable data for any of the requested tickers")]
    NoUsableData,
}
