pub mod command_handler;
pub mod listener;
pub mod render;
pub mod session;

use crate::analyzer::{AnalysisReport, Analyzer, AnalyzerImpl};
use crate::config::{AnalyticsConfig, AppConfig};
use crate::fetcher::{MarketDataSource, NewsSource};
use crate::model::{FetchRequest, PipelineError};
use crate::pipeline::{self, BatchOutcome};
use session::{Action, Session, Stage, TransitionError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Rows shown per ticker in the price tables.
pub const TABLE_TAIL: usize = 15;

/// Interactive front end: owns the session and the data sources.
pub struct Dashboard {
    pub config: Arc<AppConfig>,
    market: Arc<dyn MarketDataSource>,
    news: Option<Arc<dyn NewsSource>>,
    analytics: AnalyticsConfig,
    articles_per_ticker: usize,
    session: Session,
    pub start_time: Instant,
}

impl Dashboard {
    pub fn new(
        config: Arc<AppConfig>,
        market: Arc<dyn MarketDataSource>,
        news: Option<Arc<dyn NewsSource>>,
    ) -> Self {
        Self {
            analytics: config.analytics.clone(),
            articles_per_ticker: config.news.articles_per_ticker,
            config,
            market,
            news,
            session: Session::new(),
            start_time: Instant::now(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    fn analyze(&self, outcome: &BatchOutcome) -> AnalysisReport {
        AnalyzerImpl::new(self.analytics.clone()).analyze(&outcome.batch)
    }

    /// Fetch → compute. On failure nothing of the previous result stays visible.
    pub async fn fetch(&mut self, request: FetchRequest) -> Result<Stage, PipelineError> {
        info!("🔄 Fetch requested: {:?} {} .. {}", request.tickers, request.start, request.end);
        match pipeline::fetch_batch(self.market.as_ref(), request, self.config.concurrent_fetch).await {
            Ok(outcome) => {
                let report = self.analyze(&outcome);
                // FetchRequested is valid from every stage
                Ok(self.session.load(outcome, report).unwrap_or(Stage::DataFetched))
            }
            Err(e) => {
                warn!("Fetch failed: {}", e);
                if matches!(e, PipelineError::NoUsableData) {
                    self.session.clear();
                }
                Err(e)
            }
        }
    }

    pub fn show_analysis(&mut self) -> Result<&AnalysisReport, TransitionError> {
        self.session.apply(Action::AnalysisRequested)?;
        self.session.report().ok_or(TransitionError {
            from: Stage::Idle,
            action: Action::AnalysisRequested,
        })
    }

    pub fn reset(&mut self) {
        match self.session.apply(Action::ResetRequested) {
            Ok(stage) => info!("🔄 Session reset ({:?})", stage),
            Err(e) => warn!("Reset refused: {}", e),
        }
        self.analytics = self.config.analytics.clone();
    }

    /// Replaces the moving-average windows and recomputes the current report.
    pub fn set_ma_windows(&mut self, windows: Vec<usize>) {
        self.analytics.ma_windows = windows;
        if let Some(outcome) = self.session.outcome() {
            let report = self.analyze(outcome);
            self.session.replace_report(report);
        }
    }

    pub fn set_articles_per_ticker(&mut self, n: usize) {
        self.articles_per_ticker = n;
    }

    pub fn analytics(&self) -> &AnalyticsConfig {
        &self.analytics
    }

    /// Loads news for the tickers of the current batch.
    pub async fn load_news(&mut self) -> Option<&[pipeline::NewsFeed]> {
        let source = self.news.clone()?;
        let tickers: Vec<String> = self
            .session
            .report()?
            .tickers
            .iter()
            .map(|t| t.ticker.clone())
            .collect();
        let feeds = pipeline::fetch_news(source.as_ref(), &tickers, self.articles_per_ticker).await;
        self.session.set_news(feeds);
        Some(self.session.news())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::date;
    use crate::pipeline::mocks::StaticSource;

    #[tokio::test]
    async fn reset_from_analysis_returns_to_idle() {
        let mut config = AppConfig::default();
        config.analytics.ma_windows = vec![2];
        let source = StaticSource::new(&[("AAPL", &[1.0, 2.0, 3.0][..])]);
        let mut d = Dashboard::new(Arc::new(config), Arc::new(source), None);

        let request = FetchRequest { tickers: vec!["AAPL".into()], start: date(0), end: date(3) };
        assert_eq!(d.fetch(request).await.unwrap(), Stage::DataFetched);
        assert!(d.show_analysis().is_ok());
        d.set_ma_windows(vec![3]);
        assert_eq!(d.stage(), Stage::AnalysisShown);

        d.reset();
        assert_eq!(d.stage(), Stage::Idle);
        assert!(d.session().report().is_none());
        assert_eq!(d.analytics().ma_windows, vec![2]);
        assert!(d.show_analysis().is_err());
    }
}
