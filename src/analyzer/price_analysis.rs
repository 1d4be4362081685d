use crate::analyzer::correlation::{compute_correlation_matrix, CorrelationMatrix};
use crate::analyzer::market_indicators::{compute_moving_average, compute_rolling_volatility, last_present, mean};
use crate::analyzer::returns::{compute_daily_return, compute_rolling_return};
use crate::analyzer::summary::{
    compute_best_performer, compute_best_period_return, compute_summary, latest_shared_date, SummaryStats,
};
use crate::config::AnalyticsConfig;
use crate::model::{PriceBar, TimeSeries};
use crate::utils::round_to;
use chrono::NaiveDate;

/// Trait defining the interface for the analytics engine.
pub trait Analyzer {
    /// Derived columns and summary statistics for one ticker.
    fn analyze_series(&self, series: &TimeSeries) -> TickerAnalysis;
    /// Full analysis of a batch. Batch order decides best-performer ties.
    fn analyze(&self, batch: &[TimeSeries]) -> AnalysisReport;
}

/// Names and windows of the configured derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub weekly_window: usize,
    pub monthly_window: usize,
    pub ma_windows: Vec<usize>,
    pub volatility_window: usize,
}

impl ColumnSpec {
    pub const BASE_HEADERS: [&'static str; 9] = [
        "ticker",
        "date",
        "open",
        "high",
        "low",
        "close",
        "adjusted_close",
        "volume",
        "pct_change",
    ];

    pub fn from_config(cfg: &AnalyticsConfig) -> Self {
        Self {
            weekly_window: cfg.weekly_window,
            monthly_window: cfg.monthly_window,
            ma_windows: cfg.ma_windows.clone(),
            volatility_window: cfg.volatility_window,
        }
    }

    /// Headers of the derived columns, in export order.
    pub fn derived_headers(&self) -> Vec<String> {
        let mut headers = vec![
            "daily_return".to_string(),
            format!("weekly_return_{}", self.weekly_window),
            format!("monthly_return_{}", self.monthly_window),
        ];
        headers.extend(self.ma_windows.iter().map(|w| format!("ma_{}", w)));
        headers.push(format!("volatility_{}", self.volatility_window));
        headers
    }

    pub fn headers(&self) -> Vec<String> {
        Self::BASE_HEADERS
            .iter()
            .map(|h| h.to_string())
            .chain(self.derived_headers())
            .collect()
    }
}

/// A price bar augmented with its derived analytics.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub bar: PriceBar,
    pub daily_return: Option<f64>,
    pub pct_change: Option<f64>,
    pub weekly_return: Option<f64>,
    pub monthly_return: Option<f64>,
    /// One entry per `ColumnSpec::ma_windows`, same order.
    pub moving_averages: Vec<Option<f64>>,
    pub volatility: Option<f64>,
}

impl DerivedRow {
    /// Values of the derived columns, aligned with `ColumnSpec::derived_headers`.
    pub fn derived_values(&self) -> Vec<Option<f64>> {
        let mut values = vec![self.daily_return, self.weekly_return, self.monthly_return];
        values.extend(self.moving_averages.iter().copied());
        values.push(self.volatility);
        values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerAnalysis {
    pub ticker: String,
    /// False when raw close stood in for a missing adjusted close.
    pub adjusted: bool,
    pub rows: Vec<DerivedRow>,
    pub summary: SummaryStats,
}

/// Immutable result of one analysis run. Rendering only reads from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub columns: ColumnSpec,
    pub tickers: Vec<TickerAnalysis>,
    pub as_of: Option<NaiveDate>,
    /// Highest close on `as_of`.
    pub best_performer: Option<String>,
    /// Highest total return over the range.
    pub best_period_return: Option<String>,
    pub correlation: CorrelationMatrix,
}

impl AnalysisReport {
    pub fn ticker(&self, ticker: &str) -> Option<&TickerAnalysis> {
        self.tickers.iter().find(|t| t.ticker == ticker)
    }

    /// All rows, grouped by ticker in batch order.
    pub fn rows(&self) -> impl Iterator<Item = &DerivedRow> {
        self.tickers.iter().flat_map(|t| t.rows.iter())
    }
}

/// Implementation of the analytics engine.
pub struct AnalyzerImpl {
    config: AnalyticsConfig,
}

impl AnalyzerImpl {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }
}

impl Analyzer for AnalyzerImpl {
    fn analyze_series(&self, series: &TimeSeries) -> TickerAnalysis {
        let cfg = &self.config;
        let returns = compute_daily_return(series);
        let weekly = compute_rolling_return(&returns, cfg.weekly_window, cfg.return_policy);
        let monthly = compute_rolling_return(&returns, cfg.monthly_window, cfg.return_policy);
        let volatility = compute_rolling_volatility(&returns, cfg.volatility_window);
        let closes = series.closes();
        let moving_averages: Vec<Vec<Option<f64>>> = cfg
            .ma_windows
            .iter()
            .map(|&w| compute_moving_average(&closes, w))
            .collect();

        let rows = series
            .bars
            .iter()
            .enumerate()
            .map(|(i, bar)| DerivedRow {
                bar: bar.clone(),
                daily_return: returns[i],
                pct_change: returns[i].map(|r| round_to(r * 100.0, cfg.pct_precision)),
                weekly_return: weekly[i],
                monthly_return: monthly[i],
                moving_averages: moving_averages.iter().map(|ma| ma[i]).collect(),
                volatility: volatility[i],
            })
            .collect();

        let present_vol: Vec<f64> = volatility.iter().flatten().copied().collect();
        let summary = SummaryStats {
            mean_volatility: mean(&present_vol),
            latest_weekly_return: last_present(&weekly),
            latest_monthly_return: last_present(&monthly),
            ..compute_summary(series)
        };

        TickerAnalysis {
            ticker: series.ticker.clone(),
            adjusted: series.adjusted,
            rows,
            summary,
        }
    }

    fn analyze(&self, batch: &[TimeSeries]) -> AnalysisReport {
        let tickers: Vec<TickerAnalysis> = batch.iter().map(|s| self.analyze_series(s)).collect();
        let as_of = latest_shared_date(batch);
        let best_performer = as_of.and_then(|d| compute_best_performer(batch, d));
        let summaries: Vec<SummaryStats> = tickers.iter().map(|t| t.summary.clone()).collect();

        AnalysisReport {
            columns: ColumnSpec::from_config(&self.config),
            best_period_return: compute_best_period_return(&summaries),
            correlation: compute_correlation_matrix(batch),
            tickers,
            as_of,
            best_performer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReturnPolicy;
    use crate::model::fixtures::{date, series};

    fn small_config() -> AnalyticsConfig {
        AnalyticsConfig {
            pct_precision: 2,
            ma_windows: vec![2, 3],
            volatility_window: 3,
            weekly_window: 2,
            monthly_window: 4,
            return_policy: ReturnPolicy::Compound,
        }
    }

    #[test]
    fn two_ticker_scenario() {
        let engine = AnalyzerImpl::new(small_config());
        let batch = vec![
            series("A", &[100.0, 101.0, 102.0, 103.0, 104.0]),
            series("B", &[50.0, 50.0, 50.0, 50.0, 50.0]),
        ];
        let report = engine.analyze(&batch);
        assert_eq!(report.as_of, Some(date(4)));
        assert_eq!(report.best_performer.as_deref(), Some("A"));
        assert_eq!(report.best_period_return.as_deref(), Some("A"));

        let b = report.ticker("B").unwrap();
        assert_eq!(b.summary.annualized_volatility, Some(0.0));
        assert_eq!(b.summary.risk_adjusted_return, None);
        assert!(b.rows[1..].iter().all(|r| r.daily_return == Some(0.0)));
        assert_eq!(report.correlation.get("A", "A"), Some(1.0));
        assert_eq!(report.correlation.get("A", "B"), None);
        assert_eq!(report.rows().count(), 10);
    }

    #[test]
    fn derived_columns_line_up_with_headers() {
        let engine = AnalyzerImpl::new(small_config());
        let t = engine.analyze_series(&series("A", &[10.0, 11.0, 12.1, 13.31, 14.641]));
        let spec = ColumnSpec::from_config(&small_config());
        assert_eq!(
            spec.derived_headers(),
            vec!["daily_return", "weekly_return_2", "monthly_return_4", "ma_2", "ma_3", "volatility_3"]
        );
        for row in &t.rows {
            assert_eq!(row.derived_values().len(), spec.derived_headers().len());
        }
        assert_eq!(spec.headers().len(), 9 + 6);

        let last = t.rows.last().unwrap();
        assert_eq!(last.pct_change, Some(10.0));
        assert!((last.weekly_return.unwrap() - 0.21).abs() < 1e-9);
        assert!((last.monthly_return.unwrap() - (1.1f64.powi(4) - 1.0)).abs() < 1e-9);
        assert_eq!(t.rows[0].moving_averages, vec![None, None]);
        assert!((t.summary.latest_weekly_return.unwrap() - 0.21).abs() < 1e-9);
    }

    #[test]
    fn pct_change_precision_is_configurable() {
        let mut cfg = small_config();
        cfg.pct_precision = 4;
        let t = AnalyzerImpl::new(cfg).analyze_series(&series("A", &[3.0, 4.0]));
        assert_eq!(t.rows[1].pct_change, Some(33.3333));
    }

    #[test]
    fn single_bar_ticker_has_only_absent_fields() {
        let engine = AnalyzerImpl::new(small_config());
        let t = engine.analyze_series(&series("ONE", &[42.0]));
        assert_eq!(t.rows.len(), 1);
        let row = &t.rows[0];
        assert_eq!(row.daily_return, None);
        assert_eq!(row.pct_change, None);
        assert_eq!(row.weekly_return, None);
        assert_eq!(row.monthly_return, None);
        assert_eq!(row.volatility, None);
        assert!(row.moving_averages.iter().all(Option::is_none));
        assert_eq!(t.summary.mean_volatility, None);
    }

    #[test]
    fn mean_policy_differs_from_compound() {
        let closes = [10.0, 11.0, 12.5, 11.0];
        let compound = AnalyzerImpl::new(small_config()).analyze_series(&series("A", &closes));
        let mut cfg = small_config();
        cfg.return_policy = ReturnPolicy::Mean;
        let mean = AnalyzerImpl::new(cfg).analyze_series(&series("A", &closes));
        assert_ne!(compound.rows[3].weekly_return, mean.rows[3].weekly_return);
    }
}
