// Per-ticker summary statistics and batch-level rankings
use crate::analyzer::market_indicators::{mean, sample_std_dev};
use crate::analyzer::returns::compute_daily_return;
use crate::model::TimeSeries;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Trading days per year used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryStats {
    pub ticker: String,
    pub bars: usize,
    pub start_price: Option<f64>,
    pub end_price: Option<f64>,
    /// Total compounded return from the first to the last bar.
    pub period_return: Option<f64>,
    pub mean_daily_return: Option<f64>,
    pub annualized_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
    /// Annualized return over annualized volatility; absent when volatility is zero.
    pub risk_adjusted_return: Option<f64>,
    pub mean_volatility: Option<f64>,
    pub latest_weekly_return: Option<f64>,
    pub latest_monthly_return: Option<f64>,
}

pub fn compute_summary(series: &TimeSeries) -> SummaryStats {
    let returns: Vec<f64> = compute_daily_return(series).into_iter().flatten().collect();

    let period_return = match (series.bars.first(), series.bars.last()) {
        (Some(first), Some(last)) if series.len() >= 2 && first.return_basis() != 0.0 => {
            Some(last.return_basis() / first.return_basis() - 1.0)
        }
        _ => None,
    };

    let mean_daily_return = mean(&returns);
    let annualized_return = mean_daily_return.map(|m| m * TRADING_DAYS_PER_YEAR);
    let annualized_volatility = sample_std_dev(&returns).map(|s| s * TRADING_DAYS_PER_YEAR.sqrt());
    let risk_adjusted_return = match (annualized_return, annualized_volatility) {
        (Some(r), Some(v)) if v != 0.0 => Some(r / v),
        _ => None,
    };

    SummaryStats {
        ticker: series.ticker.clone(),
        bars: series.len(),
        start_price: series.bars.first().map(|b| b.close),
        end_price: series.bars.last().map(|b| b.close),
        period_return,
        mean_daily_return,
        annualized_return,
        annualized_volatility,
        risk_adjusted_return,
        ..Default::default()
    }
}

/// Most recent date present in every series; the overall latest date when none is shared.
pub fn latest_shared_date(batch: &[TimeSeries]) -> Option<NaiveDate> {
    let mut iter = batch.iter().filter(|s| !s.is_empty());
    let first = iter.next()?;
    let mut shared: BTreeSet<NaiveDate> = first.bars.iter().map(|b| b.date).collect();
    for s in iter {
        let dates: BTreeSet<NaiveDate> = s.bars.iter().map(|b| b.date).collect();
        shared = shared.intersection(&dates).copied().collect();
    }
    shared
        .last()
        .copied()
        .or_else(|| batch.iter().filter_map(|s| s.last_date()).max())
}

/// Ticker with the highest close on `as_of`. Ties go to the ticker appearing last in
/// the batch. Tickers without a bar on that date are ignored.
pub fn compute_best_performer(batch: &[TimeSeries], as_of: NaiveDate) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for series in batch {
        let Ok(idx) = series.bars.binary_search_by_key(&as_of, |b| b.date) else {
            continue;
        };
        let close = series.bars[idx].close;
        match best {
            Some((_, top)) if close < top => {}
            _ => best = Some((series.ticker.as_str(), close)),
        }
    }
    best.map(|(ticker, _)| ticker.to_string())
}

/// Ticker with the highest total period return, same tie rule as `compute_best_performer`.
pub fn compute_best_period_return(summaries: &[SummaryStats]) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for s in summaries {
        let Some(ret) = s.period_return else { continue };
        match best {
            Some((_, top)) if ret < top => {}
            _ => best = Some((s.ticker.as_str(), ret)),
        }
    }
    best.map(|(ticker, _)| ticker.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{date, series};

    #[test]
    fn rising_vs_flat_ticker() {
        let a = series("A", &[100.0, 101.0, 102.0, 103.0, 104.0]);
        let b = series("B", &[50.0, 50.0, 50.0, 50.0, 50.0]);
        let batch = vec![a.clone(), b.clone()];

        let as_of = latest_shared_date(&batch).unwrap();
        assert_eq!(as_of, date(4));
        assert_eq!(compute_best_performer(&batch, as_of).as_deref(), Some("A"));

        let returns = compute_daily_return(&b);
        assert_eq!(returns[0], None);
        assert!(returns[1..].iter().all(|r| *r == Some(0.0)));

        let sb = compute_summary(&b);
        assert_eq!(sb.annualized_volatility, Some(0.0));
        assert_eq!(sb.risk_adjusted_return, None);
        assert_eq!(sb.period_return, Some(0.0));

        let sa = compute_summary(&a);
        assert!((sa.period_return.unwrap() - 0.04).abs() < 1e-12);
        assert!(sa.annualized_volatility.unwrap() > 0.0);
        assert!(sa.risk_adjusted_return.unwrap() > 0.0);
    }

    #[test]
    fn annualization_constants() {
        let s = series("A", &[100.0, 110.0, 99.0]);
        let st = compute_summary(&s);
        let r = [0.1, 99.0 / 110.0 - 1.0];
        let m = (r[0] + r[1]) / 2.0;
        assert!((st.annualized_return.unwrap() - m * 252.0).abs() < 1e-9);
        let sd = (((r[0] - m).powi(2) + (r[1] - m).powi(2)) / 1.0).sqrt();
        assert!((st.annualized_volatility.unwrap() - sd * 252f64.sqrt()).abs() < 1e-9);
        assert_eq!(st.start_price, Some(100.0));
        assert_eq!(st.end_price, Some(99.0));
    }

    #[test]
    fn single_bar_summary_is_mostly_absent() {
        let st = compute_summary(&series("A", &[10.0]));
        assert_eq!(st.bars, 1);
        assert_eq!(st.period_return, None);
        assert_eq!(st.annualized_return, None);
        assert_eq!(st.annualized_volatility, None);
        assert_eq!(st.risk_adjusted_return, None);
    }

    #[test]
    fn ties_go_to_last_ticker() {
        let batch = vec![series("X", &[5.0, 7.0]), series("Y", &[6.0, 7.0])];
        assert_eq!(compute_best_performer(&batch, date(1)).as_deref(), Some("Y"));
        assert_eq!(compute_best_performer(&batch, date(0)).as_deref(), Some("Y"));
        assert_eq!(compute_best_performer(&batch, date(9)), None);
    }

    #[test]
    fn shared_date_falls_back_to_latest() {
        let mut late = series("L", &[1.0, 2.0]);
        for b in &mut late.bars {
            b.date = b.date + chrono::Duration::days(10);
        }
        let batch = vec![series("E", &[1.0, 2.0, 3.0]), late];
        assert_eq!(latest_shared_date(&batch), Some(date(11)));
        assert_eq!(latest_shared_date(&[]), None);
    }

    #[test]
    fn best_period_return_ranking() {
        let summaries = vec![
            compute_summary(&series("A", &[10.0, 12.0])),
            compute_summary(&series("B", &[10.0, 15.0])),
            compute_summary(&series("C", &[10.0])),
        ];
        assert_eq!(compute_best_period_return(&summaries).as_deref(), Some("B"));
    }
}
