use crate::analyzer::market_indicators::{compute_correlation, sample_std_dev};
use crate::analyzer::returns::compute_daily_return;
use crate::model::TimeSeries;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Symmetric matrix of pairwise Pearson correlations of daily returns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.values[i][j]
    }
}

fn returns_by_date(series: &TimeSeries) -> BTreeMap<NaiveDate, f64> {
    series
        .bars
        .iter()
        .zip(compute_daily_return(series))
        .filter_map(|(bar, r)| r.map(|r| (bar.date, r)))
        .collect()
}

/// Pairs up the returns of two tickers on the dates where both are present.
fn pairwise_complete(a: &BTreeMap<NaiveDate, f64>, b: &BTreeMap<NaiveDate, f64>) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .filter_map(|(date, x)| b.get(date).map(|y| (*x, *y)))
        .unzip()
}

pub fn compute_correlation_matrix(batch: &[TimeSeries]) -> CorrelationMatrix {
    let tickers: Vec<String> = batch.iter().map(|s| s.ticker.clone()).collect();
    let returns: Vec<BTreeMap<NaiveDate, f64>> = batch.iter().map(returns_by_date).collect();
    let n = tickers.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        let own: Vec<f64> = returns[i].values().copied().collect();
        values[i][i] = match sample_std_dev(&own) {
            Some(sd) if sd > 0.0 => Some(1.0),
            _ => None,
        };
        for j in (i + 1)..n {
            let (x, y) = pairwise_complete(&returns[i], &returns[j]);
            let c = compute_correlation(&x, &y);
            values[i][j] = c;
            values[j][i] = c;
        }
    }

    CorrelationMatrix { tickers, values }
}
