// Day-over-day and rolling returns
use crate::analyzer::market_indicators::rolling_apply;
use crate::config::ReturnPolicy;
use crate::model::TimeSeries;

/// Fractional change of the return basis (adjusted close, else close) from the previous bar.
/// The first bar has no return; a zero or non-finite prior price yields `None`.
pub fn compute_daily_return(series: &TimeSeries) -> Vec<Option<f64>> {
    debug_assert!(
        series.is_chronological(),
        "series for {} is not strictly ascending by date",
        series.ticker
    );
    let mut out = Vec::with_capacity(series.len());
    if series.is_empty() {
        return out;
    }
    out.push(None);
    for w in series.bars.windows(2) {
        let prev = w[0].return_basis();
        let cur = w[1].return_basis();
        let r = if prev != 0.0 && prev.is_finite() && cur.is_finite() {
            Some(cur / prev - 1.0)
        } else {
            None
        };
        out.push(r);
    }
    out
}

/// Compound return over the trailing `window` returns: `Π(1 + r) - 1`.
/// `None` until `window` consecutive present returns end at the position.
pub fn compute_rolling_compound_return(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(returns, window, |w| {
        Some(w.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0)
    })
}

/// Arithmetic mean of the trailing `window` returns.
pub fn compute_rolling_mean_return(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(returns, window, |w| Some(w.iter().sum::<f64>() / w.len() as f64))
}

pub fn compute_rolling_return(returns: &[Option<f64>], window: usize, policy: ReturnPolicy) -> Vec<Option<f64>> {
    match policy {
        ReturnPolicy::Compound => compute_rolling_compound_return(returns, window),
        ReturnPolicy::Mean => compute_rolling_mean_return(returns, window),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::series;

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn daily_return_has_one_value_per_bar() {
        let closes = [100.0, 101.0, 99.5, 102.25, 102.25];
        let s = series("A", &closes);
        let r = compute_daily_return(&s);
        assert_eq!(r.len(), closes.len());
        assert_eq!(r[0], None);
        for i in 1..closes.len() {
            assert_eq!(r[i], Some(closes[i] / closes[i - 1] - 1.0));
        }
    }

    #[test]
    fn daily_return_prefers_adjusted_close() {
        let mut s = series("A", &[100.0, 110.0]);
        s.bars[0].adjusted_close = Some(50.0);
        s.bars[1].adjusted_close = Some(60.0);
        let r = compute_daily_return(&s);
        assert!(close_to(r[1].unwrap(), 0.2));
    }

    #[test]
    fn zero_prior_price_is_absent() {
        let s = series("A", &[0.0, 5.0, 10.0]);
        let r = compute_daily_return(&s);
        assert_eq!(r[1], None);
        assert_eq!(r[2], Some(1.0));
    }

    #[test]
    fn single_bar_and_empty() {
        assert_eq!(compute_daily_return(&series("A", &[42.0])), vec![None]);
        assert!(compute_daily_return(&series("A", &[])).is_empty());
    }

    #[test]
    #[should_panic(expected = "not strictly ascending")]
    #[cfg(debug_assertions)]
    fn non_chronological_series_panics_in_debug() {
        let mut s = series("A", &[1.0, 2.0, 3.0]);
        s.bars.reverse();
        let _ = compute_daily_return(&s);
    }

    #[test]
    fn rolling_compound_is_a_product_not_a_mean() {
        let r = vec![None, Some(0.10), Some(0.20), Some(-0.05), Some(0.10)];
        let out = compute_rolling_compound_return(&r, 2);
        assert_eq!(out.len(), r.len());
        // window ending at 1 still contains the absent first return
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!(close_to(out[2].unwrap(), 1.10 * 1.20 - 1.0));
        assert!(close_to(out[3].unwrap(), 1.20 * 0.95 - 1.0));
        assert!(close_to(out[4].unwrap(), 0.95 * 1.10 - 1.0));

        let mean = compute_rolling_mean_return(&r, 2);
        assert!(close_to(mean[2].unwrap(), 0.15));
        assert!(!close_to(out[2].unwrap(), mean[2].unwrap()));
    }

    #[test]
    fn rolling_return_needs_full_window() {
        let s = series("A", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let r = compute_daily_return(&s);
        let weekly = compute_rolling_return(&r, 5, ReturnPolicy::Compound);
        assert!(weekly[..5].iter().all(Option::is_none));
        // compounding telescopes back to the price ratio
        assert!(close_to(weekly[5].unwrap(), 6.0 / 1.0 - 1.0));

        let monthly = compute_rolling_return(&r, 21, ReturnPolicy::Compound);
        assert!(monthly.iter().all(Option::is_none));
    }
}
