// Rolling-window indicators over price and return series

/// Applies `f` to every trailing window of `window` values. Positions whose window is
/// incomplete or contains a missing value yield `None`.
pub fn rolling_apply<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    let mut buf = Vec::with_capacity(window);
    for (i, w) in values.windows(window).enumerate() {
        if w.iter().all(Option::is_some) {
            buf.clear();
            buf.extend(w.iter().flatten().copied());
            out[i + window - 1] = f(&buf);
        }
    }
    out
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Needs at least two points.
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let avg = mean(data)?;
    let variance = data.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Simple moving average of closing prices over the trailing `window` bars.
pub fn compute_moving_average(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if window == 0 || closes.len() < window {
        return out;
    }
    for (i, w) in closes.windows(window).enumerate() {
        out[i + window - 1] = Some(w.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Rolling sample standard deviation of daily returns.
pub fn compute_rolling_volatility(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(returns, window, sample_std_dev)
}

/// Pearson correlation coefficient between two equally long slices.
/// Returns None if slices differ in length, have fewer than two points or zero variance.
pub fn compute_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let numerator: f64 = x.iter().zip(y.iter()).map(|(xi, yi)| (xi - mean_x) * (yi - mean_y)).sum();
    let denominator_x: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    let denominator_y: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let denominator = (denominator_x * denominator_y).sqrt();
    if denominator == 0.0 {
        None
    } else {
        Some((numerator / denominator).clamp(-1.0, 1.0))
    }
}

/// Last present value of a column.
pub fn last_present(values: &[Option<f64>]) -> Option<f64> {
    values.iter().rev().flatten().next().copied()
}
