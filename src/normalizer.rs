use crate::model::{PriceBar, RawBar, TimeSeries};
use std::collections::BTreeMap;
use tracing::debug;

fn usable(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Turns provider rows into a `TimeSeries`: drops rows without a date or close,
/// fills missing open/high/low from close, sorts ascending and keeps the last row per date.
pub fn normalize_series(ticker: &str, raw: Vec<RawBar>) -> TimeSeries {
    let ticker = ticker.trim().to_uppercase();
    let total = raw.len();
    let mut by_date: BTreeMap<_, PriceBar> = BTreeMap::new();

    for row in raw {
        let Some(date) = row.date else { continue };
        let Some(close) = usable(row.close) else { continue };
        let bar = PriceBar {
            ticker: ticker.clone(),
            date,
            open: usable(row.open).unwrap_or(close),
            high: usable(row.high).unwrap_or(close),
            low: usable(row.low).unwrap_or(close),
            close,
            adjusted_close: usable(row.adjusted_close),
            volume: row.volume.unwrap_or(0),
        };
        by_date.insert(date, bar);
    }

    let bars: Vec<PriceBar> = by_date.into_values().collect();
    let adjusted = !bars.is_empty() && bars.iter().all(|b| b.adjusted_close.is_some());
    if bars.len() != total {
        debug!("{}: kept {} of {} raw rows", ticker, bars.len(), total);
    }

    TimeSeries { ticker, bars, adjusted }
}

/// Sorts and de-duplicates already-typed bars for one ticker.
pub fn normalize_bars(ticker: &str, bars: Vec<PriceBar>) -> TimeSeries {
    let raw = bars
        .into_iter()
        .map(|b| RawBar {
            date: Some(b.date),
            open: Some(b.open),
            high: Some(b.high),
            low: Some(b.low),
            close: Some(b.close),
            adjusted_close: b.adjusted_close,
            volume: Some(b.volume),
        })
        .collect();
    normalize_series(ticker, raw)
}
