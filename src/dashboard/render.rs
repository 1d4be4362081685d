// dashboard/render.rs

use crate::analyzer::{AnalysisReport, TickerAnalysis};
use crate::pipeline::{BatchOutcome, NewsFeed};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write;

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CHART_WIDTH: usize = 60;
const ABSENT: &str = "—";
const SCATTER_WIDTH: usize = 40;
const SCATTER_HEIGHT: usize = 12;

fn num(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", digits, v),
        _ => ABSENT.to_string(),
    }
}

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => ABSENT.to_string(),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// One-line chart of a series, downsampled to `CHART_WIDTH`. Gaps render as spaces.
pub fn sparkline(values: &[Option<f64>]) -> String {
    let present: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        return String::new();
    }
    let lo = present.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = values.len().div_ceil(CHART_WIDTH).max(1);

    values
        .chunks(step)
        .map(|chunk| match chunk.iter().rev().flatten().next() {
            Some(v) if hi > lo => {
                let idx = ((v - lo) / (hi - lo) * (SPARK.len() - 1) as f64).round() as usize;
                SPARK[idx.min(SPARK.len() - 1)]
            }
            Some(_) => SPARK[SPARK.len() / 2],
            None => ' ',
        })
        .collect()
}

/// Merged price table with percentage change, the first stage of the dashboard.
pub fn render_prices(outcome: &BatchOutcome, report: &AnalysisReport, tail: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Stock prices & percentage changes: {} .. {}",
        outcome.request.start, outcome.request.end
    );

    let mut table = new_table();
    table.set_header(vec!["Ticker", "Date", "Open", "High", "Low", "Close", "Adj Close", "% Change", "Volume"]);
    for t in &report.tickers {
        let skip = t.rows.len().saturating_sub(tail);
        for row in t.rows.iter().skip(skip) {
            let b = &row.bar;
            table.add_row(vec![
                b.ticker.clone(),
                b.date.to_string(),
                num(Some(b.open), 2),
                num(Some(b.high), 2),
                num(Some(b.low), 2),
                num(Some(b.close), 2),
                num(b.adjusted_close, 2),
                row.pct_change.map(|p| p.to_string()).unwrap_or_else(|| ABSENT.to_string()),
                b.volume.to_string(),
            ]);
        }
    }
    let _ = writeln!(out, "{table}");

    for w in &outcome.warnings {
        let _ = writeln!(out, "⚠️  {}", w);
    }
    out
}

fn render_summary_table(report: &AnalysisReport) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Ticker",
        "Bars",
        "Start",
        "End",
        "Period return",
        "Avg daily",
        "Ann. return",
        "Ann. vol",
        "Risk adj.",
        "Mean vol",
    ]);
    for t in &report.tickers {
        let s = &t.summary;
        table.add_row(vec![
            t.ticker.clone(),
            s.bars.to_string(),
            num(s.start_price, 2),
            num(s.end_price, 2),
            pct(s.period_return),
            num(s.mean_daily_return, 4),
            pct(s.annualized_return),
            pct(s.annualized_volatility),
            num(s.risk_adjusted_return, 2),
            num(s.mean_volatility, 4),
        ]);
    }
    table
}

/// Headline figures, closing-price charts and the per-ticker summary.
pub fn render_analysis(outcome: &BatchOutcome, report: &AnalysisReport) -> String {
    let mut out = String::new();
    let (start, end) = (outcome.request.start, outcome.request.end);
    let _ = writeln!(out, "Date range: {} → {}", start, end);
    let _ = writeln!(
        out,
        "Tickers analyzed: {} | Days in range: {}",
        report.tickers.len(),
        (end - start).num_days()
    );

    match (&report.best_performer, report.as_of) {
        (Some(best), Some(as_of)) => {
            let close = report
                .ticker(best)
                .and_then(|t| t.rows.iter().find(|r| r.bar.date == as_of))
                .map(|r| r.bar.close);
            let _ = writeln!(out, "Best performing company on {}: {} (close ${})", as_of, best, num(close, 2));
        }
        _ => {
            let _ = writeln!(out, "Best performing company: {}", ABSENT);
        }
    }
    if let Some(best) = &report.best_period_return {
        let ret = report.ticker(best).and_then(|t| t.summary.period_return);
        let _ = writeln!(out, "Best performer (total return): {} ({})", best, pct(ret));
    }

    let _ = writeln!(out, "\nClosing prices");
    for t in &report.tickers {
        let closes: Vec<Option<f64>> = t.rows.iter().map(|r| Some(r.bar.close)).collect();
        let _ = writeln!(out, "{:>8} {}", t.ticker, sparkline(&closes));
    }

    let _ = writeln!(out, "\nDaily volume");
    for t in &report.tickers {
        let volumes: Vec<Option<f64>> = t.rows.iter().map(|r| Some(r.bar.volume as f64)).collect();
        let _ = writeln!(out, "{:>8} {}", t.ticker, sparkline(&volumes));
    }

    let _ = writeln!(out, "\n{}", render_summary_table(report));
    out
}

/// Pricing tab for one ticker: recent derived rows plus return figures.
pub fn render_ticker(t: &TickerAnalysis, weekly: usize, monthly: usize, tail: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pricing data of {}", t.ticker);
    if !t.adjusted {
        let _ = writeln!(out, "⚠️  No adjusted close available; returns use raw close and are approximate.");
    }

    let mut table = new_table();
    table.set_header(vec![
        "Date".to_string(),
        "Close".to_string(),
        "Adj Close".to_string(),
        "% Change".to_string(),
        format!("Weekly ({weekly}d)"),
        format!("Monthly ({monthly}d)"),
    ]);
    let skip = t.rows.len().saturating_sub(tail);
    for row in t.rows.iter().skip(skip) {
        table.add_row(vec![
            row.bar.date.to_string(),
            num(Some(row.bar.close), 2),
            num(row.bar.adjusted_close, 2),
            row.pct_change.map(|p| p.to_string()).unwrap_or_else(|| ABSENT.to_string()),
            pct(row.weekly_return),
            pct(row.monthly_return),
        ]);
    }
    let _ = writeln!(out, "{table}");

    let s = &t.summary;
    let _ = writeln!(out, "Annualized return (approx): {}", pct(s.annualized_return));
    let _ = writeln!(out, "Annualized vol (approx): {}", pct(s.annualized_volatility));
    let _ = writeln!(out, "Sharpe-like (rf≈0): {}", num(s.risk_adjusted_return, 2));
    let _ = writeln!(out, "Latest weekly return: {}", pct(s.latest_weekly_return));
    let _ = writeln!(out, "Latest monthly return: {}", pct(s.latest_monthly_return));
    out
}

/// Moving-average tab: close vs each configured MA, latest values and charts.
pub fn render_moving_averages(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let windows = &report.columns.ma_windows;

    let mut header = vec!["Ticker".to_string(), "Close".to_string()];
    header.extend(windows.iter().map(|w| format!("MA{w}")));
    let mut table = new_table();
    table.set_header(header);

    for t in &report.tickers {
        let Some(last) = t.rows.last() else { continue };
        let mut cells = vec![t.ticker.clone(), num(Some(last.bar.close), 2)];
        cells.extend(last.moving_averages.iter().map(|ma| num(*ma, 2)));
        table.add_row(cells);
    }
    let _ = writeln!(out, "{table}");

    for t in &report.tickers {
        let _ = writeln!(out, "{} moving averages", t.ticker);
        let closes: Vec<Option<f64>> = t.rows.iter().map(|r| Some(r.bar.close)).collect();
        let _ = writeln!(out, "{:>8} {}", "Close", sparkline(&closes));
        for (i, w) in windows.iter().enumerate() {
            let ma: Vec<Option<f64>> = t.rows.iter().map(|r| r.moving_averages[i]).collect();
            let _ = writeln!(out, "{:>8} {}", format!("MA{w}"), sparkline(&ma));
        }
    }
    out
}

pub fn render_volatility(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}-day realized volatility", report.columns.volatility_window);
    for t in &report.tickers {
        let vol: Vec<Option<f64>> = t.rows.iter().map(|r| r.volatility).collect();
        let latest = t.rows.iter().rev().find_map(|r| r.volatility);
        let _ = writeln!(out, "{:>8} {} latest {}", t.ticker, sparkline(&vol), num(latest, 4));
    }
    out
}

/// Daily returns of two tickers on the dates where both have one.
pub fn paired_returns(a: &TickerAnalysis, b: &TickerAnalysis) -> Vec<(f64, f64)> {
    let other: BTreeMap<NaiveDate, f64> = b
        .rows
        .iter()
        .filter_map(|r| r.daily_return.map(|v| (r.bar.date, v)))
        .collect();
    a.rows
        .iter()
        .filter_map(|r| Some((r.daily_return?, *other.get(&r.bar.date)?)))
        .collect()
}

/// Character grid with one `•` per point, x to the right and y upwards.
pub fn scatter(points: &[(f64, f64)], width: usize, height: usize) -> Vec<String> {
    if points.is_empty() || width == 0 || height == 0 {
        return Vec::new();
    }
    let mut grid = vec![vec![' '; width]; height];
    let bounds = |values: Vec<f64>| {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lo, hi)
    };
    let (x_lo, x_hi) = bounds(points.iter().map(|p| p.0).collect());
    let (y_lo, y_hi) = bounds(points.iter().map(|p| p.1).collect());
    let cell = |v: f64, lo: f64, hi: f64, n: usize| {
        if hi > lo {
            (((v - lo) / (hi - lo)) * (n - 1) as f64).round() as usize
        } else {
            n / 2
        }
    };
    for &(x, y) in points {
        let col = cell(x, x_lo, x_hi, width).min(width - 1);
        let row = cell(y, y_lo, y_hi, height).min(height - 1);
        grid[height - 1 - row][col] = '•';
    }
    grid.into_iter().map(|r| r.into_iter().collect()).collect()
}

fn render_returns_scatter(report: &AnalysisReport) -> Option<String> {
    let [a, b, ..] = report.tickers.as_slice() else {
        return None;
    };
    let points = paired_returns(a, b);
    let mut out = String::new();
    let _ = writeln!(out, "Returns scatter: {} (x) vs {} (y), {} paired days", a.ticker, b.ticker, points.len());
    if points.is_empty() {
        let _ = writeln!(out, "  no overlapping returns");
        return Some(out);
    }
    for line in scatter(&points, SCATTER_WIDTH, SCATTER_HEIGHT) {
        let _ = writeln!(out, "  │{}", line);
    }
    let _ = writeln!(out, "  └{}", "─".repeat(SCATTER_WIDTH));
    Some(out)
}

pub fn render_correlation(report: &AnalysisReport) -> String {
    let m = &report.correlation;
    let mut table = new_table();
    let mut header = vec![String::new()];
    header.extend(m.tickers.iter().cloned());
    table.set_header(header);
    for (i, ticker) in m.tickers.iter().enumerate() {
        let mut cells = vec![ticker.clone()];
        cells.extend(m.values[i].iter().map(|c| num(*c, 3)));
        table.add_row(cells);
    }
    let mut out = format!("Correlation matrix of daily returns\n{table}\n");
    if let Some(s) = render_returns_scatter(report) {
        let _ = writeln!(out, "\n{s}");
    }
    out
}

pub fn render_news(feeds: &[NewsFeed]) -> String {
    let mut out = String::new();
    for feed in feeds {
        let _ = writeln!(out, "News of {}", feed.ticker);
        match &feed.articles {
            Err(e) => {
                let _ = writeln!(out, "  Failed fetching news for {}: {}", feed.ticker, e);
            }
            Ok(articles) if articles.is_empty() => {
                let _ = writeln!(out, "  No news found");
            }
            Ok(articles) => {
                for (i, a) in articles.iter().enumerate() {
                    let published = a
                        .published_at
                        .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| ABSENT.to_string());
                    let _ = writeln!(out, "  News {}: {}", i + 1, a.title);
                    let _ = writeln!(out, "    {}", published);
                    if !a.summary.is_empty() {
                        let _ = writeln!(out, "    {}", a.summary);
                    }
                    let _ = writeln!(
                        out,
                        "    Title sentiment {:.3} | Summary sentiment {:.3}",
                        a.title_sentiment, a.summary_sentiment
                    );
                }
            }
        }
    }
    out
}
