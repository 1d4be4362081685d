// dashboard/command_handler.rs

use crate::config::MAX_ARTICLES_PER_TICKER;
use crate::dashboard::render;
use crate::dashboard::{Dashboard, TABLE_TAIL};
use crate::export;
use crate::analyzer::AnalysisReport;
use crate::model::{ExportError, FetchRequest, InputError};
use crate::utils::{build_request, lookback_start, parse_date};
use chrono::{NaiveDate, Utc};
use std::fs::File;
use tracing::info;

pub const HELP: &str = "📋 Available commands:\n\
    fetch [TICKERS] [START END] : fetch stock data (e.g. fetch AAPL,MSFT 2024-01-01 2024-04-01)\n\
    analysis : show analysis for the fetched data\n\
    ticker SYMBOL : pricing data and returns for one ticker\n\
    ma [W1,W2,...] : moving averages, optionally with new windows\n\
    vol : rolling volatility\n\
    corr : correlation matrix of daily returns\n\
    news [N] : top N articles per ticker (1-10)\n\
    export PATH : write the derived dataset as CSV\n\
    status : current stage\n\
    reset : clear the session\n\
    help : this list\n\
    quit : exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch { tickers: Option<String>, range: Option<(NaiveDate, NaiveDate)> },
    Analysis,
    Ticker(String),
    MovingAverages(Option<Vec<usize>>),
    Volatility,
    Correlation,
    News(Option<usize>),
    Export(String),
    Status,
    Reset,
    Help,
    Quit,
}

/// What the listener should print, and whether to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), quit: false }
    }
}

fn parse_windows(raw: &str) -> Result<Vec<usize>, String> {
    let windows: Vec<usize> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().map_err(|_| format!("invalid window: {s}")))
        .collect::<Result<_, _>>()?;
    if windows.is_empty() || windows.contains(&0) {
        return Err("windows must be positive integers".into());
    }
    Ok(windows)
}

/// Parses one input line. Leading `/` is accepted.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim().trim_start_matches('/');
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((n, r)) => (n, r.trim()),
        None => (line, ""),
    };

    match name.to_lowercase().as_str() {
        "fetch" => {
            let mut parts: Vec<&str> = rest.split_whitespace().collect();
            let range = if parts.len() >= 2 {
                let end = parse_date(parts[parts.len() - 1]);
                let start = parse_date(parts[parts.len() - 2]);
                match (start, end) {
                    (Ok(s), Ok(e)) => {
                        parts.truncate(parts.len() - 2);
                        Some((s, e))
                    }
                    _ => None,
                }
            } else {
                None
            };
            if range.is_none() && parts.last().is_some_and(|p| parse_date(p).is_ok()) {
                return Err("give both START and END dates".into());
            }
            let tickers = (!parts.is_empty()).then(|| parts.join(","));
            Ok(Command::Fetch { tickers, range })
        }
        "analysis" | "show" => Ok(Command::Analysis),
        "ticker" | "pricing" => {
            if rest.is_empty() {
                Err("usage: ticker SYMBOL".into())
            } else {
                Ok(Command::Ticker(rest.to_uppercase()))
            }
        }
        "ma" => {
            if rest.is_empty() {
                Ok(Command::MovingAverages(None))
            } else {
                parse_windows(rest).map(|w| Command::MovingAverages(Some(w)))
            }
        }
        "vol" | "volatility" => Ok(Command::Volatility),
        "corr" | "correlation" => Ok(Command::Correlation),
        "news" => {
            if rest.is_empty() {
                return Ok(Command::News(None));
            }
            match rest.parse::<usize>() {
                Ok(n) if (1..=MAX_ARTICLES_PER_TICKER).contains(&n) => Ok(Command::News(Some(n))),
                _ => Err(format!("articles per ticker must be within 1..={}", MAX_ARTICLES_PER_TICKER)),
            }
        }
        "export" => {
            if rest.is_empty() {
                Err("usage: export PATH".into())
            } else {
                Ok(Command::Export(rest.to_string()))
            }
        }
        "status" => Ok(Command::Status),
        "reset" => Ok(Command::Reset),
        "help" | "start" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err("empty command".into()),
        other => Err(format!("unknown command: {other} (try help)")),
    }
}

/// Validates the fetch arguments, filling gaps from the config defaults.
fn fetch_request(dashboard: &Dashboard, tickers: Option<String>, range: Option<(NaiveDate, NaiveDate)>) -> Result<FetchRequest, InputError> {
    let raw = tickers.unwrap_or_else(|| dashboard.config.default_tickers.clone());
    let (start, end) = match range {
        Some(r) => r,
        None => {
            let end = Utc::now().date_naive();
            (lookback_start(end, dashboard.config.lookback_days)?, end)
        }
    };
    build_request(&raw, start, end)
}

/// Writes the CSV and reads it back, returning the number of rows on disk.
fn export_and_verify(report: &AnalysisReport, path: &str) -> Result<usize, ExportError> {
    export::export_to_file(report, path)?;
    let rows = export::read_export(File::open(path)?)?;
    Ok(rows.len())
}

const NO_DATA: &str = "No data loaded. Use `fetch` first.";

/// Executes a parsed command against the dashboard.
pub async fn execute(dashboard: &mut Dashboard, command: Command) -> Reply {
    info!("Handling command: {:?}", command);
    match command {
        Command::Fetch { tickers, range } => {
            let request = match fetch_request(dashboard, tickers, range) {
                Ok(r) => r,
                Err(e) => return Reply::text(format!("❌ {e}")),
            };
            match dashboard.fetch(request).await {
                Ok(_) => match (dashboard.session().outcome(), dashboard.session().report()) {
                    (Some(outcome), Some(report)) => Reply::text(render::render_prices(outcome, report, TABLE_TAIL)),
                    _ => Reply::text(NO_DATA),
                },
                Err(e) => Reply::text(format!("❌ {e}")),
            }
        }
        Command::Analysis => match dashboard.show_analysis().map(|_| ()) {
            Ok(()) => match (dashboard.session().outcome(), dashboard.session().report()) {
                (Some(outcome), Some(report)) => Reply::text(render::render_analysis(outcome, report)),
                _ => Reply::text(NO_DATA),
            },
            Err(e) => Reply::text(format!("❌ {e}")),
        },
        Command::Ticker(symbol) => {
            let (weekly, monthly) = (dashboard.analytics().weekly_window, dashboard.analytics().monthly_window);
            match dashboard.session().report() {
                None => Reply::text(NO_DATA),
                Some(report) => match report.ticker(&symbol) {
                    Some(t) => Reply::text(render::render_ticker(t, weekly, monthly, TABLE_TAIL)),
                    None => Reply::text(format!("{symbol} is not in the current batch")),
                },
            }
        }
        Command::MovingAverages(windows) => {
            if let Some(w) = windows {
                dashboard.set_ma_windows(w);
            }
            match dashboard.session().report() {
                Some(report) => Reply::text(render::render_moving_averages(report)),
                None => Reply::text(NO_DATA),
            }
        }
        Command::Volatility => match dashboard.session().report() {
            Some(report) => Reply::text(render::render_volatility(report)),
            None => Reply::text(NO_DATA),
        },
        Command::Correlation => match dashboard.session().report() {
            Some(report) => Reply::text(render::render_correlation(report)),
            None => Reply::text(NO_DATA),
        },
        Command::News(n) => {
            if !dashboard.config.news.enabled {
                return Reply::text("News is disabled in the config.");
            }
            if let Some(n) = n {
                dashboard.set_articles_per_ticker(n);
            }
            match dashboard.load_news().await {
                Some(feeds) => Reply::text(render::render_news(feeds)),
                None => Reply::text(NO_DATA),
            }
        }
        Command::Export(path) => match dashboard.session().report() {
            Some(report) => match export_and_verify(report, &path) {
                Ok(rows) => Reply::text(format!("💾 Saved {} rows to {}", rows, path)),
                Err(e) => Reply::text(format!("❌ Export failed: {e}")),
            },
            None => Reply::text(NO_DATA),
        },
        Command::Status => {
            let uptime = dashboard.start_time.elapsed();
            let tickers = dashboard
                .session()
                .report()
                .map(|r| r.tickers.iter().map(|t| t.ticker.as_str()).collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            Reply::text(format!(
                "📊 Stage: {:?} | Tickers: {} | Uptime: {:02}:{:02}:{:02}",
                dashboard.stage(),
                if tickers.is_empty() { "—" } else { tickers.as_str() },
                uptime.as_secs() / 3600,
                (uptime.as_secs() % 3600) / 60,
                uptime.as_secs() % 60
            ))
        }
        Command::Reset => {
            dashboard.reset();
            Reply::text("🔄 Session reset.")
        }
        Command::Help => Reply::text(HELP),
        Command::Quit => Reply { text: "Bye.".into(), quit: true },
    }
}

/// Parses and executes one input line.
pub async fn handle_command(command_text: &str, dashboard: &mut Dashboard) -> Reply {
    match parse_command(command_text) {
        Ok(command) => execute(dashboard, command).await,
        Err(e) => Reply::text(format!("❌ {e}")),
    }
}
