use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Upper bound for the per-ticker news slider.
pub const MAX_ARTICLES_PER_TICKER: usize = 10;

/// Longest default lookback accepted from the config, about a century.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How weekly/monthly rolling returns are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnPolicy {
    /// Product of (1 + r) over the window, minus one.
    #[default]
    Compound,
    /// Arithmetic mean of daily returns over the window.
    Mean,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub pct_precision: u32,
    pub ma_windows: Vec<usize>,
    pub volatility_window: usize,
    pub weekly_window: usize,
    pub monthly_window: usize,
    pub return_policy: ReturnPolicy,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            pct_precision: 2,
            ma_windows: vec![50, 200],
            volatility_window: 10,
            weekly_window: 5,
            monthly_window: 21,
            return_policy: ReturnPolicy::Compound,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub enabled: bool,
    pub articles_per_ticker: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            articles_per_ticker: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) StockScope/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_tickers: String,
    pub lookback_days: i64,
    pub concurrent_fetch: bool,
    pub analytics: AnalyticsConfig,
    pub news: NewsConfig,
    pub http: HttpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_tickers: "AAPL, MSFT".to_string(),
            lookback_days: 90,
            concurrent_fetch: true,
            analytics: AnalyticsConfig::default(),
            news: NewsConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analytics;
        if a.pct_precision > 10 {
            return Err(ConfigError::Invalid(format!(
                "pct_precision must be at most 10, got {}",
                a.pct_precision
            )));
        }
        if a.ma_windows.iter().any(|&w| w == 0) {
            return Err(ConfigError::Invalid("moving average windows must be positive".into()));
        }
        if a.volatility_window < 2 {
            return Err(ConfigError::Invalid("volatility_window must be at least 2".into()));
        }
        if a.weekly_window == 0 || a.monthly_window == 0 {
            return Err(ConfigError::Invalid("weekly/monthly windows must be positive".into()));
        }
        if !(1..=MAX_ARTICLES_PER_TICKER).contains(&self.news.articles_per_ticker) {
            return Err(ConfigError::Invalid(format!(
                "articles_per_ticker must be within 1..={}",
                MAX_ARTICLES_PER_TICKER
            )));
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(ConfigError::Invalid(format!(
                "lookback_days must be within 1..={}, got {}",
                MAX_LOOKBACK_DAYS, self.lookback_days
            )));
        }
        Ok(())
    }
}

/// Loads the config file. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.analytics.pct_precision, 2);
        assert_eq!(cfg.analytics.ma_windows, vec![50, 200]);
        assert_eq!(cfg.analytics.volatility_window, 10);
        assert_eq!(cfg.analytics.weekly_window, 5);
        assert_eq!(cfg.analytics.monthly_window, 21);
        assert_eq!(cfg.analytics.return_policy, ReturnPolicy::Compound);
        assert_eq!(cfg.news.articles_per_ticker, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{ "analytics": { "pct_precision": 4, "return_policy": "mean" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.analytics.pct_precision, 4);
        assert_eq!(cfg.analytics.return_policy, ReturnPolicy::Mean);
        assert_eq!(cfg.analytics.monthly_window, 21);
    }

    #[test]
    fn rejects_out_of_range_articles() {
        let mut cfg = AppConfig::default();
        cfg.news.articles_per_ticker = 11;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_huge_lookback() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "lookback_days": 9000000000000 }"#).unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = AppConfig::default();
        cfg.lookback_days = MAX_LOOKBACK_DAYS;
        assert!(cfg.validate().is_ok());
        cfg.lookback_days = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_ma_window() {
        let mut cfg = AppConfig::default();
        cfg.analytics.ma_windows = vec![20, 0];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "default_tickers": "NVDA", "analytics": {{ "ma_windows": [20] }} }}"#).unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.default_tickers, "NVDA");
        assert_eq!(cfg.analytics.ma_windows, vec![20]);

        let missing = load_config("/definitely/not/here/config.json").unwrap();
        assert_eq!(missing.default_tickers, "AAPL, MSFT");
    }
}
