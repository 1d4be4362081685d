// Utility functions
use crate::model::{FetchRequest, InputError};
use chrono::{DateTime, Days, NaiveDate, Utc};

/// Parses an RFC 2822 (RSS) or RFC 3339 timestamp into `DateTime<Utc>`.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    let s = date_str.trim();
    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(s.trim().to_string()))
}

fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= 15
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '^' | '='))
}

/// Splits a comma-separated ticker list, trimming, uppercasing and dropping duplicates
/// while keeping first-seen order.
pub fn parse_tickers(raw: &str) -> Result<Vec<String>, InputError> {
    let mut tickers: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let symbol = part.trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        if !is_valid_symbol(&symbol) {
            return Err(InputError::InvalidTicker(symbol));
        }
        if !tickers.contains(&symbol) {
            tickers.push(symbol);
        }
    }
    if tickers.is_empty() {
        return Err(InputError::EmptyTickers);
    }
    Ok(tickers)
}

/// Validates raw user input into a `FetchRequest`.
pub fn build_request(raw_tickers: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchRequest, InputError> {
    let tickers = parse_tickers(raw_tickers)?;
    if start >= end {
        return Err(InputError::InvertedRange { start, end });
    }
    Ok(FetchRequest { tickers, start, end })
}

/// Start of a range covering `days` calendar days before `end`.
pub fn lookback_start(end: NaiveDate, days: i64) -> Result<NaiveDate, InputError> {
    u64::try_from(days)
        .ok()
        .filter(|&d| d > 0)
        .and_then(|d| end.checked_sub_days(Days::new(d)))
        .ok_or(InputError::LookbackOutOfRange { end, days })
}

/// Rounds to `digits` decimal places.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickers_are_normalized() {
        let t = parse_tickers(" aapl, MSFT ,,reliance.ns, AAPL").unwrap();
        assert_eq!(t, vec!["AAPL", "MSFT", "RELIANCE.NS"]);
    }

    #[test]
    fn empty_and_invalid_tickers() {
        assert_eq!(parse_tickers(" , "), Err(InputError::EmptyTickers));
        assert_eq!(
            parse_tickers("AAPL, MS FT"),
            Err(InputError::InvalidTicker("MS FT".to_string()))
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let d = parse_date("2024-03-01").unwrap();
        assert!(matches!(
            build_request("AAPL", d, d),
            Err(InputError::InvertedRange { .. })
        ));
        let earlier = parse_date("2024-01-01").unwrap();
        let req = build_request("aapl", earlier, d).unwrap();
        assert_eq!(req.tickers, vec!["AAPL"]);
    }

    #[test]
    fn bad_date_is_rejected() {
        assert_eq!(
            parse_date("03/01/2024"),
            Err(InputError::InvalidDate("03/01/2024".to_string()))
        );
    }

    #[test]
    fn parses_rss_timestamps() {
        let dt = parse_datetime("Tue, 05 Mar 2024 14:30:00 +0000").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-05T14:30:00+00:00");
        assert!(parse_datetime("2024-03-05T14:30:00Z").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn lookback_start_never_panics() {
        let end = parse_date("2024-03-31").unwrap();
        assert_eq!(lookback_start(end, 30), parse_date("2024-03-01"));
        assert!(matches!(
            lookback_start(end, 9_000_000_000_000),
            Err(InputError::LookbackOutOfRange { .. })
        ));
        assert!(lookback_start(end, 0).is_err());
        assert!(lookback_start(end, -5).is_err());
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.23456, 4), 1.2346);
    }
}
