// Yahoo Finance chart (v8) JSON parsing
use crate::model::{ParserError, RawBar};
use crate::parser::Parser;
use chrono::DateTime;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChartErrorBody {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Parses daily chart payloads into raw bars. Dates are taken in the exchange's
/// local time using the payload's `gmtoffset`.
pub struct ChartParser;

impl ChartParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for ChartParser {
    type Output = Vec<RawBar>;

    fn parse(&self, body: &str) -> Result<Vec<RawBar>, ParserError> {
        let envelope: ChartEnvelope =
            serde_json::from_str(body).map_err(|e| ParserError::Json(e.to_string()))?;

        if let Some(err) = envelope.chart.error {
            let msg = match err.description {
                Some(desc) => format!("{}: {}", err.code, desc),
                None => err.code,
            };
            return Err(ParserError::Provider(msg));
        }

        let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };

        let empty = Quote::default();
        let quote = result.indicators.quote.first().unwrap_or(&empty);
        let adjclose: &[Option<f64>] = result
            .indicators
            .adjclose
            .first()
            .map(|a| a.adjclose.as_slice())
            .unwrap_or(&[]);
        let offset = result.meta.gmtoffset;

        let bars = result
            .timestamp
            .iter()
            .enumerate()
            .map(|(i, &ts)| RawBar {
                date: DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()),
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i),
                adjusted_close: at(adjclose, i),
                volume: at(&quote.volume, i).filter(|v| *v >= 0.0).map(|v| v.round() as u64),
            })
            .collect();

        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"{
      "chart": {
        "result": [{
          "meta": { "symbol": "AAPL", "gmtoffset": -18000 },
          "timestamp": [1704205800, 1704292200, 1704378600],
          "indicators": {
            "quote": [{
              "open":   [187.15, 184.22, null],
              "high":   [188.44, 185.88, null],
              "low":    [183.89, 183.43, null],
              "close":  [185.64, 184.25, null],
              "volume": [82488700, 58414500, null]
            }],
            "adjclose": [{ "adjclose": [184.29, 182.91, null] }]
          }
        }],
        "error": null
      }
    }"#;

    #[test]
    fn parses_quotes_and_adjclose() {
        let bars = ChartParser::new().parse(SAMPLE).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(bars[0].close, Some(185.64));
        assert_eq!(bars[0].adjusted_close, Some(184.29));
        assert_eq!(bars[1].volume, Some(58414500));
        assert_eq!(bars[2].close, None);
    }

    #[test]
    fn missing_adjclose_block_is_tolerated() {
        let body = r#"{"chart":{"result":[{"meta":{},"timestamp":[1704205800],
            "indicators":{"quote":[{"close":[10.5]}]}}],"error":null}}"#;
        let bars = ChartParser::new().parse(body).unwrap();
        assert_eq!(bars[0].close, Some(10.5));
        assert_eq!(bars[0].adjusted_close, None);
        assert_eq!(bars[0].open, None);
    }

    #[test]
    fn empty_range_yields_no_bars() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(ChartParser::new().parse(body).unwrap().is_empty());
    }

    #[test]
    fn provider_error_is_reported() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = ChartParser::new().parse(body).unwrap_err();
        assert_eq!(
            err,
            ParserError::Provider("Not Found: No data found, symbol may be delisted".into())
        );
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(ChartParser::new().parse("<html>"), Err(ParserError::Json(_))));
    }
}
