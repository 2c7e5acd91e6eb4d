use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{ProxyError, Result};

// Inbound query parameters, raw as extracted from the URL.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub ticker: Option<String>,
    pub period1: Option<String>,
    pub period2: Option<String>,
    pub interval: Option<String>,
}

// Query parameters for the indicators endpoint.
#[derive(Debug, Deserialize)]
pub struct IndicatorsQuery {
    pub ticker: Option<String>,
    pub period1: Option<String>,
    pub period2: Option<String>,
    pub interval: Option<String>,
    pub periods: Option<String>,
}

impl IndicatorsQuery {
    pub fn chart(&self) -> ChartQuery {
        ChartQuery {
            ticker: self.ticker.clone(),
            period1: self.period1.clone(),
            period2: self.period2.clone(),
            interval: self.interval.clone(),
        }
    }
}

// Sampling granularities accepted by the chart endpoint. Exact match only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    OneDay,
    FiveDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }
}

impl FromStr for Interval {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1d" => Ok(Interval::OneDay),
            "5d" => Ok(Interval::FiveDays),
            "1wk" => Ok(Interval::OneWeek),
            "1mo" => Ok(Interval::OneMonth),
            "3mo" => Ok(Interval::ThreeMonths),
            other => Err(ProxyError::Validation(format!(
                "Invalid interval '{}', expected one of 1d, 5d, 1wk, 1mo, 3mo",
                other
            ))),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Validated request, ready for upstream URL construction.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub ticker: String,
    pub period1: i64,
    pub period2: i64,
    pub interval: Interval,
}

impl ChartRequest {
    // First failing rule wins; no accumulation of multiple errors.
    pub fn from_query(query: &ChartQuery) -> Result<Self> {
        let ticker = match query.ticker.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(ProxyError::Validation(
                    "Missing or empty ticker".to_string(),
                ))
            }
        };

        let period1 = parse_period(query.period1.as_deref(), "period1")?;
        let period2 = parse_period(query.period2.as_deref(), "period2")?;

        let interval = match query.interval.as_deref() {
            Some(raw) => raw.parse::<Interval>()?,
            None => return Err(ProxyError::Validation("Missing interval".to_string())),
        };

        Ok(Self {
            ticker,
            period1,
            period2,
            interval,
        })
    }
}

// Periods are Unix timestamps; no range or ordering checks.
fn parse_period(value: Option<&str>, field: &str) -> Result<i64> {
    match value {
        Some(raw) => raw.parse::<i64>().map_err(|_| {
            ProxyError::Validation(format!(
                "{} must be a Unix timestamp, got '{}'",
                field, raw
            ))
        }),
        None => Err(ProxyError::Validation(format!("Missing {}", field))),
    }
}

// Upstream response shape; only what the has-data check needs. The raw
// document is carried separately and forwarded verbatim on success.
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Option<ChartNode>,
}

#[derive(Debug, Deserialize)]
pub struct ChartNode {
    #[serde(default)]
    pub result: Option<Vec<Value>>,
}

impl ChartEnvelope {
    pub fn has_data(&self) -> bool {
        self.chart
            .as_ref()
            .and_then(|chart| chart.result.as_ref())
            .map_or(false, |result| !result.is_empty())
    }
}

// Close/volume series extracted from the first chart result.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartSeries {
    // Points with a null close are skipped; missing volume counts as zero.
    pub fn from_chart(body: &Value, ticker: &str) -> Result<Self> {
        let envelope = ChartEnvelope::deserialize(body)?;
        let first = envelope
            .chart
            .and_then(|chart| chart.result)
            .and_then(|mut result| {
                if result.is_empty() {
                    None
                } else {
                    Some(result.remove(0))
                }
            })
            .ok_or_else(|| ProxyError::NoData {
                ticker: ticker.to_string(),
            })?;

        let parsed = ChartResult::deserialize(&first)?;
        let quote = parsed.indicators.quote.into_iter().next().unwrap_or_default();

        let mut closes = Vec::with_capacity(quote.close.len());
        let mut volumes = Vec::with_capacity(quote.close.len());
        for (index, close) in quote.close.iter().enumerate() {
            if let Some(value) = close {
                closes.push(*value);
                volumes.push(quote.volume.get(index).copied().flatten().unwrap_or(0.0));
            }
        }

        Ok(Self { closes, volumes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(
        ticker: Option<&str>,
        period1: Option<&str>,
        period2: Option<&str>,
        interval: Option<&str>,
    ) -> ChartQuery {
        ChartQuery {
            ticker: ticker.map(String::from),
            period1: period1.map(String::from),
            period2: period2.map(String::from),
            interval: interval.map(String::from),
        }
    }

    #[test]
    fn interval_parses_the_full_set() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::OneDay);
        assert_eq!("5d".parse::<Interval>().unwrap(), Interval::FiveDays);
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::OneWeek);
        assert_eq!("1mo".parse::<Interval>().unwrap(), Interval::OneMonth);
        assert_eq!("3mo".parse::<Interval>().unwrap(), Interval::ThreeMonths);
    }

    #[test]
    fn interval_rejects_case_variants_and_unknowns() {
        assert!("1D".parse::<Interval>().is_err());
        assert!("1W".parse::<Interval>().is_err());
        assert!("2d".parse::<Interval>().is_err());
        assert!("".parse::<Interval>().is_err());
    }

    #[test]
    fn from_query_accepts_a_valid_request() {
        let q = query(Some("AAPL"), Some("1600000000"), Some("1600100000"), Some("1d"));
        let request = ChartRequest::from_query(&q).unwrap();
        assert_eq!(request.ticker, "AAPL");
        assert_eq!(request.period1, 1600000000);
        assert_eq!(request.period2, 1600100000);
        assert_eq!(request.interval, Interval::OneDay);
    }

    #[test]
    fn from_query_trims_the_ticker() {
        let q = query(Some("  AAPL  "), Some("1"), Some("2"), Some("1d"));
        let request = ChartRequest::from_query(&q).unwrap();
        assert_eq!(request.ticker, "AAPL");
    }

    #[test]
    fn missing_or_blank_ticker_fails() {
        let missing = query(None, Some("1"), Some("2"), Some("1d"));
        let blank = query(Some("   "), Some("1"), Some("2"), Some("1d"));
        assert!(ChartRequest::from_query(&missing).is_err());
        assert!(ChartRequest::from_query(&blank).is_err());
    }

    #[test]
    fn non_numeric_periods_fail() {
        let bad1 = query(Some("AAPL"), Some("abc"), Some("2"), Some("1d"));
        let bad2 = query(Some("AAPL"), Some("1"), Some("2.5"), Some("1d"));
        assert!(ChartRequest::from_query(&bad1).is_err());
        assert!(ChartRequest::from_query(&bad2).is_err());
    }

    #[test]
    fn negative_periods_are_accepted_as_is() {
        let q = query(Some("AAPL"), Some("-100"), Some("2"), Some("1d"));
        let request = ChartRequest::from_query(&q).unwrap();
        assert_eq!(request.period1, -100);
    }

    #[test]
    fn first_failing_rule_short_circuits() {
        // Both ticker and interval are bad; the ticker rule reports first.
        let q = query(None, Some("abc"), None, Some("2d"));
        let err = ChartRequest::from_query(&q).unwrap_err();
        assert!(err.to_string().contains("ticker"));
    }

    #[test]
    fn envelope_detects_data() {
        let body = json!({ "chart": { "result": [{ "meta": {} }], "error": null } });
        let envelope = ChartEnvelope::deserialize(&body).unwrap();
        assert!(envelope.has_data());
    }

    #[test]
    fn envelope_treats_absent_shapes_as_no_data() {
        let empty_result = json!({ "chart": { "result": [], "error": null } });
        let null_result = json!({ "chart": { "result": null } });
        let no_chart = json!({ "finance": {} });

        for body in [empty_result, null_result, no_chart] {
            let envelope = ChartEnvelope::deserialize(&body).unwrap();
            assert!(!envelope.has_data());
        }
    }

    #[test]
    fn series_skips_null_closes_and_defaults_missing_volume() {
        let body = json!({
            "chart": {
                "result": [{
                    "indicators": {
                        "quote": [{
                            "close": [1.0, null, 3.0, 4.0],
                            "volume": [10.0, 20.0, null]
                        }]
                    }
                }]
            }
        });

        let series = ChartSeries::from_chart(&body, "AAPL").unwrap();
        assert_eq!(series.closes, vec![1.0, 3.0, 4.0]);
        assert_eq!(series.volumes, vec![10.0, 0.0, 0.0]);
    }

    #[test]
    fn series_from_empty_result_is_no_data() {
        let body = json!({ "chart": { "result": [] } });
        let err = ChartSeries::from_chart(&body, "MSFT").unwrap_err();
        assert!(err.to_string().contains("MSFT"));
    }
}
