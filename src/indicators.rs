use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ProxyError, Result};
use crate::models::{ChartRequest, ChartSeries};

pub const MAX_PERIODS: usize = 3;
pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorReport {
    pub ticker: String,
    pub interval: String,
    pub timestamp: DateTime<Utc>,
    pub current_price: Option<f64>,
    pub readings: Vec<RsiReading>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RsiReading {
    pub period: usize,
    pub rsi: Option<f64>,
    pub volume_weighted_rsi: Option<f64>,
}

// Comma-separated look-back periods; non-positive entries are dropped,
// at most MAX_PERIODS survive.
pub fn parse_periods(raw: Option<&str>) -> Result<Vec<usize>> {
    let raw = match raw {
        Some(value) => value,
        None => return Ok(vec![DEFAULT_PERIOD]),
    };

    let mut periods = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let value = part
            .parse::<i64>()
            .map_err(|_| ProxyError::Validation(format!("Invalid RSI period '{}'", part)))?;
        if value > 0 {
            periods.push(value as usize);
        }
    }

    periods.truncate(MAX_PERIODS);
    if periods.is_empty() {
        return Err(ProxyError::Validation(
            "Provide up to 3 positive RSI periods".to_string(),
        ));
    }
    Ok(periods)
}

// RSI over the whole series; index i holds the value for closes[..=i].
// Simple averages of gains and losses over the trailing window.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for window in closes.windows(2) {
        let change = window[1] - window[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    for i in period..closes.len() {
        let avg_gain: f64 = gains[i - period..i].iter().sum::<f64>() / period as f64;
        let avg_loss: f64 = losses[i - period..i].iter().sum::<f64>() / period as f64;

        out[i] = Some(if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        });
    }

    out
}

// Volume-weighted average of the RSI over the trailing window.
pub fn volume_weighted_rsi(closes: &[f64], volumes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let rsi = rsi_series(closes, period);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in closes.len() - period..closes.len() {
        if let Some(value) = rsi[i] {
            let volume = volumes.get(i).copied().unwrap_or(0.0);
            numerator += value * volume;
            denominator += volume;
        }
    }

    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

pub fn build_report(
    request: &ChartRequest,
    series: &ChartSeries,
    periods: &[usize],
) -> IndicatorReport {
    let readings = periods
        .iter()
        .map(|&period| RsiReading {
            period,
            rsi: rsi_series(&series.closes, period).last().copied().flatten(),
            volume_weighted_rsi: volume_weighted_rsi(&series.closes, &series.volumes, period),
        })
        .collect();

    IndicatorReport {
        ticker: request.ticker.clone(),
        interval: request.interval.as_str().to_string(),
        timestamp: Utc::now(),
        current_price: series.closes.last().copied(),
        readings,
    }
}
