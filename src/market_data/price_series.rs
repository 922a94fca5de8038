use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SignalError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single price bar. Only the close is mandatory; OHLC fields are optional
/// because some providers leave them null for thinly traded intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    pub close: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Close-only bar.
    pub fn close_only(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self::new(timestamp, None, None, None, close)
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- validated, immutable bars for one symbol
// ---------------------------------------------------------------------------

/// Ordered bars for exactly one symbol.
///
/// Invariants enforced by [`PriceSeries::new`]:
/// * at least one bar,
/// * every close is finite and strictly positive,
/// * timestamps are strictly increasing.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SignalError> {
        let symbol = symbol.into();

        if bars.is_empty() {
            return Err(SignalError::InvalidSeries(format!("{symbol}: no bars")));
        }

        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(SignalError::InvalidSeries(format!(
                    "{symbol}: bar {i} has invalid close {}",
                    bar.close
                )));
            }
        }

        if let Some(i) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(SignalError::InvalidSeries(format!(
                "{symbol}: timestamp at bar {} does not advance ({} -> {})",
                i + 1,
                bars[i].timestamp,
                bars[i + 1].timestamp
            )));
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Highs with missing values as NaN so rolling windows over them stay
    /// undefined instead of silently using zero.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high.unwrap_or(f64::NAN)).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low.unwrap_or(f64::NAN)).collect()
    }

    pub fn last_close(&self) -> f64 {
        // Non-empty by construction.
        self.bars[self.bars.len() - 1].close
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.bars[self.bars.len() - 1].timestamp
    }

    /// First `len` bars as a new series (used to replay history bar by bar).
    pub fn truncated(&self, len: usize) -> Option<Self> {
        if len == 0 || len > self.bars.len() {
            return None;
        }
        Some(Self {
            symbol: self.symbol.clone(),
            bars: self.bars[..len].to_vec(),
        })
    }
}
