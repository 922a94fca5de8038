// =============================================================================
// Indicator Snapshot — all columns a strategy needs, aligned with the series
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;
use super::macd::{calculate_macd, MacdSeries};
use super::rsi::calculate_rsi;
use super::volatility::calculate_volatility_ratio;
use crate::error::SignalError;
use crate::market_data::PriceSeries;

/// MACD spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// Which indicators to compute, and with what look-backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub macd: Option<MacdParams>,
    pub volatility_period: Option<usize>,
}

/// One aligned row of the snapshot. Columns that were not requested are
/// `None`; requested columns may still be NaN during warm-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub volatility_ratio: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct IndicatorSnapshot {
    pub close: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Option<MacdSeries>,
    pub volatility_ratio: Option<Vec<f64>>,
}

impl IndicatorSnapshot {
    /// Recompute every requested column from the full series.
    pub fn compute(series: &PriceSeries, params: &IndicatorParams) -> Self {
        let close = series.closes();

        let ema_fast = calculate_ema(&close, params.ema_fast);
        let ema_slow = calculate_ema(&close, params.ema_slow);
        let rsi = calculate_rsi(&close, params.rsi_period);
        let macd = params
            .macd
            .map(|m| calculate_macd(&close, m.fast, m.slow, m.signal));
        let volatility_ratio = params.volatility_period.map(|period| {
            calculate_volatility_ratio(&series.highs(), &series.lows(), &close, period)
        });

        Self {
            close,
            ema_fast,
            ema_slow,
            rsi,
            macd,
            volatility_ratio,
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        if i >= self.len() {
            return None;
        }
        Some(IndicatorRow {
            close: self.close[i],
            ema_fast: self.ema_fast[i],
            ema_slow: self.ema_slow[i],
            rsi: self.rsi[i],
            macd_line: self.macd.as_ref().map(|m| m.line[i]),
            macd_signal: self.macd.as_ref().map(|m| m.signal[i]),
            volatility_ratio: self.volatility_ratio.as_ref().map(|v| v[i]),
        })
    }

    /// `(previous, current)` rows, i.e. index -2 and -1.
    pub fn last_two(&self) -> Result<(IndicatorRow, IndicatorRow), SignalError> {
        let n = self.len();
        let insufficient = SignalError::InsufficientData {
            required: 2,
            available: n,
        };
        if n < 2 {
            return Err(insufficient);
        }
        match (self.row(n - 2), self.row(n - 1)) {
            (Some(prev), Some(cur)) => Ok((prev, cur)),
            _ => Err(insufficient),
        }
    }
}

/// Reject a NaN/infinite value before it reaches a comparison.
///
/// A non-finite value here means the column is still warming up, so the
/// error is reported as insufficient data for `bars` available bars.
pub fn finite(value: f64, bars: usize, warm_up: usize) -> Result<f64, SignalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SignalError::InsufficientData {
            required: warm_up.max(bars + 1),
            available: bars,
        })
    }
}

/// Unwrap an optional column, then require it to be finite.
pub fn required(
    value: Option<f64>,
    name: &'static str,
    bars: usize,
    warm_up: usize,
) -> Result<f64, SignalError> {
    let v = value.ok_or(SignalError::MissingIndicator(name))?;
    finite(v, bars, warm_up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceBar;
    use chrono::{Duration, TimeZone, Utc};

    fn series(n: usize) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap();
        let bars = (0..n)
            .map(|i| {
                let c = 1.0 + i as f64 * 0.001;
                PriceBar::new(
                    start + Duration::minutes(15 * i as i64),
                    Some(c),
                    Some(c * 1.001),
                    Some(c * 0.999),
                    c,
                )
            })
            .collect();
        PriceSeries::new("EURUSD", bars).unwrap()
    }

    fn params() -> IndicatorParams {
        IndicatorParams {
            ema_fast: 20,
            ema_slow: 50,
            rsi_period: 14,
            macd: Some(MacdParams::default()),
            volatility_period: Some(14),
        }
    }

    #[test]
    fn columns_are_aligned_with_series() {
        let snap = IndicatorSnapshot::compute(&series(80), &params());
        assert_eq!(snap.len(), 80);
        assert_eq!(snap.ema_fast.len(), 80);
        assert_eq!(snap.rsi.len(), 80);
        assert_eq!(snap.macd.as_ref().unwrap().signal.len(), 80);
        assert_eq!(snap.volatility_ratio.as_ref().unwrap().len(), 80);
    }

    #[test]
    fn unrequested_columns_are_none() {
        let mut p = params();
        p.macd = None;
        p.volatility_period = None;
        let snap = IndicatorSnapshot::compute(&series(30), &p);
        let row = snap.row(29).unwrap();
        assert!(row.macd_line.is_none());
        assert!(row.volatility_ratio.is_none());
        assert!(matches!(
            required(row.macd_line, "macd_line", 30, 30),
            Err(SignalError::MissingIndicator("macd_line"))
        ));
    }

    #[test]
    fn last_two_needs_two_rows() {
        let snap = IndicatorSnapshot::compute(&series(1), &params());
        assert!(matches!(
            snap.last_two(),
            Err(SignalError::InsufficientData { required: 2, available: 1 })
        ));
        let snap = IndicatorSnapshot::compute(&series(5), &params());
        let (prev, cur) = snap.last_two().unwrap();
        assert!(cur.close > prev.close);
    }

    #[test]
    fn nan_is_reported_as_insufficient_data() {
        assert!(matches!(
            finite(f64::NAN, 10, 15),
            Err(SignalError::InsufficientData { required: 15, available: 10 })
        ));
        assert_eq!(finite(1.5, 10, 15), Ok(1.5));
    }
}
