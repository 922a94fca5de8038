// =============================================================================
// Trend Reversal — EMA 50/200 trend filter with RSI / MACD triggers (daily)
// =============================================================================
//
// Trend:   up   = close > ema50 > ema200
//          down = close < ema50 < ema200
//
// BUY   in an up-trend when RSI turns up from oversold or MACD crosses above
//       its signal line.
// SELL  in a down-trend when RSI turns down from overbought or MACD crosses
//       below its signal line.
//
// The trend conditions are mutually exclusive, so at most one side fires.
// Cooldown is tracked per (symbol, side).
// =============================================================================

use serde::{Deserialize, Serialize};

use super::{crossed_above, crossed_below, RuleHit, SignalReason, SignalStrategy};
use crate::cooldown::CooldownScope;
use crate::error::SignalError;
use crate::indicators::snapshot::{finite, required};
use crate::indicators::{IndicatorParams, IndicatorSnapshot, MacdParams};
use crate::types::Side;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    pub min_bars: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub macd: MacdParams,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub cooldown_minutes: u64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            min_bars: 220,
            ema_fast: 50,
            ema_slow: 200,
            rsi_period: 14,
            macd: MacdParams::default(),
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            cooldown_minutes: 720,
        }
    }
}

/// Every intermediate condition, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrendState {
    pub up_trend: bool,
    pub down_trend: bool,
    pub rsi_oversold_turn: bool,
    pub rsi_overbought_turn: bool,
    pub macd_cross_up: bool,
    pub macd_cross_down: bool,
}

pub struct TrendReversal {
    thresholds: TrendThresholds,
}

impl TrendReversal {
    pub fn new(thresholds: TrendThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate each sub-condition on the last two rows.
    pub fn diagnose(&self, snapshot: &IndicatorSnapshot) -> Result<TrendState, SignalError> {
        let t = &self.thresholds;
        let bars = snapshot.len();
        let warm = t.min_bars;
        let (prev, cur) = snapshot.last_two()?;

        let close = finite(cur.close, bars, warm)?;
        let ema_fast = finite(cur.ema_fast, bars, warm)?;
        let ema_slow = finite(cur.ema_slow, bars, warm)?;
        let rsi_prev = finite(prev.rsi, bars, warm)?;
        let rsi_cur = finite(cur.rsi, bars, warm)?;
        let macd_prev = required(prev.macd_line, "macd_line", bars, warm)?;
        let macd_cur = required(cur.macd_line, "macd_line", bars, warm)?;
        let sig_prev = required(prev.macd_signal, "macd_signal", bars, warm)?;
        let sig_cur = required(cur.macd_signal, "macd_signal", bars, warm)?;

        Ok(TrendState {
            up_trend: close > ema_fast && ema_fast > ema_slow,
            down_trend: close < ema_fast && ema_fast < ema_slow,
            rsi_oversold_turn: rsi_prev < t.rsi_oversold && rsi_cur > rsi_prev,
            rsi_overbought_turn: rsi_prev > t.rsi_overbought && rsi_cur < rsi_prev,
            macd_cross_up: crossed_above(macd_prev, macd_cur, sig_prev, sig_cur),
            macd_cross_down: crossed_below(macd_prev, macd_cur, sig_prev, sig_cur),
        })
    }
}

impl Default for TrendReversal {
    fn default() -> Self {
        Self::new(TrendThresholds::default())
    }
}

impl SignalStrategy for TrendReversal {
    fn name(&self) -> &'static str {
        "trend_reversal"
    }

    fn min_bars(&self) -> usize {
        self.thresholds.min_bars
    }

    fn cooldown_scope(&self) -> CooldownScope {
        CooldownScope::PerSymbolSide
    }

    fn default_cooldown_minutes(&self) -> u64 {
        self.thresholds.cooldown_minutes
    }

    fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            ema_fast: self.thresholds.ema_fast,
            ema_slow: self.thresholds.ema_slow,
            rsi_period: self.thresholds.rsi_period,
            macd: Some(self.thresholds.macd),
            volatility_period: None,
        }
    }

    fn classify(&self, snapshot: &IndicatorSnapshot) -> Result<Option<RuleHit>, SignalError> {
        let s = self.diagnose(snapshot)?;

        if s.up_trend && (s.rsi_oversold_turn || s.macd_cross_up) {
            let mut reasons = Vec::with_capacity(2);
            if s.rsi_oversold_turn {
                reasons.push(SignalReason::RsiOversoldTurn);
            }
            if s.macd_cross_up {
                reasons.push(SignalReason::MacdCrossUp);
            }
            return Ok(Some(RuleHit {
                side: Side::Buy,
                reasons,
            }));
        }

        if s.down_trend && (s.rsi_overbought_turn || s.macd_cross_down) {
            let mut reasons = Vec::with_capacity(2);
            if s.rsi_overbought_turn {
                reasons.push(SignalReason::RsiOverboughtTurn);
            }
            if s.macd_cross_down {
                reasons.push(SignalReason::MacdCrossDown);
            }
            return Ok(Some(RuleHit {
                side: Side::Sell,
                reasons,
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::macd::MacdSeries;
    use crate::market_data::PriceSeries;
    use crate::signals::fixtures::{banded_series, trend_with_pullback};
    use chrono::Duration;

    fn daily(closes: &[f64]) -> PriceSeries {
        banded_series("XAUUSD", closes, 0.004, Duration::days(1))
    }

    /// First prefix length (>= min_bars) whose last bar fires.
    fn first_hit(strategy: &TrendReversal, full: &PriceSeries) -> Option<(usize, RuleHit)> {
        (strategy.min_bars()..=full.len()).find_map(|len| {
            let series = full.truncated(len)?;
            let snap = IndicatorSnapshot::compute(&series, &strategy.indicator_params());
            strategy.classify(&snap).ok().flatten().map(|hit| (len, hit))
        })
    }

    fn hand_snapshot(n: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: vec![110.0; n],
            ema_fast: vec![105.0; n],
            ema_slow: vec![100.0; n],
            rsi: vec![50.0; n],
            macd: Some(MacdSeries {
                line: vec![1.0; n],
                signal: vec![1.0; n],
                histogram: vec![0.0; n],
            }),
            volatility_ratio: None,
        }
    }

    #[test]
    fn monotonic_rise_is_up_trend() {
        let closes: Vec<f64> = (0..250).map(|i| 1.0 + i as f64 * 0.001).collect();
        let strategy = TrendReversal::default();
        let snap = IndicatorSnapshot::compute(&daily(&closes), &strategy.indicator_params());
        let state = strategy.diagnose(&snap).unwrap();
        assert!(state.up_trend);
        assert!(!state.down_trend);
        assert!(!state.rsi_overbought_turn);
    }

    #[test]
    fn pullback_in_up_trend_buys_on_macd_cross() {
        let strategy = TrendReversal::default();
        let full = daily(&trend_with_pullback(100.0, 0.5, 0.3));
        let (len, hit) = first_hit(&strategy, &full).expect("pullback should trigger a buy");
        assert!(len > 246, "fired before the pullback ended: {len}");
        assert_eq!(hit.side, Side::Buy);
        assert!(hit.reasons.contains(&SignalReason::MacdCrossUp));
    }

    #[test]
    fn bounce_in_down_trend_sells_on_macd_cross() {
        let strategy = TrendReversal::default();
        let full = daily(&trend_with_pullback(400.0, -0.5, -0.3));
        let (_, hit) = first_hit(&strategy, &full).expect("bounce should trigger a sell");
        assert_eq!(hit.side, Side::Sell);
        assert!(hit.reasons.contains(&SignalReason::MacdCrossDown));
    }

    #[test]
    fn oversold_turn_in_up_trend_is_buy() {
        let mut snap = hand_snapshot(220);
        snap.rsi[218] = 25.0;
        snap.rsi[219] = 27.0;
        let hit = TrendReversal::default().classify(&snap).unwrap().unwrap();
        assert_eq!(hit.side, Side::Buy);
        assert_eq!(hit.reasons, vec![SignalReason::RsiOversoldTurn]);
    }

    #[test]
    fn oversold_turn_without_trend_is_nothing() {
        let mut snap = hand_snapshot(220);
        // ema_fast above close breaks the strict ordering
        snap.ema_fast[219] = 111.0;
        snap.rsi[218] = 25.0;
        snap.rsi[219] = 27.0;
        assert_eq!(TrendReversal::default().classify(&snap).unwrap(), None);
    }

    #[test]
    fn overbought_turn_in_down_trend_is_sell() {
        let mut snap = hand_snapshot(220);
        snap.close[219] = 90.0;
        snap.ema_fast[219] = 95.0;
        snap.ema_slow[219] = 100.0;
        snap.rsi[218] = 75.0;
        snap.rsi[219] = 72.0;
        let hit = TrendReversal::default().classify(&snap).unwrap().unwrap();
        assert_eq!(hit.side, Side::Sell);
        assert_eq!(hit.reasons, vec![SignalReason::RsiOverboughtTurn]);
    }

    #[test]
    fn both_triggers_are_recorded() {
        let mut snap = hand_snapshot(220);
        snap.rsi[218] = 20.0;
        snap.rsi[219] = 24.0;
        if let Some(m) = snap.macd.as_mut() {
            m.line[218] = 0.9;
            m.line[219] = 1.1;
        }
        let hit = TrendReversal::default().classify(&snap).unwrap().unwrap();
        assert_eq!(
            hit.reasons,
            vec![SignalReason::RsiOversoldTurn, SignalReason::MacdCrossUp]
        );
    }

    #[test]
    fn missing_macd_is_reported() {
        let mut snap = hand_snapshot(220);
        snap.macd = None;
        assert_eq!(
            TrendReversal::default().classify(&snap),
            Err(SignalError::MissingIndicator("macd_line"))
        );
    }
}
