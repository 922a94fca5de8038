// =============================================================================
// Signals Module
// =============================================================================
//
// Rule sets that turn an indicator snapshot into a directional call:
// - IntradayCross  — EMA 20/50 crossover or RSI midline cross, volatility gated
// - TrendReversal  — EMA 50/200 trend filter with RSI/MACD reversal triggers
//
// Both implement `SignalStrategy`, so the engine can swap them at startup.

pub mod intraday_cross;
pub mod trend_reversal;

pub use intraday_cross::{IntradayCross, IntradayThresholds};
pub use trend_reversal::{TrendReversal, TrendState, TrendThresholds};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cooldown::CooldownScope;
use crate::error::SignalError;
use crate::indicators::{IndicatorParams, IndicatorSnapshot};
use crate::types::Side;

/// Sub-condition that made a rule fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalReason {
    EmaBullCross,
    EmaBearCross,
    RsiCrossUp,
    RsiCrossDown,
    RsiOversoldTurn,
    RsiOverboughtTurn,
    MacdCrossUp,
    MacdCrossDown,
}

impl SignalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmaBullCross => "ema_bull_cross",
            Self::EmaBearCross => "ema_bear_cross",
            Self::RsiCrossUp => "rsi_cross_up",
            Self::RsiCrossDown => "rsi_cross_down",
            Self::RsiOversoldTurn => "rsi_oversold_turn",
            Self::RsiOverboughtTurn => "rsi_overbought_turn",
            Self::MacdCrossUp => "macd_cross_up",
            Self::MacdCrossDown => "macd_cross_down",
        }
    }
}

impl std::fmt::Display for SignalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join reasons as `a+b` for messages and logs.
pub fn reason_label(reasons: &[SignalReason]) -> String {
    reasons
        .iter()
        .map(SignalReason::as_str)
        .collect::<Vec<_>>()
        .join("+")
}

/// A rule that held on the latest bar, before the cooldown is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub side: Side,
    pub reasons: Vec<SignalReason>,
}

/// A fired signal, ready for formatting and delivery. Not retained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub reasons: Vec<SignalReason>,
    pub strategy: &'static str,
    /// Timestamp of the bar the signal was computed on.
    pub bar_time: DateTime<Utc>,
    /// Wall-clock time the signal was admitted.
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    pub fn reason_label(&self) -> String {
        reason_label(&self.reasons)
    }
}

/// A pluggable rule set.
pub trait SignalStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bars required before `classify` may be called.
    fn min_bars(&self) -> usize;

    /// Granularity of the cooldown key for this rule set.
    fn cooldown_scope(&self) -> CooldownScope;

    fn default_cooldown_minutes(&self) -> u64;

    fn indicator_params(&self) -> IndicatorParams;

    /// Inspect the last two rows. `Ok(None)` means no rule holds.
    fn classify(&self, snapshot: &IndicatorSnapshot) -> Result<Option<RuleHit>, SignalError>;
}

/// `prev <= other_prev && cur > other_cur`
pub(crate) fn crossed_above(prev: f64, cur: f64, other_prev: f64, other_cur: f64) -> bool {
    prev <= other_prev && cur > other_cur
}

/// `prev >= other_prev && cur < other_cur`
pub(crate) fn crossed_below(prev: f64, cur: f64, other_prev: f64, other_cur: f64) -> bool {
    prev >= other_prev && cur < other_cur
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_helpers() {
        assert!(crossed_above(1.0, 2.0, 1.0, 1.5));
        assert!(!crossed_above(1.6, 2.0, 1.5, 1.5));
        assert!(crossed_below(2.0, 1.0, 2.0, 1.5));
        assert!(!crossed_below(1.0, 1.0, 1.5, 1.5));
    }

    #[test]
    fn reasons_join_with_plus() {
        let label = reason_label(&[SignalReason::EmaBullCross, SignalReason::RsiCrossUp]);
        assert_eq!(label, "ema_bull_cross+rsi_cross_up");
    }
}
