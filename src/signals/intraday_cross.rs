// =============================================================================
// Intraday Cross — EMA crossover / RSI midline cross on 15-minute bars
// =============================================================================
//
// Gate:  volatility_ratio[-1] > volatility_floor   (else no signal at all)
//
// BUY   when close[-1] > ema_fast[-1] and either
//         - ema_fast crosses above ema_slow, or
//         - RSI crosses up through the midline.
// SELL  when either
//         - ema_fast crosses below ema_slow, or
//         - RSI was above the midline and drops to the sell trigger or lower.
//
// BUY is checked first; if both hold on the same bar, BUY wins.
// Cooldown is shared by both sides of a symbol.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{crossed_above, crossed_below, RuleHit, SignalReason, SignalStrategy};
use crate::cooldown::CooldownScope;
use crate::error::SignalError;
use crate::indicators::snapshot::{finite, required};
use crate::indicators::{IndicatorParams, IndicatorSnapshot};
use crate::types::Side;

/// Tunables for the intraday rule set. Defaults match the deployed bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntradayThresholds {
    pub min_bars: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub volatility_period: usize,
    /// Minimum average range as a fraction of price (0.001 = 0.10%).
    pub volatility_floor: f64,
    /// RSI level that must be crossed upward for a BUY.
    pub rsi_midline: f64,
    /// RSI level at or below which a drop from above the midline is a SELL.
    pub rsi_sell_trigger: f64,
    pub cooldown_minutes: u64,
}

impl Default for IntradayThresholds {
    fn default() -> Self {
        Self {
            min_bars: 60,
            ema_fast: 20,
            ema_slow: 50,
            rsi_period: 14,
            volatility_period: 14,
            volatility_floor: 0.001,
            rsi_midline: 50.0,
            rsi_sell_trigger: 45.0,
            cooldown_minutes: 180,
        }
    }
}

pub struct IntradayCross {
    thresholds: IntradayThresholds,
}

impl IntradayCross {
    pub fn new(thresholds: IntradayThresholds) -> Self {
        Self { thresholds }
    }
}

impl Default for IntradayCross {
    fn default() -> Self {
        Self::new(IntradayThresholds::default())
    }
}

impl SignalStrategy for IntradayCross {
    fn name(&self) -> &'static str {
        "intraday_cross"
    }

    fn min_bars(&self) -> usize {
        self.thresholds.min_bars
    }

    fn cooldown_scope(&self) -> CooldownScope {
        CooldownScope::PerSymbol
    }

    fn default_cooldown_minutes(&self) -> u64 {
        self.thresholds.cooldown_minutes
    }

    fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            ema_fast: self.thresholds.ema_fast,
            ema_slow: self.thresholds.ema_slow,
            rsi_period: self.thresholds.rsi_period,
            macd: None,
            volatility_period: Some(self.thresholds.volatility_period),
        }
    }

    fn classify(&self, snapshot: &IndicatorSnapshot) -> Result<Option<RuleHit>, SignalError> {
        let t = &self.thresholds;
        let bars = snapshot.len();
        let warm = t.min_bars;
        let (prev, cur) = snapshot.last_two()?;

        let vol = required(cur.volatility_ratio, "volatility_ratio", bars, warm)?;
        if vol <= t.volatility_floor {
            debug!(vol, floor = t.volatility_floor, "volatility gate closed");
            return Ok(None);
        }

        let fast_prev = finite(prev.ema_fast, bars, warm)?;
        let fast_cur = finite(cur.ema_fast, bars, warm)?;
        let slow_prev = finite(prev.ema_slow, bars, warm)?;
        let slow_cur = finite(cur.ema_slow, bars, warm)?;
        let rsi_prev = finite(prev.rsi, bars, warm)?;
        let rsi_cur = finite(cur.rsi, bars, warm)?;

        let ema_bull_cross = crossed_above(fast_prev, fast_cur, slow_prev, slow_cur);
        let ema_bear_cross = crossed_below(fast_prev, fast_cur, slow_prev, slow_cur);
        let rsi_up = rsi_prev < t.rsi_midline && rsi_cur >= t.rsi_midline;
        let rsi_down = rsi_prev > t.rsi_midline && rsi_cur <= t.rsi_sell_trigger;
        let price_above_fast = cur.close > fast_cur;

        if price_above_fast && (ema_bull_cross || rsi_up) {
            let mut reasons = Vec::with_capacity(2);
            if ema_bull_cross {
                reasons.push(SignalReason::EmaBullCross);
            }
            if rsi_up {
                reasons.push(SignalReason::RsiCrossUp);
            }
            return Ok(Some(RuleHit {
                side: Side::Buy,
                reasons,
            }));
        }

        if ema_bear_cross || rsi_down {
            let mut reasons = Vec::with_capacity(2);
            if ema_bear_cross {
                reasons.push(SignalReason::EmaBearCross);
            }
            if rsi_down {
                reasons.push(SignalReason::RsiCrossDown);
            }
            return Ok(Some(RuleHit {
                side: Side::Sell,
                reasons,
            }));
        }

        Ok(None)
    }
}
