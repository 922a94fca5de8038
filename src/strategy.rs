// =============================================================================
// Signal Engine — evaluates one series end to end
// =============================================================================
//
// Pipeline:
//   1. Reject series shorter than the strategy minimum (InsufficientData)
//   2. Compute the indicator snapshot from the full series
//   3. Classify the last two rows with the configured rule set
//   4. Ask the cooldown gate to admit the (symbol[, side]) key
//   5. Return Fire / CoolingDown / Hold
//
// The gate mutation in step 4 is the only side effect.
// =============================================================================

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::cooldown::{window_minutes, CooldownGate};
use crate::error::SignalError;
use crate::indicators::IndicatorSnapshot;
use crate::market_data::PriceSeries;
use crate::runtime_config::RuntimeConfig;
use crate::signals::{
    reason_label, IntradayCross, Signal, SignalReason, SignalStrategy, TrendReversal,
};
use crate::types::{Side, StrategyKind};

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// A rule held and the cooldown admitted it.
    Fire(Signal),
    /// A rule held but the key is still cooling down.
    CoolingDown {
        side: Side,
        reasons: Vec<SignalReason>,
    },
    /// No rule held on the latest bar.
    Hold,
}

impl Verdict {
    #[cfg(test)]
    pub fn into_signal(self) -> Option<Signal> {
        match self {
            Self::Fire(signal) => Some(signal),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fire(_) => "FIRED",
            Self::CoolingDown { .. } => "COOLDOWN",
            Self::Hold => "HOLD",
        }
    }
}

/// Build the rule set named by the config.
pub fn build_strategy(config: &RuntimeConfig) -> Box<dyn SignalStrategy> {
    match config.strategy {
        StrategyKind::IntradayCross => Box::new(IntradayCross::new(config.intraday.clone())),
        StrategyKind::TrendReversal => Box::new(TrendReversal::new(config.trend.clone())),
    }
}

pub struct SignalEngine {
    strategy: Box<dyn SignalStrategy>,
    gate: Arc<CooldownGate>,
    window: Duration,
}

impl SignalEngine {
    pub fn new(
        strategy: Box<dyn SignalStrategy>,
        gate: Arc<CooldownGate>,
        window: Duration,
    ) -> Self {
        Self {
            strategy,
            gate,
            window,
        }
    }

    /// Engine whose cooldown window is the strategy's own default.
    pub fn with_default_window(strategy: Box<dyn SignalStrategy>, gate: Arc<CooldownGate>) -> Self {
        let window = window_minutes(strategy.default_cooldown_minutes()).unwrap_or(Duration::MAX);
        Self::new(strategy, gate, window)
    }

    /// A window too large for `Duration` saturates, so the key never re-fires.
    pub fn from_config(config: &RuntimeConfig, gate: Arc<CooldownGate>) -> Self {
        let strategy = build_strategy(config);
        let Some(minutes) = config.cooldown_min else {
            return Self::with_default_window(strategy, gate);
        };
        let window = window_minutes(minutes).unwrap_or_else(|| {
            warn!(cooldown_min = minutes, "cooldown window out of range, saturating");
            Duration::MAX
        });
        Self::new(strategy, gate, window)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn min_bars(&self) -> usize {
        self.strategy.min_bars()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn gate(&self) -> &Arc<CooldownGate> {
        &self.gate
    }

    /// Evaluate `series` as of wall-clock `now`.
    pub fn evaluate(
        &self,
        series: &PriceSeries,
        now: DateTime<Utc>,
    ) -> Result<Verdict, SignalError> {
        let required = self.strategy.min_bars();
        if series.len() < required {
            return Err(SignalError::InsufficientData {
                required,
                available: series.len(),
            });
        }

        let snapshot = IndicatorSnapshot::compute(series, &self.strategy.indicator_params());
        let Some(hit) = self.strategy.classify(&snapshot)? else {
            debug!(symbol = series.symbol(), strategy = self.strategy.name(), "no rule held");
            return Ok(Verdict::Hold);
        };

        let key = self.strategy.cooldown_scope().key(series.symbol(), hit.side);
        if !self.gate.allow(&key, now, self.window) {
            debug!(
                key = %key,
                side = %hit.side,
                last_fired = ?self.gate.last_fired(&key),
                reasons = %reason_label(&hit.reasons),
                "signal suppressed by cooldown"
            );
            return Ok(Verdict::CoolingDown {
                side: hit.side,
                reasons: hit.reasons,
            });
        }

        let signal = Signal {
            symbol: series.symbol().to_string(),
            side: hit.side,
            price: series.last_close(),
            reasons: hit.reasons,
            strategy: self.strategy.name(),
            bar_time: series.last_timestamp(),
            timestamp: now,
        };

        info!(
            symbol = %signal.symbol,
            side = %signal.side,
            price = signal.price,
            reasons = %signal.reason_label(),
            strategy = signal.strategy,
            "signal admitted"
        );

        Ok(Verdict::Fire(signal))
    }
}
