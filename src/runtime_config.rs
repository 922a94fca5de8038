// =============================================================================
// Runtime Configuration — signal service settings
// =============================================================================
//
// Loaded once at startup from a JSON file, then overridden from the
// environment. Every field carries a serde default so a partial (or missing)
// file still yields a usable configuration.
//
// Secrets (Telegram token / chat id) are never stored here; they are read
// from the environment by the notifier.
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cooldown::window_minutes;
use crate::formatter::ExitHint;
use crate::signals::{IntradayThresholds, TrendThresholds};
use crate::types::StrategyKind;

pub const DEFAULT_CONFIG_PATH: &str = "signals_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    vec!["EURUSD".to_string(), "XAUUSD".to_string()]
}

fn default_tickers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("EURUSD".to_string(), "EURUSD=X".to_string()),
        ("XAUUSD".to_string(), "XAUUSD=X".to_string()),
    ])
}

fn default_check_every_min() -> u64 {
    10
}

fn default_exit_hints() -> BTreeMap<String, ExitHint> {
    BTreeMap::from([
        (
            "EURUSD".to_string(),
            ExitHint::Percent {
                tp_pct: 0.004,
                sl_pips: 30,
            },
        ),
        (
            "XAUUSD".to_string(),
            ExitHint::Absolute {
                tp_usd: 10.0,
                sl_usd: 7.0,
            },
        ),
    ])
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Symbols evaluated every cycle, in order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Symbol -> provider ticker. Unmapped symbols are sent as-is.
    #[serde(default = "default_tickers")]
    pub tickers: BTreeMap<String, String>,

    /// Rule set to run.
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Bar interval requested from the provider. Strategy default if unset.
    #[serde(default)]
    pub timeframe: Option<String>,

    /// History range requested from the provider. Strategy default if unset.
    #[serde(default)]
    pub lookback: Option<String>,

    /// Minutes between polling cycles.
    #[serde(default = "default_check_every_min")]
    pub check_every_min: u64,

    /// Cooldown window in minutes. Strategy default if unset.
    #[serde(default)]
    pub cooldown_min: Option<u64>,

    #[serde(default)]
    pub intraday: IntradayThresholds,

    #[serde(default)]
    pub trend: TrendThresholds,

    /// Take-profit / stop-loss hints appended to messages, per symbol.
    #[serde(default = "default_exit_hints")]
    pub exit_hints: BTreeMap<String, ExitHint>,

    /// Address of the health/status HTTP server.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            tickers: default_tickers(),
            strategy: StrategyKind::default(),
            timeframe: None,
            lookback: None,
            check_every_min: default_check_every_min(),
            cooldown_min: None,
            intraday: IntradayThresholds::default(),
            trend: TrendThresholds::default(),
            exit_hints: default_exit_hints(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults with
    /// a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            strategy = %config.strategy,
            "config loaded"
        );

        Ok(config)
    }

    /// Apply environment overrides. `lookup` is `std::env::var(..).ok()` in
    /// production; tests pass a closure over a map.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(syms) = lookup("SIGNAL_SYMBOLS") {
            let parsed: Vec<String> = syms
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                self.symbols = parsed;
            }
        }

        if let Some(raw) = lookup("SIGNAL_STRATEGY") {
            match raw.parse::<StrategyKind>() {
                Ok(kind) => self.strategy = kind,
                Err(e) => warn!(value = %raw, error = %e, "ignoring SIGNAL_STRATEGY"),
            }
        }

        if let Some(raw) = lookup("CHECK_EVERY_MIN") {
            match raw.trim().parse::<u64>() {
                Ok(v) => self.check_every_min = v,
                Err(e) => warn!(value = %raw, error = %e, "ignoring CHECK_EVERY_MIN"),
            }
        }

        if let Some(raw) = lookup("COOLDOWN_MIN") {
            match raw.trim().parse::<u64>() {
                Ok(v) => self.cooldown_min = Some(v),
                Err(e) => warn!(value = %raw, error = %e, "ignoring COOLDOWN_MIN"),
            }
        }

        // SIGNAL_BIND_ADDR wins over PORT.
        if let Some(addr) = lookup("SIGNAL_BIND_ADDR") {
            self.bind_addr = addr;
        } else if let Some(raw) = lookup("PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.bind_addr = format!("0.0.0.0:{port}"),
                Err(e) => warn!(value = %raw, error = %e, "ignoring PORT"),
            }
        }
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            bail!("no symbols configured");
        }
        if self.check_every_min == 0 {
            bail!("check_every_min must be at least 1");
        }
        if self.check_every_min.checked_mul(60).is_none() {
            bail!("check_every_min {} is out of range", self.check_every_min);
        }
        match self.cooldown_window() {
            None => bail!(
                "cooldown of {} minutes is out of range",
                self.effective_cooldown_min()
            ),
            Some(w) if w <= Duration::zero() => bail!("cooldown must be at least 1 minute"),
            Some(_) => {}
        }

        let periods = [
            ("intraday.ema_fast", self.intraday.ema_fast),
            ("intraday.ema_slow", self.intraday.ema_slow),
            ("intraday.rsi_period", self.intraday.rsi_period),
            ("intraday.volatility_period", self.intraday.volatility_period),
            ("trend.ema_fast", self.trend.ema_fast),
            ("trend.ema_slow", self.trend.ema_slow),
            ("trend.rsi_period", self.trend.rsi_period),
            ("trend.macd.fast", self.trend.macd.fast),
            ("trend.macd.slow", self.trend.macd.slow),
            ("trend.macd.signal", self.trend.macd.signal),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, period)| *period == 0) {
            bail!("{name} must be at least 1");
        }

        if self.intraday.volatility_floor < 0.0 {
            bail!("intraday.volatility_floor must not be negative");
        }
        if self.intraday.min_bars < 2 || self.trend.min_bars < 2 {
            bail!("min_bars must be at least 2");
        }
        if !(0.0..=100.0).contains(&self.trend.rsi_oversold)
            || !(0.0..=100.0).contains(&self.trend.rsi_overbought)
        {
            bail!("RSI bands must lie within 0..=100");
        }
        Ok(())
    }

    pub fn effective_timeframe(&self) -> &str {
        match (&self.timeframe, self.strategy) {
            (Some(tf), _) => tf.as_str(),
            (None, StrategyKind::IntradayCross) => "15m",
            (None, StrategyKind::TrendReversal) => "1d",
        }
    }

    pub fn effective_lookback(&self) -> &str {
        match (&self.lookback, self.strategy) {
            (Some(lb), _) => lb.as_str(),
            (None, StrategyKind::IntradayCross) => "7d",
            (None, StrategyKind::TrendReversal) => "2y",
        }
    }

    pub fn effective_cooldown_min(&self) -> u64 {
        self.cooldown_min.unwrap_or(match self.strategy {
            StrategyKind::IntradayCross => self.intraday.cooldown_minutes,
            StrategyKind::TrendReversal => self.trend.cooldown_minutes,
        })
    }

    /// Cooldown window in force, `None` if it does not fit a `Duration`.
    pub fn cooldown_window(&self) -> Option<Duration> {
        window_minutes(self.effective_cooldown_min())
    }

    /// Provider ticker for `symbol`.
    pub fn ticker_for<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.tickers.get(symbol).map(String::as_str).unwrap_or(symbol)
    }
}
