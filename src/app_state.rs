// =============================================================================
// Central Application State
// =============================================================================
//
// Shared between the scheduler task and the HTTP handlers via `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counters for the state version and cycle count.
//   - parking_lot::RwLock for the bounded decision / error rings.
//   - The cooldown gate manages its own interior mutability.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::cooldown::{CooldownEntry, CooldownGate};
use crate::decision_envelope::DecisionEnvelope;
use crate::runtime_config::RuntimeConfig;
use crate::strategy::SignalEngine;

// =============================================================================
// Error Record
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub symbol: Option<String>,
    pub message: String,
    pub code: Option<String>,
    pub at: DateTime<Utc>,
}

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;
/// Maximum number of recent decisions to retain.
const MAX_RECENT_DECISIONS: usize = 100;

// =============================================================================
// AppState
// =============================================================================

pub struct AppState {
    /// Bumped on every recorded decision or error.
    pub state_version: AtomicU64,
    /// Completed polling cycles.
    pub cycles: AtomicU64,

    pub config: RuntimeConfig,
    pub engine: SignalEngine,

    pub recent_decisions: RwLock<Vec<DecisionEnvelope>>,
    pub recent_errors: RwLock<Vec<ErrorRecord>>,
    pub last_cycle_at: RwLock<Option<DateTime<Utc>>>,

    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build state with a fresh cooldown gate.
    pub fn new(config: RuntimeConfig) -> Self {
        let engine = SignalEngine::from_config(&config, Arc::new(CooldownGate::new()));
        Self::with_engine(config, engine)
    }

    pub fn with_engine(config: RuntimeConfig, engine: SignalEngine) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            cycles: AtomicU64::new(0),
            config,
            engine,
            recent_decisions: RwLock::new(Vec::new()),
            recent_errors: RwLock::new(Vec::new()),
            last_cycle_at: RwLock::new(None),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    pub fn record_cycle(&self, at: DateTime<Utc>) {
        self.cycles.fetch_add(1, Ordering::SeqCst);
        *self.last_cycle_at.write() = Some(at);
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error; the ring keeps the newest [`MAX_RECENT_ERRORS`].
    pub fn push_error(&self, symbol: Option<&str>, message: String, code: Option<&str>) {
        let record = ErrorRecord {
            symbol: symbol.map(str::to_string),
            message,
            code: code.map(str::to_string),
            at: Utc::now(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        if errors.len() > MAX_RECENT_ERRORS {
            let excess = errors.len() - MAX_RECENT_ERRORS;
            errors.drain(..excess);
        }
        drop(errors);

        self.increment_version();
    }

    // ── Decision Audit ──────────────────────────────────────────────────

    /// Record a decision; the ring keeps the newest [`MAX_RECENT_DECISIONS`].
    pub fn push_decision(&self, envelope: DecisionEnvelope) {
        let mut decisions = self.recent_decisions.write();
        decisions.push(envelope);
        if decisions.len() > MAX_RECENT_DECISIONS {
            let excess = decisions.len() - MAX_RECENT_DECISIONS;
            decisions.drain(..excess);
        }
        drop(decisions);

        self.increment_version();
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            status: "ok",
            strategy: self.engine.strategy_name(),
            symbols: self.config.symbols.clone(),
            timeframe: self.config.effective_timeframe().to_string(),
            check_every_min: self.config.check_every_min,
            cooldown_min: self.engine.window().num_minutes(),
            server_time: Utc::now(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            cycles: self.cycles.load(Ordering::SeqCst),
            last_cycle_at: *self.last_cycle_at.read(),
            state_version: self.current_state_version(),
        }
    }

    pub fn cooldowns(&self) -> Vec<CooldownEntry> {
        self.engine.gate().entries(Utc::now(), self.engine.window())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub strategy: &'static str,
    pub symbols: Vec<String>,
    pub timeframe: String,
    pub check_every_min: u64,
    pub cooldown_min: i64,
    pub server_time: DateTime<Utc>,
    pub uptime_secs: u64,
    pub cycles: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub state_version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_ring_is_bounded() {
        let state = AppState::new(RuntimeConfig::default());
        for i in 0..(MAX_RECENT_DECISIONS + 7) {
            state.push_decision(DecisionEnvelope::hold(format!("SYM{i}"), "intraday_cross"));
        }
        let decisions = state.recent_decisions.read();
        assert_eq!(decisions.len(), MAX_RECENT_DECISIONS);
        assert_eq!(decisions[0].symbol, "SYM7");
    }

    #[test]
    fn error_ring_is_bounded_and_bumps_version() {
        let state = AppState::new(RuntimeConfig::default());
        let before = state.current_state_version();
        for i in 0..(MAX_RECENT_ERRORS + 3) {
            state.push_error(Some("EURUSD"), format!("boom {i}"), Some("DATA_UNAVAILABLE"));
        }
        assert_eq!(state.recent_errors.read().len(), MAX_RECENT_ERRORS);
        assert_eq!(
            state.current_state_version(),
            before + (MAX_RECENT_ERRORS + 3) as u64
        );
    }

    #[test]
    fn health_reflects_config() {
        let mut cfg = RuntimeConfig::default();
        cfg.check_every_min = 5;
        let state = AppState::new(cfg);
        state.record_cycle(Utc::now());

        let health = state.health();
        assert_eq!(health.status, "ok");
        assert_eq!(health.strategy, "intraday_cross");
        assert_eq!(health.symbols, vec!["EURUSD", "XAUUSD"]);
        assert_eq!(health.check_every_min, 5);
        assert_eq!(health.cooldown_min, 180);
        assert_eq!(health.cycles, 1);
        assert!(health.last_cycle_at.is_some());
    }
}
