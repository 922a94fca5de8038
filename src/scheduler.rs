// =============================================================================
// Polling Scheduler
// =============================================================================
//
// Every `check_every_min` minutes:
//   for each configured symbol, in order:
//     fetch series → engine.evaluate → record decision
//     on Fire: format → notify (failure is logged, never retried this cycle)
//
// A failure for one symbol never aborts the cycle for the others.
// =============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::app_state::AppState;
use crate::decision_envelope::DecisionEnvelope;
use crate::error::SignalError;
use crate::feed::{FeedRequest, PriceFeed};
use crate::formatter::format_signal;
use crate::notify::Notifier;
use crate::strategy::Verdict;

/// Counts for one pass over the symbol list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub evaluated: usize,
    pub fired: usize,
    pub cooling_down: usize,
    pub held: usize,
    pub errors: usize,
    pub notify_failures: usize,
}

/// Run one cycle over every configured symbol as of `now`.
pub async fn run_cycle<F, N>(
    state: &AppState,
    feed: &F,
    notifier: &N,
    now: DateTime<Utc>,
) -> CycleReport
where
    F: PriceFeed,
    N: Notifier,
{
    let config = &state.config;
    let strategy = state.engine.strategy_name();
    let mut report = CycleReport::default();

    for symbol in &config.symbols {
        report.evaluated += 1;

        let request = FeedRequest {
            ticker: config.ticker_for(symbol).to_string(),
            interval: config.effective_timeframe().to_string(),
            range: config.effective_lookback().to_string(),
        };

        let verdict = match feed.fetch_series(symbol, &request).await {
            Ok(series) => state.engine.evaluate(&series, now),
            Err(e) => Err(e),
        };
        if let Ok(v) = &verdict {
            debug!(symbol = %symbol, outcome = v.label(), "symbol evaluated");
        }

        match verdict {
            Ok(Verdict::Fire(signal)) => {
                report.fired += 1;
                let mut envelope = DecisionEnvelope::fired(&signal);

                let message = format_signal(
                    &signal,
                    config.effective_timeframe(),
                    config.exit_hints.get(symbol),
                );
                if let Err(e) = notifier.notify(&message).await {
                    report.notify_failures += 1;
                    envelope.notify_failed = true;
                    error!(symbol = %symbol, error = %e, "notification failed");
                    state.push_error(Some(symbol.as_str()), e.to_string(), Some(e.code()));
                }

                state.push_decision(envelope);
            }
            Ok(Verdict::CoolingDown { side, reasons }) => {
                report.cooling_down += 1;
                state.push_decision(DecisionEnvelope::cooldown(symbol, strategy, side, &reasons));
            }
            Ok(Verdict::Hold) => {
                report.held += 1;
                state.push_decision(DecisionEnvelope::hold(symbol, strategy));
            }
            Err(e) => {
                report.errors += 1;
                log_symbol_error(symbol, &e);
                state.push_error(Some(symbol.as_str()), e.to_string(), Some(e.code()));
                state.push_decision(DecisionEnvelope::error(symbol, strategy, &e));
            }
        }
    }

    state.record_cycle(now);
    report
}

fn log_symbol_error(symbol: &str, e: &SignalError) {
    match e {
        // Expected right after market open or for thin histories.
        SignalError::InsufficientData { .. } => warn!(symbol, error = %e, "symbol skipped"),
        _ => error!(symbol, error = %e, code = e.code(), "symbol evaluation failed"),
    }
}

/// Poll forever. Returns only if the task is cancelled.
pub async fn run_scheduler<F, N>(state: Arc<AppState>, feed: F, notifier: N)
where
    F: PriceFeed,
    N: Notifier,
{
    let period = Duration::from_secs(state.config.check_every_min.max(1).saturating_mul(60));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        every_min = state.config.check_every_min,
        symbols = ?state.config.symbols,
        strategy = state.engine.strategy_name(),
        min_bars = state.engine.min_bars(),
        "scheduler started"
    );

    loop {
        ticker.tick().await;
        let report = run_cycle(&state, &feed, &notifier, Utc::now()).await;
        info!(
            evaluated = report.evaluated,
            fired = report.fired,
            cooling_down = report.cooling_down,
            held = report.held,
            errors = report.errors,
            notify_failures = report.notify_failures,
            "cycle complete"
        );
    }
}
