// =============================================================================
// Decision Envelope — auditable record of every per-symbol evaluation
// =============================================================================
//
// Every symbol evaluated in a cycle produces exactly one envelope, whether a
// signal fired, was held back by the cooldown, no rule held, or the cycle for
// that symbol failed. The envelopes back the `/api/v1/decisions` endpoint.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SignalError;
use crate::signals::{reason_label, Signal, SignalReason};
use crate::types::Side;

/// Final outcome recorded for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Fired,
    Cooldown,
    Hold,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionEnvelope {
    /// UUID v4.
    pub id: String,
    pub symbol: String,
    pub strategy: String,
    pub outcome: Outcome,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,

    /// Last close at decision time (fired signals only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Reason label for rule hits, error text for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Machine-readable error code (failures only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,

    /// Set when the notification for a fired signal could not be delivered.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub notify_failed: bool,

    pub created_at: DateTime<Utc>,
}

impl DecisionEnvelope {
    fn base(symbol: impl Into<String>, strategy: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            strategy: strategy.into(),
            outcome,
            side: None,
            price: None,
            reason: None,
            error_code: None,
            notify_failed: false,
            created_at: Utc::now(),
        }
    }

    pub fn fired(signal: &Signal) -> Self {
        Self {
            side: Some(signal.side),
            price: Some(signal.price),
            reason: Some(signal.reason_label()),
            created_at: signal.timestamp,
            ..Self::base(&signal.symbol, signal.strategy, Outcome::Fired)
        }
    }

    pub fn cooldown(
        symbol: impl Into<String>,
        strategy: impl Into<String>,
        side: Side,
        reasons: &[SignalReason],
    ) -> Self {
        Self {
            side: Some(side),
            reason: Some(reason_label(reasons)),
            ..Self::base(symbol, strategy, Outcome::Cooldown)
        }
    }

    pub fn hold(symbol: impl Into<String>, strategy: impl Into<String>) -> Self {
        Self::base(symbol, strategy, Outcome::Hold)
    }

    pub fn error(
        symbol: impl Into<String>,
        strategy: impl Into<String>,
        err: &SignalError,
    ) -> Self {
        Self {
            reason: Some(err.to_string()),
            error_code: Some(err.code()),
            ..Self::base(symbol, strategy, Outcome::Error)
        }
    }
}
