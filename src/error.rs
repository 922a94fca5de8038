// =============================================================================
// Signal Errors — domain error kinds for the evaluation pipeline
// =============================================================================
//
// Every variant is non-fatal for the scheduler: the affected symbol is skipped
// for the current cycle and the remaining symbols are still evaluated.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// The series is too short (or still warming up) for the strategy.
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    /// The price provider returned nothing usable for the symbol.
    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// The notification transport rejected or failed to deliver a message.
    #[error("notification failed: {0}")]
    NotifyFailure(String),

    /// Bars violate the series invariants (ordering, positive close).
    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    /// A strategy asked for a column the snapshot was not computed with.
    #[error("indicator not computed: {0}")]
    MissingIndicator(&'static str),
}

impl SignalError {
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable label used in decision envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::DataUnavailable { .. } => "DATA_UNAVAILABLE",
            Self::NotifyFailure(_) => "NOTIFY_FAILED",
            Self::InvalidSeries(_) => "INVALID_SERIES",
            Self::MissingIndicator(_) => "MISSING_INDICATOR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_both_counts() {
        let err = SignalError::InsufficientData {
            required: 60,
            available: 12,
        };
        assert_eq!(err.to_string(), "insufficient data: need 60 bars, have 12");
        assert_eq!(err.code(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn unavailable_helper_builds_variant() {
        let err = SignalError::unavailable("EURUSD", "empty response");
        assert_eq!(
            err,
            SignalError::DataUnavailable {
                symbol: "EURUSD".into(),
                reason: "empty response".into()
            }
        );
    }
}
