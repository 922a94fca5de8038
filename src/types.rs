// =============================================================================
// Shared types used across the signal service
// =============================================================================

use serde::{Deserialize, Serialize};

/// Direction of a fired signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Which rule set the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// EMA 20/50 crossover or RSI midline cross on intraday bars.
    IntradayCross,
    /// EMA 50/200 trend filter with RSI/MACD reversal triggers on daily bars.
    TrendReversal,
}

impl Default for StrategyKind {
    fn default() -> Self {
        Self::IntradayCross
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IntradayCross => write!(f, "intraday_cross"),
            Self::TrendReversal => write!(f, "trend_reversal"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intraday_cross" | "intraday" | "a" => Ok(Self::IntradayCross),
            "trend_reversal" | "trend" | "b" => Ok(Self::TrendReversal),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_serialises_uppercase() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(Side::Sell.to_string(), "SELL");
    }

    #[test]
    fn strategy_kind_parses_aliases() {
        assert_eq!("Trend".parse::<StrategyKind>(), Ok(StrategyKind::TrendReversal));
        assert_eq!(
            " intraday_cross ".parse::<StrategyKind>(),
            Ok(StrategyKind::IntradayCross)
        );
        assert!("scalper".parse::<StrategyKind>().is_err());
    }
}
