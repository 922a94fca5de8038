// =============================================================================
// Signal Formatter — human-readable notification text
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::signals::Signal;

/// Optional take-profit / stop-loss guidance appended to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitHint {
    /// Target as a fraction of price (0.004 = 0.4%), stop in pips.
    Percent { tp_pct: f64, sl_pips: u32 },
    /// Target and stop as absolute dollar distances.
    Absolute { tp_usd: f64, sl_usd: f64 },
}

impl ExitHint {
    pub fn render(&self) -> String {
        match self {
            Self::Percent { tp_pct, sl_pips } => {
                format!("TP ~{:.1}% | SL {} pips", tp_pct * 100.0, sl_pips)
            }
            Self::Absolute { tp_usd, sl_usd } => format!("TP ~${tp_usd:.0} | SL ${sl_usd:.0}"),
        }
    }
}

pub fn format_signal(signal: &Signal, timeframe: &str, hint: Option<&ExitHint>) -> String {
    let mut lines = vec![
        format!("🔔 Signal — {}", signal.symbol),
        format!("Action: {}", signal.side),
        format!("Price: {:.5}", signal.price),
        format!("TF: {timeframe}"),
        format!("Reason: {}", signal.reason_label()),
    ];
    if let Some(hint) = hint {
        lines.push(hint.render());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalReason;
    use crate::types::Side;
    use chrono::{TimeZone, Utc};

    fn signal(symbol: &str, side: Side, price: f64) -> Signal {
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        Signal {
            symbol: symbol.to_string(),
            side,
            price,
            reasons: vec![SignalReason::EmaBullCross, SignalReason::RsiCrossUp],
            strategy: "intraday_cross",
            bar_time: at,
            timestamp: at,
        }
    }

    #[test]
    fn eurusd_message_with_percent_hint() {
        let hint = ExitHint::Percent {
            tp_pct: 0.004,
            sl_pips: 30,
        };
        let msg = format_signal(&signal("EURUSD", Side::Buy, 1.085234), "15m", Some(&hint));
        assert_eq!(
            msg,
            "🔔 Signal — EURUSD\nAction: BUY\nPrice: 1.08523\nTF: 15m\n\
             Reason: ema_bull_cross+rsi_cross_up\nTP ~0.4% | SL 30 pips"
        );
    }

    #[test]
    fn gold_message_with_absolute_hint() {
        let hint = ExitHint::Absolute {
            tp_usd: 10.0,
            sl_usd: 7.0,
        };
        let msg = format_signal(&signal("XAUUSD", Side::Sell, 2350.5), "15m", Some(&hint));
        assert!(msg.contains("Action: SELL"));
        assert!(msg.contains("Price: 2350.50000"));
        assert!(msg.ends_with("TP ~$10 | SL $7"));
    }

    #[test]
    fn no_hint_omits_exit_line() {
        let msg = format_signal(&signal("GBPUSD", Side::Buy, 1.27), "1d", None);
        assert_eq!(msg.lines().count(), 5);
        assert!(!msg.contains("TP"));
    }

    #[test]
    fn hint_deserialises_from_tagged_json() {
        let hint: ExitHint =
            serde_json::from_str(r#"{"kind":"absolute","tp_usd":12.0,"sl_usd":8.0}"#).unwrap();
        assert_eq!(
            hint,
            ExitHint::Absolute {
                tp_usd: 12.0,
                sl_usd: 8.0
            }
        );
    }
}
