// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the signal
// strategies. Every series function returns a `Vec<f64>` aligned 1:1 with its
// input; positions inside the warm-up window hold NaN, which the strategies
// turn into `InsufficientData` before any comparison.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod snapshot;
pub mod volatility;

pub use snapshot::{IndicatorParams, IndicatorRow, IndicatorSnapshot, MacdParams};
