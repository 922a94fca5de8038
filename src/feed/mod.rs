// =============================================================================
// Price Feed Module
// =============================================================================
//
// Sources of price history. The scheduler only sees the `PriceFeed` trait, so
// a provider can be swapped (or faked in tests) without touching the engine.

pub mod yahoo;

pub use yahoo::YahooFeed;

use std::future::Future;

use crate::error::SignalError;
use crate::market_data::PriceSeries;

/// What to fetch for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Provider-specific ticker (e.g. `EURUSD=X`).
    pub ticker: String,
    /// Bar interval, e.g. `15m` or `1d`.
    pub interval: String,
    /// History range, e.g. `7d` or `2y`.
    pub range: String,
}

pub trait PriceFeed: Send + Sync {
    /// Fetch the bar history for `symbol`. Any provider failure, including an
    /// empty result, is reported as `DataUnavailable`.
    fn fetch_series(
        &self,
        symbol: &str,
        request: &FeedRequest,
    ) -> impl Future<Output = Result<PriceSeries, SignalError>> + Send;
}
