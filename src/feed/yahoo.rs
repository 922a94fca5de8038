// =============================================================================
// Yahoo Finance Chart Client — public OHLC history, no authentication
// =============================================================================
//
// GET {base}/v8/finance/chart/{ticker}?interval=15m&range=7d
//
// Response layout (only the parts used here):
//   chart.result[0].timestamp[]                 unix seconds
//   chart.result[0].indicators.quote[0].open[]  nullable floats
//   ...high[] / low[] / close[]
//   chart.error                                 null or { code, description }
//
// Bars with a null close are dropped. Equal timestamps (the provider repeats
// the live bar at the end) collapse to the last occurrence.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{FeedRequest, PriceFeed};
use crate::error::SignalError;
use crate::market_data::{PriceBar, PriceSeries};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// -----------------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

// -----------------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct YahooFeed {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFeed {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different host (mirrors, local stubs).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        // The chart endpoint rejects requests without a browser-like agent.
        default_headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 fx-signals"));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into();
        debug!(base_url = %base_url, "YahooFeed initialised");

        Ok(Self { base_url, client })
    }

    async fn get_chart(&self, request: &FeedRequest) -> Result<String> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, request.ticker);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("interval", request.interval.as_str()),
                ("range", request.range.as_str()),
            ])
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        let body = resp.text().await.context("failed to read chart response")?;

        if !status.is_success() {
            anyhow::bail!("chart endpoint returned {}: {}", status, truncate(&body, 200));
        }

        Ok(body)
    }
}

impl PriceFeed for YahooFeed {
    #[instrument(skip(self), name = "yahoo::fetch_series")]
    async fn fetch_series(
        &self,
        symbol: &str,
        request: &FeedRequest,
    ) -> Result<PriceSeries, SignalError> {
        let body = self
            .get_chart(request)
            .await
            .map_err(|e| SignalError::unavailable(symbol, format!("{e:#}")))?;

        let series = parse_chart(symbol, &body)?;
        debug!(
            symbol,
            ticker = %request.ticker,
            bars = series.len(),
            first = ?series.bars().first().map(|b| b.timestamp),
            "chart fetched"
        );
        Ok(series)
    }
}

// -----------------------------------------------------------------------------
// Parsing
// -----------------------------------------------------------------------------

/// Turn a chart response body into a validated series.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, SignalError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| SignalError::unavailable(symbol, format!("malformed chart response: {e}")))?;

    if let Some(err) = envelope.chart.error {
        return Err(SignalError::unavailable(
            symbol,
            format!("provider error {}: {}", err.code, err.description),
        ));
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| SignalError::unavailable(symbol, "no chart result"))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars: Vec<PriceBar> = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(ts, 0) else {
            warn!(symbol, ts, "skipping bar with out-of-range timestamp");
            continue;
        };
        let bar = PriceBar::new(
            timestamp,
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            close,
        );

        match bars.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            Some(last) if last.timestamp > bar.timestamp => {
                warn!(symbol, ts, "skipping out-of-order bar");
            }
            _ => bars.push(bar),
        }
    }

    if bars.is_empty() {
        return Err(SignalError::unavailable(symbol, "no bars with a close price"));
    }

    PriceSeries::new(symbol, bars)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "EURUSD=X" },
                "timestamp": [1717400000, 1717400900, 1717401800, 1717401800, 1717402700],
                "indicators": { "quote": [{
                    "open":  [1.0850, 1.0852, null,   1.0855, 1.0857],
                    "high":  [1.0856, 1.0858, null,   1.0860, 1.0861],
                    "low":   [1.0848, 1.0850, null,   1.0851, 1.0853],
                    "close": [1.0852, 1.0855, null,   1.0857, 1.0859],
                    "volume": [0, 0, 0, 0, 0]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_bars_and_drops_null_closes() {
        let series = parse_chart("EURUSD", BODY).unwrap();
        assert_eq!(series.symbol(), "EURUSD");
        // null close dropped, duplicate timestamp collapsed to the later bar
        assert_eq!(series.len(), 4);
        assert_eq!(series.closes(), vec![1.0852, 1.0855, 1.0857, 1.0859]);
        assert_eq!(series.bars()[2].high, Some(1.0860));
        assert_eq!(series.last_timestamp().timestamp(), 1717402700);
    }

    #[test]
    fn provider_error_is_data_unavailable() {
        let body = r#"{"chart":{"result":null,"error":{
            "code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("XAUUSD", body).unwrap_err();
        assert!(
            matches!(err, SignalError::DataUnavailable { ref symbol, .. } if symbol == "XAUUSD")
        );
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn empty_result_is_data_unavailable() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        assert!(matches!(
            parse_chart("EURUSD", body),
            Err(SignalError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn all_null_closes_is_data_unavailable() {
        let body = r#"{"chart":{"result":[{"timestamp":[1,2],
            "indicators":{"quote":[{"close":[null,null]}]}}],"error":null}}"#;
        assert!(matches!(
            parse_chart("EURUSD", body),
            Err(SignalError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn garbage_body_is_data_unavailable() {
        assert!(matches!(
            parse_chart("EURUSD", "<html>rate limited</html>"),
            Err(SignalError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
