// =============================================================================
// Volatility Ratio — average bar range relative to price
// =============================================================================
//
//   range_t = high_t - low_t
//   ratio_t = mean(range over last `period` bars) / close_t
//
// Used as a noise/liquidity gate: a ratio of 0.001 means the average bar spans
// 0.10% of the current price.
// =============================================================================

/// Floor applied to the close in the denominator.
const MIN_CLOSE: f64 = 1e-9;

/// Compute the rolling volatility ratio aligned 1:1 with `closes`.
///
/// Elements before index `period - 1` are NaN. A missing high/low (NaN)
/// anywhere in a window makes that window's ratio NaN.
pub fn calculate_volatility_ratio(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || highs.len() != n || lows.len() != n || n < period {
        return result;
    }

    let ranges: Vec<f64> = highs.iter().zip(lows).map(|(h, l)| h - l).collect();

    for i in (period - 1)..n {
        let window = &ranges[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        result[i] = mean / closes[i].max(MIN_CLOSE);
    }

    result
}
