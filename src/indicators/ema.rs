// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha  = 2 / (span + 1)
//   EMA_0  = value_0
//   EMA_t  = value_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The series is seeded with the first value (no bias adjustment), so the
// output is aligned 1:1 with the input and has no warm-up gap.
// =============================================================================

/// Compute the EMA series for `values` with the given `span`.
///
/// # Edge cases
/// - empty input => empty vec
/// - `span == 0` => every element is NaN (undefined smoothing factor)
/// - NaN inputs propagate forward; callers validate before comparing.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);

    for &value in &values[1..] {
        prev = value * alpha + prev * (1.0 - alpha);
        result.push(prev);
    }

    result
}
