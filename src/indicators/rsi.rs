// =============================================================================
// Relative Strength Index (RSI) — simple moving average variant
// =============================================================================
//
// Step 1 — delta_t = close_t - close_{t-1}
// Step 2 — up_t = max(delta_t, 0), down_t = max(-delta_t, 0)
// Step 3 — avg_up / avg_down = simple mean over the last `period` deltas
// Step 4 — RS  = avg_up / avg_down
//          RSI = 100 - 100 / (1 + RS)
//
// A zero avg_down is replaced by RSI_EPSILON rather than special-cased, so a
// window with no down-moves saturates just below 100 and a perfectly flat
// window reads 0. The result always lies in [0, 100].
// =============================================================================

/// Substitute for a zero average loss.
pub const RSI_EPSILON: f64 = 1e-9;

/// Compute the RSI series for `closes`, aligned 1:1 with the input.
///
/// The first `period` elements are NaN (the first delta only exists at
/// index 1, and a full window of `period` deltas ends at index `period`).
///
/// # Edge cases
/// - `period == 0` => all NaN
/// - `closes.len() <= period` => all NaN
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return result;
    }

    let period_f = period as f64;
    let mut sum_up = 0.0;
    let mut sum_down = 0.0;

    for i in 1..closes.len() {
        let (up, down) = split_delta(closes[i] - closes[i - 1]);
        sum_up += up;
        sum_down += down;

        // Drop the delta that just left the window.
        if i > period {
            let (old_up, old_down) = split_delta(closes[i - period] - closes[i - period - 1]);
            sum_up -= old_up;
            sum_down -= old_down;
        }

        if i >= period {
            // Rolling sums can drift a hair below zero after subtraction.
            let avg_up = (sum_up / period_f).max(0.0);
            let avg_down = (sum_down / period_f).max(0.0);
            result[i] = rsi_from_averages(avg_up, avg_down);
        }
    }

    result
}

fn split_delta(delta: f64) -> (f64, f64) {
    if delta > 0.0 {
        (delta, 0.0)
    } else {
        (0.0, -delta)
    }
}

fn rsi_from_averages(avg_up: f64, avg_down: f64) -> f64 {
    let avg_down = if avg_down == 0.0 { RSI_EPSILON } else { avg_down };
    let rs = avg_up / avg_down;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero_all_nan() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_warm_up_is_nan() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert_eq!(rsi.len(), 20);
        assert!(rsi[..14].iter().all(|v| v.is_nan()));
        assert!(rsi[14..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rsi_monotonic_rise_saturates_near_100() {
        let closes: Vec<f64> = (0..250).map(|i| 1.0 + i as f64 * 0.001).collect();
        let rsi = calculate_rsi(&closes, 14);
        for &v in rsi.iter().filter(|v| v.is_finite()) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
            assert!(v > 99.9, "expected saturation, got {v}");
        }
    }

    #[test]
    fn rsi_monotonic_fall_reads_zero() {
        let closes: Vec<f64> = (0..40).map(|i| 2.0 - i as f64 * 0.01).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi[39].abs() < 1e-9);
    }

    #[test]
    fn rsi_flat_window_reads_zero() {
        let rsi = calculate_rsi(&[100.0; 30], 14);
        assert!(rsi[29].abs() < 1e-12);
    }

    #[test]
    fn rsi_matches_direct_window_mean() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let period = 14;
        let rsi = calculate_rsi(&closes, period);

        for i in period..closes.len() {
            let (mut up, mut down) = (0.0, 0.0);
            for j in (i + 1 - period)..=i {
                let d = closes[j] - closes[j - 1];
                if d > 0.0 {
                    up += d;
                } else {
                    down -= d;
                }
            }
            let expected = 100.0 - 100.0 / (1.0 + (up / period as f64) / (down / period as f64));
            assert!((rsi[i] - expected).abs() < 1e-9, "index {i}: {} vs {expected}", rsi[i]);
            assert!((0.0..=100.0).contains(&rsi[i]));
        }
    }
}
