// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   line      = EMA(close, fast) - EMA(close, slow)
//   signal    = EMA(line, signal)
//   histogram = line - signal
//
// Built on the first-value-seeded EMA, so all three series are aligned 1:1
// with the closes.
// =============================================================================

use super::ema::calculate_ema;

/// The three MACD series, each the same length as the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = calculate_ema(&line, signal);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn macd_lengths_match_input() {
        let m = calculate_macd(&wave(120), 12, 26, 9);
        assert_eq!(m.line.len(), 120);
        assert_eq!(m.signal.len(), 120);
        assert_eq!(m.histogram.len(), 120);
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let m = calculate_macd(&wave(300), 12, 26, 9);
        for i in 0..300 {
            assert_eq!(m.histogram[i], m.line[i] - m.signal[i]);
        }
    }

    #[test]
    fn macd_of_constant_series_is_zero() {
        let m = calculate_macd(&[1.1; 60], 12, 26, 9);
        assert!(m.line.iter().all(|v| v.abs() < 1e-12));
        assert!(m.histogram.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn macd_positive_on_steady_rise() {
        let closes: Vec<f64> = (0..100).map(|i| 1.0 + i as f64 * 0.01).collect();
        let m = calculate_macd(&closes, 12, 26, 9);
        assert!(m.line[99] > 0.0);
        assert!(m.line[99] > m.signal[99]);
    }
}
