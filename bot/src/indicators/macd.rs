//! Standard MACD (12, 26, 9) over the retained close-price series.
//!
//! Recomputed in full every time a bar is sealed; O(n) over a bounded series.
//! The streaming EMAs seed from the first value, so every point of the series
//! is defined from the first bar onward, just less converged while the series
//! is shorter than the smoothing span.

use ta::indicators::{ExponentialMovingAverage, MovingAverageConvergenceDivergence};
use ta::Next;

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_PERIOD: usize = 9;

/// One oscillator sample, aligned with the bar at the same index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Compute the MACD/Signal/Histogram series over the full close sequence.
pub fn macd_series(closes: &[f64]) -> Vec<MacdPoint> {
    let Ok(mut macd) = MovingAverageConvergenceDivergence::new(FAST_PERIOD, SLOW_PERIOD, SIGNAL_PERIOD)
    else {
        return Vec::new();
    };
    closes
        .iter()
        .map(|&close| {
            let out = macd.next(close);
            MacdPoint {
                macd: out.macd,
                signal: out.signal,
                histogram: out.histogram,
            }
        })
        .collect()
}

/// EMA with smoothing span `period` over `values`: EMA[0] = values[0],
/// EMA[i] = values[i]·k + EMA[i-1]·(1−k) with k = 2/(period+1).
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let Ok(mut ema) = ExponentialMovingAverage::new(period) else {
        return Vec::new();
    };
    values.iter().map(|&v| ema.next(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_single_value_equals_input() {
        let out = ema_series(&[18123.0], 12);
        assert_eq!(out, vec![18123.0]);
    }

    #[test]
    fn test_ema_constant_input_stays_constant() {
        let values = vec![42.0; 30];
        for v in ema_series(&values, 9) {
            assert!((v - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ema_converges_monotonically_toward_constant() {
        // Start away from the constant, then feed the constant.
        let mut values = vec![0.0];
        values.extend(std::iter::repeat(100.0).take(40));
        let out = ema_series(&values, 12);
        for w in out.windows(2).skip(1) {
            assert!(w[1] >= w[0]);
        }
        assert!((out.last().unwrap() - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_macd_series_matches_ema_recursion() {
        let closes: Vec<f64> = (0..60).map(|i| 18000.0 + (i as f64 * 7.0).sin() * 30.0).collect();
        let fast = ema_series(&closes, FAST_PERIOD);
        let slow = ema_series(&closes, SLOW_PERIOD);
        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_series(&macd_line, SIGNAL_PERIOD);

        let series = macd_series(&closes);
        assert_eq!(series.len(), closes.len());
        for (i, point) in series.iter().enumerate() {
            assert!((point.macd - macd_line[i]).abs() < 1e-9);
            assert!((point.signal - signal[i]).abs() < 1e-9);
            assert!((point.histogram - (macd_line[i] - signal[i])).abs() < 1e-9);
        }
    }

    #[test]
    fn test_macd_defined_from_first_bar() {
        let series = macd_series(&[18000.0]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].macd, 0.0);
        assert_eq!(series[0].histogram, 0.0);
    }
}
