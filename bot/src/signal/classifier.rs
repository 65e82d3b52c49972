//! Divergence / momentum-shift classification.
//!
//! Pure function of (close series, oscillator series, parameters); at most
//! one signal per evaluation. Firing suppression (cooldown, dedup) belongs to
//! the control loop, not here.

use shared::models::{Parameters, SignalKind};

use crate::indicators::MacdPoint;

/// The evidence a fired signal was based on; persisted with the signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalData {
    pub slope: f64,
    pub hist_avg: f64,
    pub hist_now: f64,
    pub hist_prev: f64,
    pub price_range: f64,
}

/// Least-squares slope of `values` against x = 0, 1, ..., n-1.
pub fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    num / den
}

/// Inspect the trailing `lookback`-bar window and emit at most one signal.
///
/// Rules are checked in priority order: divergence, momentum reversal,
/// range-bound flip. Returns `None` when history is too short or nothing
/// matches.
pub fn classify(
    closes: &[f64],
    macd: &[MacdPoint],
    params: &Parameters,
) -> Option<(SignalKind, SignalData)> {
    let lookback = params.lookback;
    let confirm = params.hist_confirm_bars;

    if closes.len() < lookback + 5 || macd.len() < closes.len() {
        return None;
    }
    if lookback < 2 || confirm == 0 || confirm > lookback {
        return None;
    }

    let window = &closes[closes.len() - lookback..];
    let hist_window = &macd[macd.len() - lookback..];

    let slope = least_squares_slope(window);

    let hist_confirm = &hist_window[hist_window.len() - confirm..];
    let hist_avg = hist_confirm.iter().map(|p| p.histogram).sum::<f64>() / confirm as f64;
    let hist_now = hist_window[hist_window.len() - 1].histogram;
    let hist_prev = hist_window[hist_window.len() - 2].histogram;

    let current = window[window.len() - 1];
    let max = window.iter().cloned().fold(f64::MIN, f64::max);
    let min = window.iter().cloned().fold(f64::MAX, f64::min);
    let price_range = max - min;

    let data = SignalData {
        slope,
        hist_avg,
        hist_now,
        hist_prev,
        price_range,
    };

    // Divergence: price trend against oscillator trend.
    if slope.abs() >= params.slope_threshold {
        if slope < 0.0 && hist_avg > 0.0 && hist_now > 0.0 {
            return Some((SignalKind::BottomDivergence, data));
        }
        if slope > 0.0 && hist_avg < 0.0 && hist_now < 0.0 {
            return Some((SignalKind::TopDivergence, data));
        }
    }

    // Momentum reversal near the window's extremes.
    if price_range > 0.0 {
        let position = (current - min) / price_range;
        if position > 0.7 && hist_prev < 0.0 && hist_now > 0.0 {
            return Some((SignalKind::HighReversalBullish, data));
        }
        if (max - current) / price_range > 0.7 && hist_prev > 0.0 && hist_now < 0.0 {
            return Some((SignalKind::LowReversalBearish, data));
        }
    }

    // Range-bound histogram flip, only while the trend is flat.
    if slope.abs() < params.slope_threshold {
        if hist_prev < 0.0 && hist_now > 0.0 {
            return Some((SignalKind::RangeTurnBullish, data));
        }
        if hist_prev > 0.0 && hist_now < 0.0 {
            return Some((SignalKind::RangeTurnBearish, data));
        }
    }

    None
}
