//! Win-rate driven threshold adjustment.
//!
//! Runs on a fixed 30-minute cadence. Exactly one rule branch applies per
//! run; adjustments are absolute steps with hard caps and floors, persisted
//! as a fresh parameter version.

use chrono::Utc;
use shared::models::Parameters;
use shared::stats::SignalStats;

#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeOutcome {
    /// Thresholds changed; the new version must be persisted and applied.
    Adjusted {
        new_params: Parameters,
        reason: &'static str,
    },
    /// Not enough labeled signals to judge the win rate.
    InsufficientData { labeled: usize, required: usize },
    /// No signal was labeled since the last adjustment; re-running on the
    /// same evidence must not move the thresholds again.
    NoNewData,
    /// The win rate sits in a band the rule table leaves alone.
    NoChange,
}

pub fn optimize(
    params: &Parameters,
    stats: &SignalStats,
    min_labeled: usize,
) -> OptimizeOutcome {
    if stats.total_signals < min_labeled {
        return OptimizeOutcome::InsufficientData {
            labeled: stats.total_signals,
            required: min_labeled,
        };
    }
    if stats.total_signals as u64 <= params.labeled_count {
        return OptimizeOutcome::NoNewData;
    }

    let rate = stats.success_rate;
    let mut new_params = params.clone();
    new_params.labeled_count = stats.total_signals as u64;
    new_params.last_update = Utc::now();

    let reason = if rate < 55.0 {
        // Too many false signals: raise the bar.
        new_params.slope_threshold =
            (params.slope_threshold + 0.5).min(Parameters::SLOPE_THRESHOLD_MAX);
        new_params.lookback = (params.lookback + 2).min(Parameters::LOOKBACK_MAX);
        "win rate low, raising thresholds to cut false signals"
    } else if rate > 75.0 {
        // Plenty of headroom: loosen up for more signals.
        new_params.slope_threshold =
            (params.slope_threshold - 0.5).max(Parameters::SLOPE_THRESHOLD_MIN);
        new_params.lookback = params.lookback.saturating_sub(1).max(Parameters::LOOKBACK_MIN);
        "win rate high, lowering thresholds for more signals"
    } else if (60.0..=70.0).contains(&rate) && stats.avg_profit < 20.0 {
        new_params.slope_threshold = params.slope_threshold + 0.2;
        "average profit thin, nudging slope threshold up"
    } else {
        return OptimizeOutcome::NoChange;
    };

    OptimizeOutcome::Adjusted { new_params, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn stats(labeled: usize, success_rate: f64, avg_profit: f64) -> SignalStats {
        let success_count = (success_rate / 100.0 * labeled as f64).round() as usize;
        SignalStats {
            total_signals: labeled,
            success_count,
            fail_count: labeled - success_count,
            neutral_count: 0,
            success_rate,
            avg_profit,
            by_signal_type: HashMap::new(),
        }
    }

    #[test]
    fn test_low_rate_raises_thresholds() {
        let params = Parameters::default();
        match optimize(&params, &stats(30, 54.0, 15.0), 20) {
            OptimizeOutcome::Adjusted { new_params, .. } => {
                assert_eq!(new_params.slope_threshold, 3.5);
                assert_eq!(new_params.lookback, 12);
            }
            other => panic!("expected adjustment, got {:?}", other),
        }
    }

    #[test]
    fn test_low_rate_respects_caps() {
        let params = Parameters {
            slope_threshold: 5.8,
            lookback: 14,
            ..Parameters::default()
        };
        match optimize(&params, &stats(30, 40.0, 15.0), 20) {
            OptimizeOutcome::Adjusted { new_params, .. } => {
                assert_eq!(new_params.slope_threshold, 6.0);
                assert_eq!(new_params.lookback, 15);
            }
            other => panic!("expected adjustment, got {:?}", other),
        }
    }

    #[test]
    fn test_high_rate_lowers_thresholds() {
        let params = Parameters::default();
        match optimize(&params, &stats(30, 80.0, 25.0), 20) {
            OptimizeOutcome::Adjusted { new_params, .. } => {
                assert_eq!(new_params.slope_threshold, 2.5);
                assert_eq!(new_params.lookback, 9);
            }
            other => panic!("expected adjustment, got {:?}", other),
        }
    }

    #[test]
    fn test_high_rate_respects_floors() {
        let params = Parameters {
            slope_threshold: 2.0,
            lookback: 8,
            ..Parameters::default()
        };
        match optimize(&params, &stats(30, 80.0, 25.0), 20) {
            OptimizeOutcome::Adjusted { new_params, .. } => {
                assert_eq!(new_params.slope_threshold, 2.0);
                assert_eq!(new_params.lookback, 8);
            }
            other => panic!("expected adjustment, got {:?}", other),
        }
    }

    #[test]
    fn test_mid_band_thin_profit_nudges_slope_only() {
        let params = Parameters::default();
        match optimize(&params, &stats(30, 65.0, 10.0), 20) {
            OptimizeOutcome::Adjusted { new_params, .. } => {
                assert!((new_params.slope_threshold - 3.2).abs() < 1e-9);
                assert_eq!(new_params.lookback, 10);
            }
            other => panic!("expected adjustment, got {:?}", other),
        }
    }

    #[test]
    fn test_mid_band_healthy_profit_is_no_change() {
        let params = Parameters::default();
        assert_eq!(
            optimize(&params, &stats(30, 65.0, 25.0), 20),
            OptimizeOutcome::NoChange
        );
    }

    #[test]
    fn test_dead_zones_are_no_change() {
        let params = Parameters::default();
        for rate in [55.0, 57.0, 59.9, 71.0, 75.0] {
            assert_eq!(
                optimize(&params, &stats(30, rate, 10.0), 20),
                OptimizeOutcome::NoChange,
                "rate {rate} must not adjust"
            );
        }
    }

    #[test]
    fn test_insufficient_data() {
        let params = Parameters::default();
        assert_eq!(
            optimize(&params, &stats(19, 40.0, 0.0), 20),
            OptimizeOutcome::InsufficientData {
                labeled: 19,
                required: 20
            }
        );
    }

    #[test]
    fn test_rerun_without_new_labels_is_idempotent() {
        let params = Parameters::default();
        let s = stats(30, 54.0, 15.0);
        let adjusted = match optimize(&params, &s, 20) {
            OptimizeOutcome::Adjusted { new_params, .. } => new_params,
            other => panic!("expected adjustment, got {:?}", other),
        };
        assert_eq!(optimize(&adjusted, &s, 20), OptimizeOutcome::NoNewData);
    }
}
