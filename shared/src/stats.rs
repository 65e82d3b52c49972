//! Win-rate statistics, recomputed on demand from labeled signal rows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::signals;
use crate::models::SignalResult;

/// Aggregate outcome summary over all labeled signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalStats {
    pub total_signals: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub neutral_count: usize,
    /// Percent of labeled signals that hit their dynamic threshold.
    pub success_rate: f64,
    pub avg_profit: f64,
    pub by_signal_type: HashMap<String, TypeStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeStats {
    pub total: usize,
    pub success: usize,
    pub success_rate: f64,
    pub avg_profit: f64,
}

impl SignalStats {
    /// Returns `None` when no signal has been labeled yet.
    pub fn from_signals(rows: &[signals::Model]) -> Option<SignalStats> {
        let labeled: Vec<&signals::Model> =
            rows.iter().filter(|s| s.outcome().is_labeled()).collect();
        if labeled.is_empty() {
            return None;
        }

        let total = labeled.len();
        let mut success_count = 0;
        let mut fail_count = 0;
        let mut neutral_count = 0;
        let mut profit_sum = 0.0;
        let mut profit_n = 0usize;

        for row in &labeled {
            match row.outcome() {
                SignalResult::Success => success_count += 1,
                SignalResult::Fail => fail_count += 1,
                SignalResult::Neutral => neutral_count += 1,
                SignalResult::Pending => {}
            }
            if let Some(pl) = row.profit_loss {
                profit_sum += pl;
                profit_n += 1;
            }
        }

        let mut by_signal_type = HashMap::new();
        for row in &labeled {
            let entry = by_signal_type
                .entry(row.signal_type.clone())
                .or_insert((0usize, 0usize, 0.0f64, 0usize));
            entry.0 += 1;
            if row.outcome() == SignalResult::Success {
                entry.1 += 1;
            }
            if let Some(pl) = row.profit_loss {
                entry.2 += pl;
                entry.3 += 1;
            }
        }

        let by_signal_type = by_signal_type
            .into_iter()
            .map(|(kind, (total, success, pl_sum, pl_n))| {
                (
                    kind,
                    TypeStats {
                        total,
                        success,
                        success_rate: success as f64 / total as f64 * 100.0,
                        avg_profit: if pl_n > 0 { pl_sum / pl_n as f64 } else { 0.0 },
                    },
                )
            })
            .collect();

        Some(SignalStats {
            total_signals: total,
            success_count,
            fail_count,
            neutral_count,
            success_rate: success_count as f64 / total as f64 * 100.0,
            avg_profit: if profit_n > 0 { profit_sum / profit_n as f64 } else { 0.0 },
            by_signal_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignalKind;
    use chrono::Utc;

    fn row(kind: SignalKind, result: &str, profit_loss: Option<f64>) -> signals::Model {
        signals::Model {
            id: 0,
            emitted_at: Utc::now(),
            signal_type: kind.as_str().to_string(),
            entry_price: 18000.0,
            slope: 3.5,
            hist_avg: 1.0,
            hist_now: 1.2,
            price_range: 80.0,
            slope_threshold: 3.0,
            lookback: 10,
            price_at_10min: None,
            price_at_30min: None,
            price_at_1hour: None,
            result: result.to_string(),
            profit_loss,
            threshold_used: None,
        }
    }

    #[test]
    fn test_no_labeled_rows_yields_none() {
        let rows = vec![row(SignalKind::BottomDivergence, "pending", None)];
        assert!(SignalStats::from_signals(&rows).is_none());
    }

    #[test]
    fn test_counts_and_rate() {
        let rows = vec![
            row(SignalKind::BottomDivergence, "success", Some(40.0)),
            row(SignalKind::BottomDivergence, "fail", Some(-30.0)),
            row(SignalKind::TopDivergence, "success", Some(50.0)),
            row(SignalKind::TopDivergence, "neutral", Some(5.0)),
            row(SignalKind::RangeTurnBullish, "pending", None),
        ];
        let stats = SignalStats::from_signals(&rows).unwrap();
        assert_eq!(stats.total_signals, 4);
        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.fail_count, 1);
        assert_eq!(stats.neutral_count, 1);
        assert!((stats.success_rate - 50.0).abs() < 1e-9);
        assert!((stats.avg_profit - 16.25).abs() < 1e-9);

        let bottom = &stats.by_signal_type[SignalKind::BottomDivergence.as_str()];
        assert_eq!(bottom.total, 2);
        assert_eq!(bottom.success, 1);
        assert!((bottom.success_rate - 50.0).abs() < 1e-9);
        assert!((bottom.avg_profit - 5.0).abs() < 1e-9);
    }
}
