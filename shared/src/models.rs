use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The six patterns the classifier can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    BottomDivergence,
    TopDivergence,
    HighReversalBullish,
    LowReversalBearish,
    RangeTurnBullish,
    RangeTurnBearish,
}

/// Directional bias used when scoring a signal's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Bullish,
    Bearish,
}

impl SignalKind {
    /// Stable identifier persisted in the signal store.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::BottomDivergence => "bottom_divergence",
            SignalKind::TopDivergence => "top_divergence",
            SignalKind::HighReversalBullish => "high_reversal_bullish",
            SignalKind::LowReversalBearish => "low_reversal_bearish",
            SignalKind::RangeTurnBullish => "range_turn_bullish",
            SignalKind::RangeTurnBearish => "range_turn_bearish",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bottom_divergence" => Some(SignalKind::BottomDivergence),
            "top_divergence" => Some(SignalKind::TopDivergence),
            "high_reversal_bullish" => Some(SignalKind::HighReversalBullish),
            "low_reversal_bearish" => Some(SignalKind::LowReversalBearish),
            "range_turn_bullish" => Some(SignalKind::RangeTurnBullish),
            "range_turn_bearish" => Some(SignalKind::RangeTurnBearish),
            _ => None,
        }
    }

    /// Human-readable label for alerts and status pages.
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::BottomDivergence => "bottom divergence (bullish)",
            SignalKind::TopDivergence => "top divergence (bearish)",
            SignalKind::HighReversalBullish => "high reversal to bullish (watch for reversal)",
            SignalKind::LowReversalBearish => "low reversal to bearish",
            SignalKind::RangeTurnBullish => "range-bound turning bullish",
            SignalKind::RangeTurnBearish => "range-bound turning bearish",
        }
    }

    /// Explicit bias table. Outcome scoring goes through this, never through
    /// the display label.
    pub fn bias(&self) -> Bias {
        match self {
            SignalKind::BottomDivergence
            | SignalKind::HighReversalBullish
            | SignalKind::RangeTurnBullish => Bias::Bullish,
            SignalKind::TopDivergence
            | SignalKind::LowReversalBearish
            | SignalKind::RangeTurnBearish => Bias::Bearish,
        }
    }
}

/// Terminal outcome of a signal, or `Pending` while horizons are still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalResult {
    Pending,
    Success,
    Fail,
    Neutral,
}

impl SignalResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalResult::Pending => "pending",
            SignalResult::Success => "success",
            SignalResult::Fail => "fail",
            SignalResult::Neutral => "neutral",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SignalResult::Pending),
            "success" => Some(SignalResult::Success),
            "fail" => Some(SignalResult::Fail),
            "neutral" => Some(SignalResult::Neutral),
            _ => None,
        }
    }

    pub fn is_labeled(&self) -> bool {
        !matches!(self, SignalResult::Pending)
    }
}

/// Detection thresholds, one immutable version at a time. The optimizer
/// produces a new version; nothing edits an existing one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub slope_threshold: f64,
    pub lookback: usize,
    pub hist_confirm_bars: usize,
    pub cooldown_minutes: i64,
    /// Labeled-signal count the version was derived from; the optimizer
    /// no-ops until this grows.
    pub labeled_count: u64,
    pub last_update: DateTime<Utc>,
}

impl Parameters {
    pub const SLOPE_THRESHOLD_MIN: f64 = 2.0;
    pub const SLOPE_THRESHOLD_MAX: f64 = 6.0;
    pub const LOOKBACK_MIN: usize = 8;
    pub const LOOKBACK_MAX: usize = 15;
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            slope_threshold: 3.0,
            lookback: 10,
            hist_confirm_bars: 3,
            cooldown_minutes: 5,
            labeled_count: 0,
            last_update: Utc::now(),
        }
    }
}
