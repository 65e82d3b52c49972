//! Tick-to-bar aggregation.
//!
//! Folds a stream of (timestamp, price, cumulative volume) ticks into sealed
//! 5-minute OHLCV bars aligned to wall-clock boundaries. The most recent 100
//! sealed bars are retained in a ring; older ones are evicted.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::{debug, warn};

/// Bar duration in minutes; boundaries are anchored to minute-of-hour.
pub const BAR_MINUTES: u32 = 5;

/// Retained sealed-bar capacity.
pub const BAR_CAPACITY: usize = 100;

/// A bar opened more than this long after its boundary started life mid-way
/// (typically after a restart) and is flagged incomplete.
const LATE_OPEN_SECS: i64 = 60;

/// A single observed quote.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Session-cumulative contract volume as reported by the exchange.
    pub cumulative_volume: i64,
}

/// A sealed OHLCV bar. Immutable once sealed.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub start_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// Number of distinct price-change ticks folded in.
    pub tick_count: u32,
    /// The bar was opened well after its boundary (restart mid-bar).
    pub incomplete: bool,
}

/// Round a timestamp down to its bar boundary: minutes floored to the nearest
/// multiple of [`BAR_MINUTES`], seconds and sub-seconds zeroed.
pub fn bar_boundary(ts: DateTime<Utc>) -> DateTime<Utc> {
    let minute = ts.minute() - ts.minute() % BAR_MINUTES;
    ts.with_minute(minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

#[derive(Debug, Clone)]
struct OpenBar {
    start_time: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    first_cumulative_volume: i64,
    last_cumulative_volume: i64,
    tick_count: u32,
    incomplete: bool,
}

impl OpenBar {
    fn new(tick: &Tick, boundary: DateTime<Utc>) -> Self {
        let late = tick.timestamp - boundary > Duration::seconds(LATE_OPEN_SECS);
        if late {
            warn!(
                "Opening bar at {} from a tick {}s past the boundary; flagging incomplete",
                boundary,
                (tick.timestamp - boundary).num_seconds()
            );
        }
        OpenBar {
            start_time: boundary,
            open: tick.price,
            high: tick.price,
            low: tick.price,
            close: tick.price,
            first_cumulative_volume: tick.cumulative_volume,
            last_cumulative_volume: tick.cumulative_volume,
            tick_count: 1,
            incomplete: late,
        }
    }

    fn apply(&mut self, tick: &Tick) {
        // Repeat quotes at an unchanged price only refresh the volume
        // bookkeeping; they must not inflate tick_count.
        if tick.price != self.close {
            self.high = self.high.max(tick.price);
            self.low = self.low.min(tick.price);
            self.close = tick.price;
            self.tick_count += 1;
        }
        self.last_cumulative_volume = tick.cumulative_volume;
    }

    fn seal(&self) -> Bar {
        let delta = self.last_cumulative_volume - self.first_cumulative_volume;
        // A negative delta means the upstream cumulative counter rolled over
        // (session change or restart); fall back to the final reading alone.
        let volume = if delta < 0 {
            warn!(
                "Negative volume delta ({}) in bar {}; counter rollover, using final reading",
                delta, self.start_time
            );
            self.last_cumulative_volume
        } else {
            delta
        };
        Bar {
            start_time: self.start_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume,
            tick_count: self.tick_count,
            incomplete: self.incomplete,
        }
    }
}

/// Folds ticks into sealed bars, retaining a bounded history.
#[derive(Debug)]
pub struct BarAggregator {
    bars: VecDeque<Bar>,
    open_bar: Option<OpenBar>,
    capacity: usize,
}

impl BarAggregator {
    pub fn new() -> Self {
        Self::with_capacity(BAR_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        BarAggregator {
            bars: VecDeque::with_capacity(capacity),
            open_bar: None,
            capacity,
        }
    }

    /// Feed one tick. Returns the sealed bar when the tick crosses into a new
    /// bar boundary.
    pub fn apply(&mut self, tick: &Tick) -> Option<Bar> {
        let boundary = bar_boundary(tick.timestamp);

        let Some(open) = self.open_bar.as_mut() else {
            self.open_bar = Some(OpenBar::new(tick, boundary));
            return None;
        };

        if boundary == open.start_time {
            open.apply(tick);
            return None;
        }

        if boundary < open.start_time {
            // Out-of-order tick; bar start times must be strictly increasing.
            warn!(
                "Dropping out-of-order tick at {} (open bar starts {})",
                tick.timestamp, open.start_time
            );
            return None;
        }

        let sealed = open.seal();
        debug!(
            "Sealed bar {}: O={} H={} L={} C={} V={} ticks={}",
            sealed.start_time,
            sealed.open,
            sealed.high,
            sealed.low,
            sealed.close,
            sealed.volume,
            sealed.tick_count
        );
        if self.bars.len() == self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(sealed.clone());
        self.open_bar = Some(OpenBar::new(tick, boundary));
        Some(sealed)
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices of all retained bars, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn open_bar_started_at(&self) -> Option<DateTime<Utc>> {
        self.open_bar.as_ref().map(|b| b.start_time)
    }

    pub fn open_bar_incomplete(&self) -> bool {
        self.open_bar.as_ref().map(|b| b.incomplete).unwrap_or(false)
    }
}

impl Default for BarAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 12, 9, min, sec).unwrap()
    }

    fn tick(min: u32, sec: u32, price: f64, volume: i64) -> Tick {
        Tick {
            timestamp: ts(min, sec),
            price,
            cumulative_volume: volume,
        }
    }

    #[test]
    fn test_boundary_alignment() {
        assert_eq!(bar_boundary(ts(7, 31)), ts(5, 0));
        assert_eq!(bar_boundary(ts(5, 0)), ts(5, 0));
        assert_eq!(bar_boundary(ts(9, 59)), ts(5, 0));
        assert_eq!(bar_boundary(ts(10, 0)), ts(10, 0));
    }

    #[test]
    fn test_ohlc_from_tick_sequence() {
        let mut agg = BarAggregator::new();
        assert!(agg.apply(&tick(5, 1, 18000.0, 100)).is_none());
        assert!(agg.apply(&tick(5, 40, 18010.0, 130)).is_none());
        assert!(agg.apply(&tick(6, 20, 17990.0, 160)).is_none());
        assert!(agg.apply(&tick(8, 0, 18005.0, 200)).is_none());

        let bar = agg.apply(&tick(10, 2, 18001.0, 220)).expect("bar sealed");
        assert_eq!(bar.start_time, ts(5, 0));
        assert_eq!(bar.open, 18000.0);
        assert_eq!(bar.high, 18010.0);
        assert_eq!(bar.low, 17990.0);
        assert_eq!(bar.close, 18005.0);
        assert_eq!(bar.volume, 100);
        assert_eq!(bar.tick_count, 4);
        assert!(!bar.incomplete);
    }

    #[test]
    fn test_repeat_price_does_not_inflate_tick_count() {
        let mut agg = BarAggregator::new();
        agg.apply(&tick(5, 1, 18000.0, 100));
        agg.apply(&tick(5, 30, 18000.0, 120));
        agg.apply(&tick(5, 50, 18000.0, 140));
        let bar = agg.apply(&tick(10, 0, 18001.0, 150)).unwrap();
        assert_eq!(bar.tick_count, 1);
        // Repeat quotes still advance the cumulative-volume bookkeeping.
        assert_eq!(bar.volume, 40);
    }

    #[test]
    fn test_negative_volume_delta_clamps_to_final_reading() {
        let mut agg = BarAggregator::new();
        agg.apply(&tick(5, 1, 18000.0, 5000));
        // Upstream counter restarted mid-bar.
        agg.apply(&tick(6, 0, 18002.0, 30));
        let bar = agg.apply(&tick(10, 0, 18001.0, 45)).unwrap();
        assert_eq!(bar.volume, 30);
    }

    #[test]
    fn test_late_open_flags_incomplete() {
        let mut agg = BarAggregator::new();
        // First tick 2 minutes past the 09:05 boundary.
        agg.apply(&tick(7, 0, 18000.0, 100));
        assert!(agg.open_bar_incomplete());
        let bar = agg.apply(&tick(10, 0, 18001.0, 120)).unwrap();
        assert!(bar.incomplete);
    }

    #[test]
    fn test_boundaries_strictly_increase_across_seals() {
        let mut agg = BarAggregator::new();
        agg.apply(&tick(5, 1, 18000.0, 100));
        let first = agg.apply(&tick(10, 1, 18001.0, 120)).unwrap();
        // Stale tick from the already-sealed bar is dropped.
        assert!(agg.apply(&tick(9, 0, 17000.0, 110)).is_none());
        let second = agg.apply(&tick(15, 1, 18002.0, 140)).unwrap();
        assert!(second.start_time > first.start_time);
        assert_eq!(second.low, 18001.0);
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut agg = BarAggregator::with_capacity(3);
        for i in 0..6u32 {
            let t = Utc
                .with_ymd_and_hms(2026, 1, 12, 9 + i / 12, (i * 5) % 60, 1)
                .unwrap();
            agg.apply(&Tick {
                timestamp: t,
                price: 18000.0 + i as f64,
                cumulative_volume: 100 * i as i64,
            });
        }
        assert_eq!(agg.len(), 3);
        let starts: Vec<_> = agg.bars().map(|b| b.start_time).collect();
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(agg.closes(), vec![18002.0, 18003.0, 18004.0]);
    }
}
