//! Market data types and tick-to-bar aggregation.

pub mod bars;

pub use bars::{Bar, BarAggregator, Tick};
