//! Technical indicators, computed with the `ta` crate.

pub mod macd;

pub use macd::{ema_series, macd_series, MacdPoint};
