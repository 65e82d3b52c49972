//! Signal detection over the oscillator history and trailing price window.

pub mod classifier;

pub use classifier::{classify, least_squares_slope, SignalData};
