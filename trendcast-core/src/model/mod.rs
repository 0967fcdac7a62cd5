//! Trend model.

pub mod trend;

pub use trend::{fit_trend, FitError, TrendFit};
