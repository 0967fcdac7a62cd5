//! PriceBar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV observation for the tracked instrument.
///
/// One run handles exactly one instrument, so the symbol is not stored on
/// the row; it travels alongside the series. The date is a calendar day
/// (time-of-day is discarded at fetch time), unique per cleaned series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Returns true if every price field is a finite number.
    ///
    /// Providers represent missing fields as NaN; cleaning drops any bar
    /// that fails this check.
    pub fn is_complete(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
    }
}
