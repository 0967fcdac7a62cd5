//! Feature engineering over the cleaned daily series.
//!
//! One feature row per retained bar:
//! - `day_of_week`: 0 = Monday .. 6 = Sunday
//! - `day_index`: position in the cleaned input sequence (trend ordering,
//!   not calendar distance)
//! - `previous_close`, `price_change_pct`: lag-1 derived
//! - `volatility`: intraday range normalized by close
//! - `seven_day_ma`: mean close over the row and its 6 predecessors
//!
//! The 7-row window makes the first 6 rows undefined and the lag makes the
//! first row undefined; the two overlap, so exactly `MA_WINDOW - 1` leading
//! rows are dropped and the output has `max(0, n - 6)` rows.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;

/// Moving-average window, in rows.
pub const MA_WINDOW: usize = 7;

/// Derived features for one trading day. Every field is defined; rows
/// whose lag/window inputs are undefined are never emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub day_of_week: u32,
    pub day_index: usize,
    pub close: f64,
    pub previous_close: f64,
    pub price_change_pct: f64,
    pub volatility: f64,
    pub seven_day_ma: f64,
}

/// Build feature rows from a cleaned, date-ascending series.
///
/// Output preserves the ascending date order of the retained subset.
pub fn build_features(bars: &[PriceBar]) -> Vec<FeatureRow> {
    if bars.len() < MA_WINDOW {
        return Vec::new();
    }

    let mut rows = Vec::with_capacity(bars.len() - (MA_WINDOW - 1));

    for (i, bar) in bars.iter().enumerate().skip(MA_WINDOW - 1) {
        let previous_close = bars[i - 1].close;
        let window = &bars[i + 1 - MA_WINDOW..=i];
        let seven_day_ma =
            window.iter().map(|b| b.close).sum::<f64>() / MA_WINDOW as f64;

        rows.push(FeatureRow {
            date: bar.date,
            day_of_week: bar.date.weekday().num_days_from_monday(),
            day_index: i,
            close: bar.close,
            previous_close,
            price_change_pct: (bar.close - previous_close) / previous_close * 100.0,
            volatility: (bar.high - bar.low) / bar.close,
            seven_day_ma,
        });
    }

    rows
}
