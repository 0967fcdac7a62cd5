//! Series cleaning: drop incomplete rows, sort, dedupe.

use crate::domain::PriceBar;

/// Canonicalize a fetched series: drop rows with missing fields, sort
/// ascending by date, and keep one row per date (first occurrence wins).
///
/// Gaps are left as-is; missing trading days are absent, not interpolated.
pub fn clean_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.retain(PriceBar::is_complete);
    // Stable sort, so the first-seen row for a date survives the dedupe.
    bars.sort_by_key(|bar| bar.date);
    bars.dedup_by_key(|bar| bar.date);
    bars
}
