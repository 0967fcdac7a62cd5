//! The fetch operation: provider call plus cleaning.

use chrono::{Duration, NaiveDate};

use super::clean::clean_bars;
use super::provider::{DataError, MarketDataProvider};
use crate::domain::PriceBar;

/// Fetch a lookback window of daily history ending at `end` (inclusive)
/// and return the cleaned series, sorted ascending by date.
///
/// Fails with `DataError::NoData` when the provider returns no rows, or
/// when cleaning leaves none.
pub fn fetch_history(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    end: NaiveDate,
    lookback_days: i64,
) -> Result<Vec<PriceBar>, DataError> {
    let start = end - Duration::days(lookback_days);
    let raw = provider.fetch_history(symbol, start, end)?;

    if raw.is_empty() {
        return Err(DataError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let cleaned = clean_bars(raw);
    if cleaned.is_empty() {
        return Err(DataError::NoData {
            symbol: symbol.to_string(),
        });
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureProvider {
        bars: Vec<PriceBar>,
    }

    impl MarketDataProvider for FixtureProvider {
        fn name(&self) -> &str {
            "fixture"
        }

        fn fetch_history(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<PriceBar>, DataError> {
            Ok(self.bars.clone())
        }
    }

    /// Provider that records the requested range.
    struct RangeProbe {
        seen: std::cell::RefCell<Option<(NaiveDate, NaiveDate)>>,
    }

    impl MarketDataProvider for RangeProbe {
        fn name(&self) -> &str {
            "probe"
        }

        fn fetch_history(
            &self,
            _symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<PriceBar>, DataError> {
            *self.seen.borrow_mut() = Some((start, end));
            Ok(vec![PriceBar {
                date: end,
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 1,
            }])
        }
    }

    #[test]
    fn empty_provider_result_is_no_data() {
        let provider = FixtureProvider { bars: Vec::new() };
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let err = fetch_history(&provider, "BTC-USD", today, 60).unwrap_err();
        assert!(matches!(err, DataError::NoData { ref symbol } if symbol == "BTC-USD"));
        assert!(err.to_string().contains("BTC-USD"));
    }

    #[test]
    fn all_incomplete_rows_is_no_data() {
        let provider = FixtureProvider {
            bars: vec![PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 5, 30).unwrap(),
                open: f64::NAN,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 0,
            }],
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let err = fetch_history(&provider, "BTC-USD", today, 60).unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }

    #[test]
    fn requests_lookback_window_ending_today() {
        let provider = RangeProbe {
            seen: std::cell::RefCell::new(None),
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        fetch_history(&provider, "BTC-USD", today, 60).unwrap();
        let (start, end) = provider.seen.borrow().unwrap();
        assert_eq!(end, today);
        assert_eq!(end - start, Duration::days(60));
    }
}
