//! Market-data provider trait and structured error types.
//!
//! The trait abstracts over the external market-data source so the pipeline
//! can be exercised against fixtures without any network dependency.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::PriceBar;

/// Errors from the data layer.
///
/// Every failure here is terminal for the current run; there are no retries.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data returned for '{symbol}' over the requested window")]
    NoData { symbol: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("provider rejected the request: {0}")]
    Rejected(String),
}

/// Narrow capability interface for the external market-data collaborator.
///
/// Implementations return raw daily bars for a symbol over an inclusive
/// date range, already normalized to calendar dates. Cleaning (dedupe,
/// ordering, completeness) happens above this trait.
pub trait MarketDataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a symbol over a date range.
    fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError>;
}
