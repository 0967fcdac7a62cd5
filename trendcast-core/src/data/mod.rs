//! Market data: provider trait, Yahoo Finance implementation, cleaning, fetch.

pub mod clean;
pub mod fetch;
pub mod provider;
pub mod yahoo;

pub use clean::clean_bars;
pub use fetch::fetch_history;
pub use provider::{DataError, MarketDataProvider};
pub use yahoo::YahooProvider;
