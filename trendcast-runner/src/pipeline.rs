//! The end-to-end pipeline: fetch → features → fit → upload.
//!
//! Everything runs synchronously on the calling thread and recomputes from
//! scratch; the only idempotence is at the storage layer, via the upsert
//! conflict key. No failure is retried.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use trendcast_core::data::{fetch_history, DataError, MarketDataProvider};
use trendcast_core::features::build_features;
use trendcast_core::model::{fit_trend, FitError, TrendFit};

use crate::config::JobConfig;
use crate::store::{StoreClient, StoreError};
use crate::uploader::upload_metrics;

/// Errors from any pipeline stage. All are terminal for the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("model error: {0}")]
    Fit(#[from] FitError),

    #[error("upload error: {0}")]
    Upload(#[from] StoreError),
}

/// What one completed run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub symbol: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub bar_count: usize,
    pub feature_count: usize,
    pub fit: TrendFit,
    pub forecast_date: NaiveDate,
    pub uploaded_rows: usize,
}

/// Run the whole pipeline for `today`'s invocation.
///
/// Progress is printed as stages complete; the returned outcome carries
/// everything the caller needs for the final summary.
pub fn run_pipeline(
    config: &JobConfig,
    provider: &dyn MarketDataProvider,
    store: &dyn StoreClient,
    today: NaiveDate,
) -> Result<PipelineOutcome, PipelineError> {
    println!(
        "Fetching {} days of {} history from {}...",
        config.lookback_days,
        config.symbol,
        provider.name()
    );
    let bars = fetch_history(provider, &config.symbol, today, config.lookback_days)?;
    let first_date = bars.first().map(|b| b.date).unwrap_or(today);
    let last_date = bars.last().map(|b| b.date).unwrap_or(today);
    println!("  {} rows after cleaning ({first_date} to {last_date})", bars.len());

    let features = build_features(&bars);
    println!("  {} feature rows", features.len());

    println!(
        "Fitting trend over the last {} rows...",
        config.training_window
    );
    let fit = fit_trend(&features, config.training_window)?;
    println!(
        "  slope {:+.4}/day  MAE {:.2}  RMSE {:.2}  R² {:.4}",
        fit.slope, fit.mae, fit.rmse, fit.r_squared
    );

    let forecast_date = today + Duration::days(1);
    println!("Uploading history and forecast...");
    let summary = upload_metrics(
        store,
        &config.symbol,
        &config.model_version,
        &bars,
        &fit,
        forecast_date,
    )?;
    println!(
        "  {} historical rows in {} batch(es), forecast for {}",
        summary.historical_rows, summary.batches, summary.forecast_date
    );

    Ok(PipelineOutcome {
        symbol: config.symbol.clone(),
        first_date,
        last_date,
        bar_count: bars.len(),
        feature_count: features.len(),
        fit,
        forecast_date,
        uploaded_rows: summary.historical_rows + 1,
    })
}
