//! Uploader: metric records from pipeline output, written as batched upserts.

use chrono::NaiveDate;

use trendcast_core::domain::PriceBar;
use trendcast_core::model::TrendFit;

use crate::store::{MetricRecord, StoreClient, StoreError, CONFLICT_KEY, METRICS_TABLE};

/// Rows per upsert call, to respect the store's payload-size limits.
pub const BATCH_SIZE: usize = 100;

/// What a completed upload wrote.
#[derive(Debug)]
pub struct UploadSummary {
    pub historical_rows: usize,
    pub batches: usize,
    pub forecast_date: NaiveDate,
}

/// Upsert the historical observations and the single forecast row.
///
/// History goes first, in independent `BATCH_SIZE` chunks; the forecast row
/// is a final separate upsert. The first store error aborts the remaining
/// writes. Batches already upserted stay in place; the conflict key makes a
/// rerun converge rather than duplicate.
pub fn upload_metrics(
    store: &dyn StoreClient,
    symbol: &str,
    model_version: &str,
    bars: &[PriceBar],
    fit: &TrendFit,
    forecast_date: NaiveDate,
) -> Result<UploadSummary, StoreError> {
    let historical: Vec<MetricRecord> = bars
        .iter()
        .map(|bar| MetricRecord {
            date: bar.date,
            symbol: symbol.to_string(),
            actual_price: Some(bar.close),
            predicted_price: None,
            model_version: model_version.to_string(),
            confidence_score: None,
            prediction_lower_bound: None,
            prediction_upper_bound: None,
        })
        .collect();

    let mut batches = 0;
    for chunk in historical.chunks(BATCH_SIZE) {
        store.upsert(METRICS_TABLE, chunk, CONFLICT_KEY)?;
        batches += 1;
    }

    let forecast = MetricRecord {
        date: forecast_date,
        symbol: symbol.to_string(),
        actual_price: None,
        predicted_price: Some(round2(fit.prediction)),
        model_version: model_version.to_string(),
        confidence_score: Some(round4(fit.confidence)),
        prediction_lower_bound: Some(round2(fit.lower_bound)),
        prediction_upper_bound: Some(round2(fit.upper_bound)),
    };
    store.upsert(METRICS_TABLE, std::slice::from_ref(&forecast), CONFLICT_KEY)?;

    Ok(UploadSummary {
        historical_rows: historical.len(),
        batches,
        forecast_date,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
