//! End-to-end pipeline tests against fixture collaborators.
//!
//! No network: the provider is a canned-bars fixture and the store is one
//! of three fakes (recording, failing-on-nth-call, or a conflict-key map
//! used to check upsert idempotence).

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;

use trendcast_core::data::{DataError, MarketDataProvider};
use trendcast_core::domain::PriceBar;
use trendcast_runner::{
    run_pipeline, JobConfig, MetricRecord, PipelineError, StoreClient, StoreError, CONFLICT_KEY,
    METRICS_TABLE,
};

// ── Fixtures ─────────────────────────────────────────────────────────

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

#[derive(Default)]
struct RecordingStore {
    calls: Mutex<Vec<(String, Vec<MetricRecord>, String)>>,
}

impl StoreClient for RecordingStore {
    fn upsert(
        &self,
        table: &str,
        rows: &[MetricRecord],
        conflict_key: &str,
    ) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push((
            table.to_string(),
            rows.to_vec(),
            conflict_key.to_string(),
        ));
        Ok(())
    }
}

/// In-memory store that honors the conflict key the way the real store
/// does: one row per (date, symbol, model_version), last write wins.
#[derive(Default)]
struct ConflictKeyStore {
    rows: Mutex<HashMap<(NaiveDate, String, String), MetricRecord>>,
}

impl ConflictKeyStore {
    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl StoreClient for ConflictKeyStore {
    fn upsert(
        &self,
        _table: &str,
        rows: &[MetricRecord],
        conflict_key: &str,
    ) -> Result<(), StoreError> {
        assert_eq!(conflict_key, CONFLICT_KEY);
        let mut map = self.rows.lock().unwrap();
        for row in rows {
            map.insert(
                (row.date, row.symbol.clone(), row.model_version.clone()),
                row.clone(),
            );
        }
        Ok(())
    }
}

/// 40 daily bars of a seeded random walk around 40k, like the instrument
/// the job was built for.
fn random_walk_bars(count: usize) -> Vec<PriceBar> {
    let mut rng = StdRng::seed_from_u64(42);
    let base_date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let mut close = 40_000.0_f64;

    (0..count)
        .map(|i| {
            let open = close;
            close += rng.gen_range(-500.0..500.0);
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.02,
                low: open.min(close) * 0.98,
                close,
                volume: rng.gen_range(1_000_000..5_000_000),
            }
        })
        .collect()
}

fn job_config(training_window: usize) -> JobConfig {
    JobConfig {
        training_window,
        ..JobConfig::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn forty_rows_window_thirty_produces_full_outcome() {
    let provider = FixtureProvider {
        bars: random_walk_bars(40),
    };
    let store = RecordingStore::default();
    let config = job_config(30);

    let outcome = run_pipeline(&config, &provider, &store, today()).unwrap();

    assert_eq!(outcome.bar_count, 40);
    assert_eq!(outcome.feature_count, 34);
    assert!(outcome.fit.slope.is_finite());
    assert!((0.0..=1.0).contains(&outcome.fit.confidence));
    assert!(outcome.fit.lower_bound < outcome.fit.prediction);
    assert!(outcome.fit.prediction < outcome.fit.upper_bound);
    assert_eq!(outcome.forecast_date, today() + chrono::Duration::days(1));

    // One history batch (40 rows) plus the forecast upsert, all keyed.
    let calls = store.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1.len(), 40);
    assert_eq!(calls[1].1.len(), 1);
    assert!(calls
        .iter()
        .all(|(table, _, key)| table == METRICS_TABLE && key == CONFLICT_KEY));

    let forecast = &calls[1].1[0];
    assert_eq!(forecast.date, outcome.forecast_date);
    assert!(forecast.actual_price.is_none());
    assert!(forecast.predicted_price.is_some());
}

#[test]
fn empty_provider_response_fails_with_no_data() {
    let provider = FixtureProvider { bars: Vec::new() };
    let store = RecordingStore::default();
    let config = job_config(30);

    let err = run_pipeline(&config, &provider, &store, today()).unwrap_err();
    match err {
        PipelineError::Data(DataError::NoData { symbol }) => assert_eq!(symbol, "BTC-USD"),
        other => panic!("expected NoData, got {other}"),
    }
    // Nothing was written.
    assert!(store.calls.lock().unwrap().is_empty());
}

#[test]
fn short_history_fails_with_insufficient_data() {
    // 20 bars leave 14 feature rows, under the 30-row training window.
    let provider = FixtureProvider {
        bars: random_walk_bars(20),
    };
    let store = RecordingStore::default();
    let config = job_config(30);

    let err = run_pipeline(&config, &provider, &store, today()).unwrap_err();
    assert!(matches!(err, PipelineError::Fit(_)));
    assert!(store.calls.lock().unwrap().is_empty());
}

#[test]
fn repeated_runs_do_not_duplicate_rows() {
    let provider = FixtureProvider {
        bars: random_walk_bars(40),
    };
    let store = ConflictKeyStore::default();
    let config = job_config(30);

    run_pipeline(&config, &provider, &store, today()).unwrap();
    let after_first = store.row_count();
    run_pipeline(&config, &provider, &store, today()).unwrap();

    // 40 historical rows + 1 forecast, both runs landing on the same keys.
    assert_eq!(after_first, 41);
    assert_eq!(store.row_count(), after_first);
}

#[test]
fn store_failure_surfaces_as_upload_error() {
    struct AlwaysFailingStore;

    impl StoreClient for AlwaysFailingStore {
        fn upsert(
            &self,
            _table: &str,
            _rows: &[MetricRecord],
            _conflict_key: &str,
        ) -> Result<(), StoreError> {
            Err(StoreError::Network("connection refused".into()))
        }
    }

    let provider = FixtureProvider {
        bars: random_walk_bars(40),
    };
    let config = job_config(30);

    let err = run_pipeline(&config, &provider, &AlwaysFailingStore, today()).unwrap_err();
    assert!(matches!(err, PipelineError::Upload(_)));
}

#[test]
fn dirty_provider_data_is_cleaned_before_upload() {
    // Duplicate a date and break a row; the pipeline must upload one row
    // per distinct complete date.
    let mut bars = random_walk_bars(40);
    let mut dup = bars[10].clone();
    dup.close += 123.0;
    bars.push(dup);
    bars[5].high = f64::NAN;

    let provider = FixtureProvider { bars };
    let store = RecordingStore::default();
    let config = job_config(30);

    let outcome = run_pipeline(&config, &provider, &store, today()).unwrap();
    assert_eq!(outcome.bar_count, 39);

    let calls = store.calls.lock().unwrap();
    let history = &calls[0].1;
    assert_eq!(history.len(), 39);
    let mut dates: Vec<NaiveDate> = history.iter().map(|r| r.date).collect();
    dates.dedup();
    assert_eq!(dates.len(), 39);
}
