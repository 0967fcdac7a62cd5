//! Remote metrics store: row schema, upsert capability, PostgREST client.
//!
//! The store is consumed through one narrow call — upsert rows into a named
//! table, deduplicating on a conflict key — so tests substitute an
//! in-memory fake and never touch the network.

use chrono::NaiveDate;
use reqwest::header;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StoreConfig;

/// Table every metric row is written to.
pub const METRICS_TABLE: &str = "crypto_metrics";

/// Uniqueness key making repeated uploads idempotent.
pub const CONFLICT_KEY: &str = "date,symbol,model_version";

/// One persisted row: either a historical observation (actual price set,
/// prediction fields null) or the forecast row (the reverse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub actual_price: Option<f64>,
    pub predicted_price: Option<f64>,
    pub model_version: String,
    pub confidence_score: Option<f64>,
    pub prediction_lower_bound: Option<f64>,
    pub prediction_upper_bound: Option<f64>,
}

/// Errors from the store layer. Any of these aborts remaining uploads.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store credential is not a valid header value: {0}")]
    Credential(String),

    #[error("store rejected the credential (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("store rejected the write (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("store network error: {0}")]
    Network(String),
}

/// Narrow capability interface for the external store.
pub trait StoreClient {
    /// Upsert `rows` into `table`, deduplicating on `conflict_key`.
    fn upsert(
        &self,
        table: &str,
        rows: &[MetricRecord],
        conflict_key: &str,
    ) -> Result<(), StoreError>;
}

/// PostgREST-style store client (Supabase REST).
pub struct PostgrestClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl PostgrestClient {
    /// Build a client with the credential installed as default headers.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let key = config.service_key.expose_secret();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| StoreError::Credential(e.to_string()))?;
        auth.set_sensitive(true);
        let mut apikey =
            header::HeaderValue::from_str(key).map_err(|e| StoreError::Credential(e.to_string()))?;
        apikey.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", apikey);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            "Prefer",
            header::HeaderValue::from_static("resolution=merge-duplicates,return=minimal"),
        );

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }
}

impl StoreClient for PostgrestClient {
    fn upsert(
        &self,
        table: &str,
        rows: &[MetricRecord],
        conflict_key: &str,
    ) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/{table}", self.base_url);

        let resp = self
            .client
            .post(&url)
            .query(&[("on_conflict", conflict_key)])
            .json(rows)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(StoreError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
