//! Ordinary-least-squares trend fit and one-day-ahead forecast.
//!
//! The model regresses close against a 0..W-1 training index over the most
//! recent W feature rows, so the slope reads as price change per day of the
//! recent trend. Everything here is a pure function of its inputs: no
//! randomness, identical rows give identical output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureRow;

/// Errors from the fitting step.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("insufficient data: {available} feature rows, {required} required")]
    InsufficientData { required: usize, available: usize },
}

/// Result of fitting the trend model over one training window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendFit {
    /// Regression slope, in price units per day.
    pub slope: f64,
    pub intercept: f64,
    /// Mean absolute error of in-sample predictions.
    pub mae: f64,
    /// Root-mean-square error of in-sample predictions.
    pub rmse: f64,
    /// In-sample coefficient of determination (unclamped).
    pub r_squared: f64,
    /// Population standard deviation of in-sample residuals.
    pub residual_std: f64,
    /// Forecast close one day past the training window.
    pub prediction: f64,
    /// R-squared clamped to [0, 1]. Not a calibrated probability.
    pub confidence: f64,
    /// Lower edge of the 95% band around the prediction.
    pub lower_bound: f64,
    /// Upper edge of the 95% band around the prediction.
    pub upper_bound: f64,
    /// Number of rows the fit was trained on.
    pub window: usize,
}

/// Fit the trend over the most recent `window` rows and forecast one day out.
///
/// The 95% band is prediction ± 1.96 × residual_std, a normal approximation
/// over in-sample residuals. It is not a rigorous out-of-sample prediction
/// interval and should not be read as one.
pub fn fit_trend(rows: &[FeatureRow], window: usize) -> Result<TrendFit, FitError> {
    assert!(window >= 2, "training window must be >= 2");
    if rows.len() < window {
        return Err(FitError::InsufficientData {
            required: window,
            available: rows.len(),
        });
    }

    // Most recent W rows, re-indexed 0..W-1. The training index is the
    // regression feature; day_index is not used here.
    let train = &rows[rows.len() - window..];
    let closes: Vec<f64> = train.iter().map(|r| r.close).collect();

    let n = window as f64;
    let mean_x = (window - 1) as f64 / 2.0;
    let mean_y = mean(&closes);

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for (i, &y) in closes.iter().enumerate() {
        let dx = i as f64 - mean_x;
        ss_xx += dx * dx;
        ss_xy += dx * (y - mean_y);
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let residuals: Vec<f64> = closes
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (slope * i as f64 + intercept))
        .collect();

    let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n;
    let mse = residuals.iter().map(|r| r * r).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_tot: f64 = closes.iter().map(|&y| (y - mean_y).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        // Constant target fitted exactly.
        1.0
    } else {
        0.0
    };

    let prediction = slope * window as f64 + intercept;

    // Population standard deviation of the residuals (mean not assumed zero).
    let mean_r = mean(&residuals);
    let residual_std =
        (residuals.iter().map(|r| (r - mean_r).powi(2)).sum::<f64>() / n).sqrt();

    Ok(TrendFit {
        slope,
        intercept,
        mae,
        rmse,
        r_squared,
        residual_std,
        prediction,
        confidence: r_squared.clamp(0.0, 1.0),
        lower_bound: prediction - 1.96 * residual_std,
        upper_bound: prediction + 1.96 * residual_std,
        window,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
