//! Derived metrics over a cleaned series.
//!
//! Computes the smoothed indoor readings, the thermal comfort index,
//! tick deltas and spike flags, and the indoor/outdoor correlations,
//! then assembles them into a [`Snapshot`] taken from the latest row
//! with all required derived fields.

use crate::core::inference::{self, ConvergenceThresholds, Diagnostics};
use crate::core::series::Series;
use chrono::{DateTime, Utc};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Trailing window for smoothing (5 samples ~= 5 minutes at 1/min).
const SMOOTHING_WINDOW: usize = 5;

/// A humidity rise above this over one tick is flagged as a spike (%).
const HUMIDITY_SPIKE_THRESHOLD: f64 = 10.0;

/// A temperature move beyond this over one tick, either direction (degC).
const TEMP_SPIKE_THRESHOLD: f64 = 2.0;

/// Derived, immutable metrics from the latest usable tail of a series.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Timestamp of the row the snapshot was taken from
    pub timestamp: DateTime<Utc>,
    /// Rolling-mean indoor temperature (degC)
    pub indoor_temp_smooth: f64,
    /// Rolling-mean indoor humidity (%)
    pub indoor_humidity_smooth: f64,
    /// Raw outdoor temperature (degC)
    pub outdoor_temp: f64,
    /// Raw outdoor humidity (%)
    pub outdoor_humidity: f64,
    /// Thermal comfort index from the smoothed values
    pub thi: f64,
    /// Raw indoor minus outdoor temperature (degC)
    pub delta_temp: f64,
    /// Most recent one-tick change in raw indoor temperature
    pub last_temp_change: f64,
    /// Most recent one-tick change in raw indoor humidity
    pub last_humid_change: f64,
    /// Temperature moved more than the spike threshold on the last tick
    pub temp_spike: bool,
    /// Humidity rose more than the spike threshold on the last tick
    pub humidity_spike: bool,
    /// Pearson correlation of indoor vs outdoor temperature
    pub corr_temp: Option<f64>,
    /// Pearson correlation of indoor vs outdoor humidity
    pub corr_humidity: Option<f64>,
    /// Instantaneous "window likely open" inference
    pub likely_open: bool,
    /// Intermediate inference values, empty below the history minimum
    pub diagnostics: Option<Diagnostics>,
}

/// Thermal comfort index from smoothed temperature and humidity.
///
/// Humidity raises perceived warmth above 14.5 degC and lowers it below.
pub fn compute_thi(temp: f64, humidity: f64) -> f64 {
    temp - (0.55 - 0.0055 * humidity) * (temp - 14.5)
}

/// Build a snapshot from the latest row where the smoothed indoor
/// readings and both raw outdoor readings are all available.
///
/// Returns `None` when no such row exists (including the empty series).
pub fn snapshot(series: &Series, thresholds: &ConvergenceThresholds) -> Option<Snapshot> {
    let samples = series.samples();

    let indoor_temp_smooth = rolling_mean(samples.iter().map(|s| s.indoor_temp));
    let indoor_humidity_smooth = rolling_mean(samples.iter().map(|s| s.indoor_humidity));

    // Latest row with every field the snapshot needs.
    let idx = (0..samples.len()).rev().find(|&i| {
        indoor_temp_smooth[i].is_some()
            && indoor_humidity_smooth[i].is_some()
            && samples[i].indoor_temp.is_some()
            && samples[i].outdoor_temp.is_some()
            && samples[i].outdoor_humidity.is_some()
    })?;

    let row = &samples[idx];
    let temp_smooth = indoor_temp_smooth[idx]?;
    let humidity_smooth = indoor_humidity_smooth[idx]?;
    let outdoor_temp = row.outdoor_temp?;
    let outdoor_humidity = row.outdoor_humidity?;
    let indoor_temp = row.indoor_temp?;

    let last_temp_change = last_tick_change(samples.iter().map(|s| s.indoor_temp));
    let last_humid_change = last_tick_change(samples.iter().map(|s| s.indoor_humidity));

    let (corr_temp, corr_humidity) = correlations(series);
    let (likely_open, diagnostics) = inference::infer_window_open(series, thresholds);

    Some(Snapshot {
        timestamp: row.timestamp,
        indoor_temp_smooth: temp_smooth,
        indoor_humidity_smooth: humidity_smooth,
        outdoor_temp,
        outdoor_humidity,
        thi: compute_thi(temp_smooth, humidity_smooth),
        delta_temp: indoor_temp - outdoor_temp,
        last_temp_change,
        last_humid_change,
        temp_spike: last_temp_change.abs() > TEMP_SPIKE_THRESHOLD,
        humidity_spike: last_humid_change > HUMIDITY_SPIKE_THRESHOLD,
        corr_temp,
        corr_humidity,
        likely_open,
        diagnostics,
    })
}

/// Indoor-vs-outdoor Pearson correlations for temperature and humidity,
/// computed over the rows where all four raw fields are present.
pub fn correlations(series: &Series) -> (Option<f64>, Option<f64>) {
    let rows = series.complete_rows();

    let (mut it, mut ot, mut ih, mut oh) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for row in rows {
        it.push(row.indoor_temp.unwrap_or_default());
        ot.push(row.outdoor_temp.unwrap_or_default());
        ih.push(row.indoor_humidity.unwrap_or_default());
        oh.push(row.outdoor_humidity.unwrap_or_default());
    }

    (pearson(&it, &ot), pearson(&ih, &oh))
}

/// Trailing rolling mean over up to [`SMOOTHING_WINDOW`] samples,
/// skipping missing values; `None` where the whole window is missing.
fn rolling_mean(values: impl Iterator<Item = Option<f64>>) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = values.collect();
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let start = i.saturating_sub(SMOOTHING_WINDOW - 1);
            let window: Vec<f64> = values[start..=i].iter().filter_map(|v| *v).collect();
            if window.is_empty() {
                None
            } else {
                Some(window.iter().mean())
            }
        })
        .collect()
}

/// First difference across the last two samples; 0.0 unless both are present.
fn last_tick_change(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let values: Vec<Option<f64>> = values.collect();
    match values.as_slice() {
        [.., Some(prev), Some(curr)] => curr - prev,
        _ => 0.0,
    }
}

/// Pearson correlation coefficient; `None` below 2 points or when
/// either input has zero variance.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }

    let mean_x = xs.iter().mean();
    let mean_y = ys.iter().mean();

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        None
    } else {
        Some(cov / denom)
    }
}
