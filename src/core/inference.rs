//! Window-open inference from indoor/outdoor convergence.
//!
//! The instantaneous test asks: is the indoor environment moving toward
//! the outdoor one right now, the way it would with a window open? Its
//! counterpart, divergence, is the closing evidence: indoor moving away
//! from outdoor. Both read the most recent six fully-populated samples,
//! so a ~1/min channel gives a five-minute lookback.

use crate::core::series::{Sample, Series};
use serde::{Deserialize, Serialize};

/// Rows of complete history required before either test will run.
pub const LOOKBACK_ROWS: usize = 6;

/// Thresholds for the window-open (convergence) test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConvergenceThresholds {
    /// Minimum indoor/outdoor temperature gap for the test to apply (degC)
    pub min_gap_temp: f64,
    /// Minimum temperature change over the lookback (degC)
    pub min_change_temp: f64,
    /// Minimum humidity change over the lookback (%)
    pub min_change_humid: f64,
    /// Humidity gap below which the humidity signal cannot veto (%)
    pub min_humid_gap: f64,
}

impl Default for ConvergenceThresholds {
    fn default() -> Self {
        Self {
            min_gap_temp: 3.0,
            min_change_temp: 1.0,
            min_change_humid: 3.0,
            min_humid_gap: 5.0,
        }
    }
}

/// Thresholds for the window-closed (divergence) test.
///
/// Looser than the convergence side: a real close swings conditions
/// hard, so the test demands a large standing gap before it will fire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DivergenceThresholds {
    /// Minimum temperature change over the lookback (degC)
    pub min_change_temp: f64,
    /// Minimum standing temperature gap (degC)
    pub min_gap_temp: f64,
    /// Minimum humidity change over the lookback (%)
    pub min_change_humid: f64,
    /// Minimum standing humidity gap (%)
    pub min_gap_humid: f64,
}

impl Default for DivergenceThresholds {
    fn default() -> Self {
        Self {
            min_change_temp: 1.0,
            min_gap_temp: 10.0,
            min_change_humid: 2.0,
            min_gap_humid: 20.0,
        }
    }
}

/// Both threshold tables, as one tunable configuration block.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InferenceThresholds {
    #[serde(default)]
    pub convergence: ConvergenceThresholds,
    #[serde(default)]
    pub divergence: DivergenceThresholds,
}

/// Intermediate values of the convergence test, for observability.
///
/// All readings are rounded to two decimals. The gap-abs pair stays
/// `None` when the decision never reached the confirmation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub temp_change: f64,
    pub humid_change: f64,
    pub temp_gap_dir: f64,
    pub humid_gap_dir: f64,
    pub is_temp_converging: bool,
    pub is_humid_converging: bool,
    pub prev_temp_gap_abs: Option<f64>,
    pub curr_temp_gap_abs: Option<f64>,
}

/// Closing-evidence signal with the readings that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivergenceSignal {
    pub diverging: bool,
    pub temp_diverging: bool,
    pub humid_diverging: bool,
    pub temp_change: f64,
    pub humid_change: f64,
    pub temp_gap_dir: f64,
    pub humid_gap_dir: f64,
}

/// One fully-populated reading.
#[derive(Debug, Clone, Copy)]
struct CompleteRow {
    indoor_temp: f64,
    indoor_humidity: f64,
    outdoor_temp: f64,
    outdoor_humidity: f64,
}

impl CompleteRow {
    fn from_sample(sample: &Sample) -> Option<Self> {
        Some(Self {
            indoor_temp: sample.indoor_temp?,
            indoor_humidity: sample.indoor_humidity?,
            outdoor_temp: sample.outdoor_temp?,
            outdoor_humidity: sample.outdoor_humidity?,
        })
    }
}

/// Instantaneous "window likely open" test.
///
/// Evaluated in order: a sufficient temperature gap must exist, a rapid
/// indoor change must have happened, the temperature change must point
/// toward outdoor (humidity may veto only when its own signal is
/// strong), and finally the absolute gap must actually have shrunk.
/// Fewer than [`LOOKBACK_ROWS`] complete rows yields `(false, None)`.
pub fn infer_window_open(
    series: &Series,
    thresholds: &ConvergenceThresholds,
) -> (bool, Option<Diagnostics>) {
    let Some((prev, curr)) = lookback(series) else {
        return (false, None);
    };

    let temp_change = curr.indoor_temp - prev.indoor_temp;
    let humid_change = curr.indoor_humidity - prev.indoor_humidity;
    let temp_gap_dir = curr.indoor_temp - curr.outdoor_temp;
    let humid_gap_dir = curr.indoor_humidity - curr.outdoor_humidity;

    let mut likely_open = false;
    let mut is_temp_converging = false;
    let mut is_humid_converging = false;
    let mut prev_temp_gap_abs = None;
    let mut curr_temp_gap_abs = None;

    if temp_gap_dir.abs() >= thresholds.min_gap_temp
        && (temp_change.abs() >= thresholds.min_change_temp
            || humid_change.abs() >= thresholds.min_change_humid)
    {
        is_temp_converging = sign(temp_gap_dir) != sign(temp_change);

        // Humidity converges by default; it can only veto when its own
        // change and gap are both meaningful.
        is_humid_converging = true;
        if humid_change.abs() >= thresholds.min_change_humid
            && humid_gap_dir.abs() > thresholds.min_humid_gap
        {
            is_humid_converging = sign(humid_gap_dir) != sign(humid_change);
        }

        likely_open = is_temp_converging && is_humid_converging;
    }

    // Confirmation: the change must have reduced the absolute gap,
    // otherwise the apparent convergence was noise.
    if likely_open {
        let prev_gap = (prev.indoor_temp - prev.outdoor_temp).abs();
        let curr_gap = temp_gap_dir.abs();
        prev_temp_gap_abs = Some(round2(prev_gap));
        curr_temp_gap_abs = Some(round2(curr_gap));
        if curr_gap >= prev_gap {
            likely_open = false;
        }
    }

    let diagnostics = Diagnostics {
        temp_change: round2(temp_change),
        humid_change: round2(humid_change),
        temp_gap_dir: round2(temp_gap_dir),
        humid_gap_dir: round2(humid_gap_dir),
        is_temp_converging,
        is_humid_converging,
        prev_temp_gap_abs,
        curr_temp_gap_abs,
    };

    (likely_open, Some(diagnostics))
}

/// Instantaneous "window just closed" test: indoor readings pulling
/// away from a large standing gap on either variable.
///
/// `None` below [`LOOKBACK_ROWS`] complete rows; treat as not diverging.
pub fn detect_divergence(
    series: &Series,
    thresholds: &DivergenceThresholds,
) -> Option<DivergenceSignal> {
    let (prev, curr) = lookback(series)?;

    let temp_change = curr.indoor_temp - prev.indoor_temp;
    let humid_change = curr.indoor_humidity - prev.indoor_humidity;
    let temp_gap_dir = curr.indoor_temp - curr.outdoor_temp;
    let humid_gap_dir = curr.indoor_humidity - curr.outdoor_humidity;

    let temp_diverging = sign(temp_gap_dir) == sign(temp_change)
        && temp_change.abs() >= thresholds.min_change_temp
        && temp_gap_dir.abs() >= thresholds.min_gap_temp;

    let humid_diverging = sign(humid_gap_dir) == sign(humid_change)
        && humid_change.abs() >= thresholds.min_change_humid
        && humid_gap_dir.abs() >= thresholds.min_gap_humid;

    Some(DivergenceSignal {
        diverging: temp_diverging || humid_diverging,
        temp_diverging,
        humid_diverging,
        temp_change: round2(temp_change),
        humid_change: round2(humid_change),
        temp_gap_dir: round2(temp_gap_dir),
        humid_gap_dir: round2(humid_gap_dir),
    })
}

/// The oldest and newest rows of the complete-row lookback tail.
fn lookback(series: &Series) -> Option<(CompleteRow, CompleteRow)> {
    let rows: Vec<CompleteRow> = series
        .samples()
        .iter()
        .filter_map(CompleteRow::from_sample)
        .collect();

    if rows.len() < LOOKBACK_ROWS {
        return None;
    }
    Some((rows[rows.len() - LOOKBACK_ROWS], rows[rows.len() - 1]))
}

/// Three-valued sign: exact zero is its own sign, so a flat reading
/// never counts as moving in either direction.
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
