//! End-to-end tests for the inference pipeline: raw samples through
//! cleaning, snapshot, the two window tests and the state machine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use roomsense_agent::core::{
    detect_divergence, snapshot, ConvergenceThresholds, DivergenceThresholds, Sample, Series,
    WindowState,
};
use roomsense_agent::AlertKind;

fn ts(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap() + Duration::minutes(minute)
}

/// Steady series: indoor and outdoor flat, nothing should fire.
#[test]
fn test_steady_room_produces_quiet_snapshot() {
    let samples: Vec<Sample> = (0..10)
        .map(|i| Sample::complete(ts(i), 25.0, 50.0, 20.0, 50.0))
        .collect();

    let series = Series::clean(samples);
    let snap = snapshot(&series, &ConvergenceThresholds::default()).unwrap();

    assert_eq!(snap.indoor_temp_smooth, 25.0);
    assert!(!snap.temp_spike);
    assert!(!snap.humidity_spike);
    assert!(!snap.likely_open);
    // THI(25, 50) = 25 - (0.55 - 0.275) * 10.5
    assert!((snap.thi - 22.1125).abs() < 1e-9);

    let divergence = detect_divergence(&series, &DivergenceThresholds::default()).unwrap();
    assert!(!divergence.diverging);
}

/// A fast indoor cool-down toward a cold outdoor reads as an opening:
/// 22C falling to 18C against a 10C street closes the gap sharply.
#[test]
fn test_cooling_toward_outdoor_is_likely_open() {
    let temps = [22.0, 21.2, 20.4, 19.6, 18.8, 18.0];
    let samples: Vec<Sample> = temps
        .iter()
        .enumerate()
        .map(|(i, &t)| Sample::complete(ts(i as i64), t, 50.0, 10.0, 60.0))
        .collect();

    let series = Series::clean(samples);
    let snap = snapshot(&series, &ConvergenceThresholds::default()).unwrap();

    assert!(snap.likely_open);
    let diag = snap.diagnostics.unwrap();
    assert!(diag.is_temp_converging);
    // Gap shrank from 12 to 8, so the confirmation step accepted.
    assert_eq!(diag.prev_temp_gap_abs, Some(12.0));
    assert_eq!(diag.curr_temp_gap_abs, Some(8.0));
}

/// Indoor and outdoor tracking each other with an unchanged gap is a
/// shared weather trend, not a window: confirmation must reject it.
#[test]
fn test_parallel_drift_rejected_by_confirmation() {
    let samples: Vec<Sample> = (0..6)
        .map(|i| {
            let drop = i as f64 * 0.4;
            Sample::complete(ts(i), 22.0 - drop, 50.0, 14.0 - drop, 60.0)
        })
        .collect();

    let series = Series::clean(samples);
    let snap = snapshot(&series, &ConvergenceThresholds::default()).unwrap();

    assert!(!snap.likely_open);
    let diag = snap.diagnostics.unwrap();
    assert!(diag.is_temp_converging);
    assert_eq!(diag.prev_temp_gap_abs, diag.curr_temp_gap_abs);
}

/// Rows with a missing outdoor humidity at the head stay incomplete
/// (forward fill never looks backward) but the pipeline still produces
/// a snapshot from the later, complete tail.
#[test]
fn test_leading_missing_outdoor_humidity() {
    let mut samples: Vec<Sample> = (0..3)
        .map(|i| Sample {
            timestamp: ts(i),
            indoor_temp: Some(21.0),
            indoor_humidity: Some(50.0),
            outdoor_temp: Some(10.0),
            outdoor_humidity: None,
        })
        .collect();
    samples.extend((3..10).map(|i| Sample::complete(ts(i), 21.0, 50.0, 10.0, 60.0)));

    let series = Series::clean(samples);
    assert_eq!(series.complete_rows().len(), 7);

    let snap = snapshot(&series, &ConvergenceThresholds::default()).unwrap();
    assert_eq!(snap.outdoor_humidity, 60.0);
    assert_eq!(snap.timestamp, ts(9));
}

/// Full lifecycle through the state machine: quiet, opening alert,
/// plateau reminder while open, then a close alert on divergence.
#[test]
fn test_state_machine_lifecycle() {
    let conv = ConvergenceThresholds::default();
    let div = DivergenceThresholds::default();
    let mut state = WindowState::closed();

    // Tick 1: steady room, nothing happens.
    let steady: Vec<Sample> = (0..6)
        .map(|i| Sample::complete(ts(i), 22.0, 50.0, 10.0, 60.0))
        .collect();
    let series = Series::clean(steady);
    let snap = snapshot(&series, &conv).unwrap();
    let diverging = detect_divergence(&series, &div).unwrap().diverging;
    assert_eq!(state.update(snap.likely_open, diverging), None);
    assert!(!state.is_open);

    // Tick 2: sharp cool-down toward the street, window opens.
    let cooling: Vec<Sample> = [22.0, 21.0, 20.0, 19.0, 18.5, 18.0]
        .iter()
        .enumerate()
        .map(|(i, &t)| Sample::complete(ts(6 + i as i64), t, 50.0, 10.0, 60.0))
        .collect();
    let series = Series::clean(cooling);
    let snap = snapshot(&series, &conv).unwrap();
    let diverging = detect_divergence(&series, &div).unwrap().diverging;
    assert_eq!(
        state.update(snap.likely_open, diverging),
        Some(AlertKind::NewOpening)
    );
    assert!(state.is_open);

    // Tick 3: readings settle near the street, still open: plateau
    // reminder fires every tick.
    let settled: Vec<Sample> = (0..6)
        .map(|i| Sample::complete(ts(12 + i), 17.8, 55.0, 10.0, 60.0))
        .collect();
    let series = Series::clean(settled);
    let snap = snapshot(&series, &conv).unwrap();
    let diverging = detect_divergence(&series, &div).unwrap().diverging;
    assert_eq!(
        state.update(snap.likely_open, diverging),
        Some(AlertKind::OpenPlateau)
    );
    assert!(state.is_open);

    // Tick 4: indoor warms hard away from a wide gap, window closed.
    let warming: Vec<Sample> = [20.0, 21.5, 23.0, 24.0, 25.0, 26.0]
        .iter()
        .enumerate()
        .map(|(i, &t)| Sample::complete(ts(18 + i as i64), t, 50.0, 10.0, 60.0))
        .collect();
    let series = Series::clean(warming);
    let snap = snapshot(&series, &conv).unwrap();
    let signal = detect_divergence(&series, &div).unwrap();
    assert!(signal.temp_diverging);
    assert_eq!(
        state.update(snap.likely_open, signal.diverging),
        Some(AlertKind::WindowClosed)
    );
    assert!(!state.is_open);
}

/// Below six complete rows neither test can run and the room is
/// treated as quiet.
#[test]
fn test_short_series_is_inconclusive() {
    let samples: Vec<Sample> = (0..4)
        .map(|i| Sample::complete(ts(i), 18.0, 50.0, 10.0, 60.0))
        .collect();

    let series = Series::clean(samples);
    let snap = snapshot(&series, &ConvergenceThresholds::default()).unwrap();

    assert!(!snap.likely_open);
    assert!(detect_divergence(&series, &DivergenceThresholds::default()).is_none());
}
