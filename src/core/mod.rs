//! Core inference and classification engine.
//!
//! This module contains:
//! - Series cleaning (ordering and gap-filling of raw samples)
//! - Feature derivation (smoothing, THI, deltas, correlations, spikes)
//! - Window-open inference (convergence and divergence tests)
//! - The persistent open/closed state machine
//! - The deterministic advisory engine

pub mod advisory;
pub mod features;
pub mod inference;
pub mod series;
pub mod state;

// Re-export commonly used types
pub use advisory::{advise, Advisory, ClothingBias, ComfortLevel};
pub use features::{compute_thi, snapshot, Snapshot};
pub use inference::{
    detect_divergence, infer_window_open, ConvergenceThresholds, Diagnostics, DivergenceSignal,
    DivergenceThresholds, InferenceThresholds, LOOKBACK_ROWS,
};
pub use series::{Sample, Series};
pub use state::{AlertKind, WindowState};
