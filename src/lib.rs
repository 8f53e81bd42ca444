//! Roomsense Agent - window-state inference from indoor/outdoor climate feeds.
//!
//! This library turns a pair of temperature/humidity sensor feeds into
//! actionable room advice: it cleans the raw series, derives comfort and
//! coupling metrics, infers window open/close events and formats alerts
//! and recommendations for delivery over a Telegram bot.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Roomsense Agent                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Source    │──▶│   Series    │──▶│  Features   │       │
//! │  │ (HTTP feed) │   │  (cleaning) │   │ (snapshot)  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                           │                  │              │
//! │                           ▼                  ▼              │
//! │                    ┌─────────────┐   ┌─────────────┐       │
//! │                    │  Inference  │──▶│    State    │       │
//! │                    │ (conv/div)  │   │  (alerts)   │       │
//! │                    └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use roomsense_agent::core::{snapshot, ConvergenceThresholds, Sample, Series};
//! use chrono::Utc;
//!
//! let series = Series::clean(vec![Sample::complete(Utc::now(), 21.5, 55.0, 9.0, 70.0)]);
//! if let Some(snap) = snapshot(&series, &ConvergenceThresholds::default()) {
//!     println!("THI {:.1}, window open: {}", snap.thi, snap.likely_open);
//! }
//! ```

pub mod agent;
pub mod config;
pub mod core;
pub mod notify;
pub mod report;
pub mod source;

// Re-export key types at crate root for convenience
pub use agent::{Agent, AgentError, Observation};
pub use config::{ChannelConfig, Config, ConfigError, ScheduleConfig, TelegramConfig};
pub use core::{
    advise, compute_thi, detect_divergence, infer_window_open, snapshot, Advisory, AlertKind,
    ClothingBias, ComfortLevel, InferenceThresholds, Sample, Series, Snapshot, WindowState,
};
pub use notify::{Notifier, NotifyError};
pub use source::{SampleSource, SourceError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
