//! Orchestration: fetch, infer, persist window state, notify.
//!
//! The agent owns the sample source, the notifier and the persistent
//! [`WindowState`]. One instance drives both the long-running scheduler
//! (`run`) and the one-shot CLI commands.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::core::{
    advise, detect_divergence, snapshot, Advisory, AlertKind, ClothingBias, Series, Snapshot,
    WindowState,
};
use crate::notify::{Notifier, NotifyError};
use crate::report;
use crate::source::{SampleSource, SourceError};

#[derive(Debug)]
pub enum AgentError {
    Source(SourceError),
    Notify(NotifyError),
    BadTimezone(String),
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentError::Source(e) => write!(f, "sample source error: {}", e),
            AgentError::Notify(e) => write!(f, "notification error: {}", e),
            AgentError::BadTimezone(tz) => write!(f, "unknown timezone: {}", tz),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<SourceError> for AgentError {
    fn from(e: SourceError) -> Self {
        AgentError::Source(e)
    }
}

impl From<NotifyError> for AgentError {
    fn from(e: NotifyError) -> Self {
        AgentError::Notify(e)
    }
}

/// One fetched and cleaned observation of the room.
pub struct Observation {
    pub series: Series,
    pub snapshot: Option<Snapshot>,
}

impl Observation {
    /// Snapshot with its advisory, when the series was usable.
    pub fn advised(&self) -> Option<(&Snapshot, Advisory)> {
        let snap = self.snapshot.as_ref()?;
        Some((snap, advise(snap, ClothingBias::Normal)))
    }
}

pub struct Agent {
    config: Config,
    source: SampleSource,
    notifier: Notifier,
    state: Mutex<WindowState>,
}

impl Agent {
    pub fn new(config: Config) -> Result<Self, AgentError> {
        let source = SampleSource::new(config.channel.clone())?;
        let notifier = Notifier::new(config.telegram.clone())?;

        Ok(Self {
            config,
            source,
            notifier,
            // Assume closed on startup; the first divergence while open
            // would otherwise fire a spurious close alert.
            state: Mutex::new(WindowState::closed()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Fetch the recent feed and derive the latest snapshot.
    pub async fn observe(&self) -> Result<Observation, AgentError> {
        let samples = self.source.fetch_recent().await?;
        let series = Series::clean(samples);
        let snapshot = snapshot(&series, &self.config.thresholds.convergence);
        Ok(Observation { series, snapshot })
    }

    /// One scheduler tick: fetch, run both tests, advance the state
    /// machine and deliver any alert it produced.
    ///
    /// Notification failures are logged and swallowed so a flaky bot
    /// API cannot stall the state machine.
    pub async fn run_check(&self) -> Result<Option<AlertKind>, AgentError> {
        let observation = self.observe().await?;
        let Some(snap) = observation.snapshot.as_ref() else {
            tracing::warn!("no usable rows in the fetched feed, skipping check");
            return Ok(None);
        };

        let divergence =
            detect_divergence(&observation.series, &self.config.thresholds.divergence);
        let diverging = divergence.as_ref().map(|d| d.diverging).unwrap_or(false);

        let alert = {
            let mut state = self.state.lock().await;
            state.update(snap.likely_open, diverging)
        };

        if let Some(kind) = alert {
            tracing::info!(alert = %kind, "window state transition");
            let advisory = advise(snap, ClothingBias::Normal);
            let text = report::alert_text(kind, snap, &advisory, divergence.as_ref());
            if let Err(err) = self.notifier.notify_owner(&text).await {
                tracing::warn!(error = %err, "failed to deliver alert");
            }
        }

        Ok(alert)
    }

    /// Whether the state machine currently believes the window is open.
    pub async fn window_open(&self) -> bool {
        self.state.lock().await.is_open
    }

    pub async fn send_startup_notice(&self) -> Result<(), AgentError> {
        self.notifier.notify_owner(&report::startup_text()).await?;
        Ok(())
    }

    pub async fn send_daily_greeting(&self) -> Result<(), AgentError> {
        let observation = self.observe().await?;
        match observation.advised() {
            Some((snap, advisory)) => {
                let text = report::greeting_text(snap, &advisory);
                self.notifier.notify_owner(&text).await?;
            }
            None => {
                self.notifier.notify_owner(report::NO_DATA_TEXT).await?;
            }
        }
        Ok(())
    }

    pub async fn send_roommate_request(&self) -> Result<(), AgentError> {
        let observation = self.observe().await?;
        match observation.advised() {
            Some((snap, advisory)) => {
                let text = report::roommate_request_text(snap, &advisory);
                self.notifier.notify_roommate(&text).await?;
            }
            None => {
                self.notifier.notify_roommate(report::NO_DATA_TEXT).await?;
            }
        }
        Ok(())
    }

    /// Next occurrence of the configured greeting time, in UTC.
    ///
    /// `None` when the timezone is invalid or the local wall-clock time
    /// does not exist that day (DST gap); the greeting is skipped.
    fn next_greeting(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let schedule = &self.config.schedule;
        let tz: Tz = schedule.timezone.parse().ok()?;
        let local_now = now.with_timezone(&tz);

        for day_offset in 0..2 {
            let date = local_now.date_naive() + chrono::Duration::days(day_offset);
            let naive = date.and_hms_opt(schedule.daily_hour, schedule.daily_minute, 0)?;
            if let Some(target) = naive.and_local_timezone(tz).earliest() {
                if target > local_now {
                    return Some(target.with_timezone(&Utc));
                }
            }
        }
        None
    }

    /// Long-running scheduler: periodic checks, a daily greeting and a
    /// clean shutdown on ctrl-c.
    pub async fn run(&self) -> Result<(), AgentError> {
        if let Err(err) = self.send_startup_notice().await {
            tracing::warn!(error = %err, "startup notice not delivered");
        }

        let mut check = tokio::time::interval(Duration::from_secs(
            self.config.schedule.check_interval_secs,
        ));
        check.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut greeting_at = self.next_greeting(Utc::now());
        tracing::info!(
            interval_secs = self.config.schedule.check_interval_secs,
            next_greeting = ?greeting_at,
            "scheduler started"
        );

        loop {
            tokio::select! {
                _ = check.tick() => {
                    if let Err(err) = self.run_check().await {
                        tracing::warn!(error = %err, "periodic check failed");
                    }
                }
                _ = wait_until(greeting_at) => {
                    if let Err(err) = self.send_daily_greeting().await {
                        tracing::warn!(error = %err, "daily greeting failed");
                    }
                    greeting_at = self.next_greeting(Utc::now());
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Sleeps until `target`, or forever when there is nothing scheduled.
async fn wait_until(target: Option<DateTime<Utc>>) {
    match target {
        Some(at) => {
            let remaining = (at - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(remaining).await;
        }
        None => std::future::pending().await,
    }
}
