//! Human-facing message formatting.
//!
//! Everything the notifier delivers or a CLI command prints is built
//! here, from a snapshot and its advisory. Messages use Telegram HTML
//! markup, which degrades gracefully on a terminal.

use crate::core::{Advisory, AlertKind, DivergenceSignal, Snapshot};

/// Fallback for every command when no snapshot could be produced.
pub const NO_DATA_TEXT: &str = "No recent data available.";

/// Mini-dashboard: current readings and comfort band.
pub fn status_text(snapshot: &Snapshot, advisory: &Advisory) -> String {
    format!(
        "\u{1f3e0} <b>Indoor</b>: {:.2}\u{00b0}C, {:.1}% RH\n\
         \u{1f324} <b>Outdoor</b>: {:.2}\u{00b0}C, {:.1}% RH\n\
         \u{1f4ca} <b>THI</b>: {:.1} ({})",
        snapshot.indoor_temp_smooth,
        snapshot.indoor_humidity_smooth,
        snapshot.outdoor_temp,
        snapshot.outdoor_humidity,
        snapshot.thi,
        advisory.comfort
    )
}

/// Ventilation and clothing advice plus the window verdict.
pub fn recommend_text(advisory: &Advisory) -> String {
    format!(
        "{}\n\n\u{1f455}: {}\n\nWindow status: {}",
        advisory.ventilation, advisory.clothing, advisory.window_status
    )
}

/// Room performance analysis from the two correlations.
///
/// `None` when either correlation is undefined; the caller reports
/// insufficient data instead.
pub fn analyse_text(snapshot: &Snapshot, advisory: &Advisory, sample_count: usize) -> Option<String> {
    let corr_temp = snapshot.corr_temp?;
    let corr_humidity = snapshot.corr_humidity?;

    Some(format!(
        "\u{1f52c} <b>Room Performance Analysis</b>\n\n\
         <i>(correlation over the last ~{sample_count} minutes)</i>\n\n\
         \u{1f321} <b>Temperature correlation (insulation)</b>\n\
         Index: <code>{corr_temp:.2}</code>\n{}\n\n\
         \u{1f4a7} <b>Humidity correlation (air exchange)</b>\n\
         Index: <code>{corr_humidity:.2}</code>\n{}",
        advisory.insulation, advisory.air_exchange
    ))
}

/// Morning greeting with the day's conditions and clothing advice.
pub fn greeting_text(snapshot: &Snapshot, advisory: &Advisory) -> String {
    format!(
        "\u{1f305} <b>Morning!</b>\n\n\
         Indoor: {:.2}\u{00b0}C, {:.1}% RH\n\
         Outdoor: {:.2}\u{00b0}C, {:.1}% RH\n\
         THI: {:.1} ({})\n\
         What to wear: {}\n\n\
         Have a good day!",
        snapshot.indoor_temp_smooth,
        snapshot.indoor_humidity_smooth,
        snapshot.outdoor_temp,
        snapshot.outdoor_humidity,
        snapshot.thi,
        advisory.comfort,
        advisory.clothing
    )
}

/// One-time startup notice listing the available commands.
pub fn startup_text() -> String {
    "\u{1f44b} <b>Room assistant activated!</b>\n\n\
     Available commands:\n\
     status - current mini-dashboard\n\
     recommend - ventilation and clothing advice\n\
     analyse - insulation and air-exchange analysis\n\
     notify-roommate - ask the roommate to open/close the window\n\
     check - run one window check now"
        .to_string()
}

/// Polite window request sent to the roommate chat.
pub fn roommate_request_text(snapshot: &Snapshot, advisory: &Advisory) -> String {
    format!(
        "Hi, quick request:\n\
         Room humidity is {:.1}% and THI={:.1} ({}).\n\
         Recommendation: {}\n\
         Please could you open/close the window? Thanks!",
        snapshot.indoor_humidity_smooth, snapshot.thi, advisory.comfort, advisory.ventilation
    )
}

/// Alert message for one state-machine decision.
pub fn alert_text(
    kind: AlertKind,
    snapshot: &Snapshot,
    advisory: &Advisory,
    divergence: Option<&DivergenceSignal>,
) -> String {
    match kind {
        AlertKind::WindowClosed => {
            let metrics = divergence
                .map(|d| {
                    format!(
                        "\u{0394}T/5m: {:.2}\u{00b0}C, \u{0394}H/5m: {:.2}%\n\
                         T gap: {:.2}\u{00b0}C, H gap: {:.2}%",
                        d.temp_change, d.humid_change, d.temp_gap_dir, d.humid_gap_dir
                    )
                })
                .unwrap_or_default();
            format!(
                "\u{2705} <b>Window closed</b>\n\n\
                 The indoor environment has started moving away from the outdoor state.\n\
                 Metrics:\n{metrics}"
            )
        }
        AlertKind::NewOpening | AlertKind::OpenPlateau => {
            let metrics = snapshot
                .diagnostics
                .as_ref()
                .map(|d| {
                    format!(
                        "\u{0394}T/5m: {}\u{00b0}C, \u{0394}H/5m: {}%\n\
                         Temp gap (abs) prev/curr: {:?}\u{00b0}C / {:?}\u{00b0}C",
                        d.temp_change, d.humid_change, d.prev_temp_gap_abs, d.curr_temp_gap_abs
                    )
                })
                .unwrap_or_default();
            format!(
                "\u{26a0} <b>Window open alert</b>\n\n\
                 Status: {kind}\n\
                 \u{1f3e0} Indoor: {:.2}\u{00b0}C, {:.1}% RH (smoothed)\n\
                 \u{1f324} Outdoor: {:.2}\u{00b0}C, {:.1}% RH\n\n\
                 Ventilation: {}\n\n\
                 Metrics:\n{metrics}",
                snapshot.indoor_temp_smooth,
                snapshot.indoor_humidity_smooth,
                snapshot.outdoor_temp,
                snapshot.outdoor_humidity,
                advisory.ventilation
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        advise, snapshot, Advisory, ClothingBias, ConvergenceThresholds, Sample, Series,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn fixture() -> (Snapshot, Advisory) {
        let series = Series::clean(
            (0..10)
                .map(|i| {
                    let t = i as f64;
                    Sample::complete(ts(i), 21.0 + t * 0.1, 52.0 + t * 0.2, 9.0 + t * 0.1, 61.0 + t * 0.2)
                })
                .collect(),
        );
        let snap = snapshot(&series, &ConvergenceThresholds::default()).unwrap();
        let advisory = advise(&snap, ClothingBias::Normal);
        (snap, advisory)
    }

    #[test]
    fn test_status_text_contents() {
        let (snap, advisory) = fixture();
        let text = status_text(&snap, &advisory);
        assert!(text.contains("Indoor"));
        assert!(text.contains("Outdoor"));
        assert!(text.contains("THI"));
    }

    #[test]
    fn test_recommend_text_contents() {
        let (_, advisory) = fixture();
        let text = recommend_text(&advisory);
        assert!(text.contains(&advisory.ventilation));
        assert!(text.contains("Window status"));
    }

    #[test]
    fn test_analyse_text_requires_correlations() {
        let (snap, advisory) = fixture();
        // Linearly coupled fixture: both correlations defined.
        let text = analyse_text(&snap, &advisory, 100).unwrap();
        assert!(text.contains("Room Performance Analysis"));
        assert!(text.contains("insulation"));

        let mut no_corr = snap.clone();
        no_corr.corr_temp = None;
        assert!(analyse_text(&no_corr, &advisory, 100).is_none());
    }

    #[test]
    fn test_alert_text_variants() {
        let (snap, advisory) = fixture();

        let opened = alert_text(AlertKind::NewOpening, &snap, &advisory, None);
        assert!(opened.contains("Window open alert"));
        assert!(opened.contains("new opening detected"));

        let plateau = alert_text(AlertKind::OpenPlateau, &snap, &advisory, None);
        assert!(plateau.contains("plateau"));

        let closed = alert_text(AlertKind::WindowClosed, &snap, &advisory, None);
        assert!(closed.contains("Window closed"));
    }

    #[test]
    fn test_startup_text_lists_commands() {
        let text = startup_text();
        assert!(text.contains("status"));
        assert!(text.contains("recommend"));
        assert!(text.contains("analyse"));
    }
}
