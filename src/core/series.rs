//! Sample cleaning: ordering and gap-filling of raw sensor readings.
//!
//! Readings arrive from the channel in whatever order the store returns
//! them, and any field may be missing on any row. Cleaning sorts by
//! timestamp and forward-fills each field independently; rows before a
//! field's first known value stay missing and are never back-filled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw reading of the indoor/outdoor sensor pair.
///
/// Every numeric field is nullable: the channel reports whatever the
/// hardware managed to deliver for that minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp when the reading was recorded
    pub timestamp: DateTime<Utc>,
    /// Indoor temperature in degrees Celsius
    pub indoor_temp: Option<f64>,
    /// Indoor relative humidity in percent
    pub indoor_humidity: Option<f64>,
    /// Outdoor temperature in degrees Celsius
    pub outdoor_temp: Option<f64>,
    /// Outdoor relative humidity in percent
    pub outdoor_humidity: Option<f64>,
}

impl Sample {
    /// Create a sample with all four fields present.
    pub fn complete(
        timestamp: DateTime<Utc>,
        indoor_temp: f64,
        indoor_humidity: f64,
        outdoor_temp: f64,
        outdoor_humidity: f64,
    ) -> Self {
        Self {
            timestamp,
            indoor_temp: Some(indoor_temp),
            indoor_humidity: Some(indoor_humidity),
            outdoor_temp: Some(outdoor_temp),
            outdoor_humidity: Some(outdoor_humidity),
        }
    }

    /// Whether all four numeric fields are present.
    pub fn is_complete(&self) -> bool {
        self.indoor_temp.is_some()
            && self.indoor_humidity.is_some()
            && self.outdoor_temp.is_some()
            && self.outdoor_humidity.is_some()
    }
}

/// An ordered, gap-filled sequence of samples.
///
/// Owned by one pipeline run; constructed only through [`Series::clean`].
#[derive(Debug, Clone, Default)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Clean a raw collection of samples into an ordered series.
    ///
    /// Sorts ascending by timestamp, then forward-fills each numeric
    /// field from the nearest earlier non-missing value. Empty input is
    /// a valid empty series, not an error.
    pub fn clean(mut raw: Vec<Sample>) -> Self {
        raw.sort_by_key(|s| s.timestamp);

        let mut last_indoor_temp = None;
        let mut last_indoor_humidity = None;
        let mut last_outdoor_temp = None;
        let mut last_outdoor_humidity = None;

        for sample in &mut raw {
            fill(&mut sample.indoor_temp, &mut last_indoor_temp);
            fill(&mut sample.indoor_humidity, &mut last_indoor_humidity);
            fill(&mut sample.outdoor_temp, &mut last_outdoor_temp);
            fill(&mut sample.outdoor_humidity, &mut last_outdoor_humidity);
        }

        Self { samples: raw }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The samples where all four fields are present, in order.
    pub fn complete_rows(&self) -> Vec<&Sample> {
        self.samples.iter().filter(|s| s.is_complete()).collect()
    }
}

/// Carry the last seen value forward into a missing slot.
fn fill(field: &mut Option<f64>, carried: &mut Option<f64>) {
    match *field {
        Some(v) => *carried = Some(v),
        None => *field = *carried,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn test_clean_sorts_by_timestamp() {
        let raw = vec![
            Sample::complete(ts(2), 21.0, 50.0, 10.0, 60.0),
            Sample::complete(ts(0), 20.0, 50.0, 10.0, 60.0),
            Sample::complete(ts(1), 20.5, 50.0, 10.0, 60.0),
        ];

        let series = Series::clean(raw);
        let temps: Vec<f64> = series
            .samples()
            .iter()
            .map(|s| s.indoor_temp.unwrap())
            .collect();
        assert_eq!(temps, vec![20.0, 20.5, 21.0]);
    }

    #[test]
    fn test_forward_fill_per_field() {
        let mut raw = vec![
            Sample::complete(ts(0), 20.0, 50.0, 10.0, 60.0),
            Sample::complete(ts(1), 21.0, 51.0, 11.0, 61.0),
        ];
        raw[1].indoor_temp = None;
        raw[1].outdoor_humidity = None;

        let series = Series::clean(raw);
        let last = &series.samples()[1];
        assert_eq!(last.indoor_temp, Some(20.0));
        assert_eq!(last.indoor_humidity, Some(51.0));
        assert_eq!(last.outdoor_humidity, Some(60.0));
    }

    #[test]
    fn test_leading_gaps_stay_missing() {
        let mut raw: Vec<Sample> = (0..5)
            .map(|i| Sample::complete(ts(i), 20.0, 50.0, 10.0, 60.0))
            .collect();
        for sample in raw.iter_mut().take(3) {
            sample.outdoor_humidity = None;
        }

        let series = Series::clean(raw);
        for sample in series.samples().iter().take(3) {
            assert_eq!(sample.outdoor_humidity, None);
        }
        assert_eq!(series.samples()[3].outdoor_humidity, Some(60.0));
        assert_eq!(series.complete_rows().len(), 2);
    }

    #[test]
    fn test_empty_input_is_valid() {
        let series = Series::clean(Vec::new());
        assert!(series.is_empty());
        assert!(series.complete_rows().is_empty());
    }
}
