//! Deterministic advisories derived from a snapshot.
//!
//! Pure mapping of metrics onto category labels and recommendation
//! text: comfort band from THI, a prioritized ventilation chain,
//! clothing bands from outdoor conditions, and insulation/air-exchange
//! verdicts from the indoor/outdoor correlations.

use crate::core::features::Snapshot;
use serde::Serialize;

/// Comfort band from the thermal comfort index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComfortLevel {
    SweatyHot,
    Warm,
    Cold,
    Chilly,
    Comfortable,
}

impl ComfortLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ComfortLevel::SweatyHot => "sweaty hot",
            ComfortLevel::Warm => "warm, pleasant",
            ComfortLevel::Cold => "turn on heater",
            ComfortLevel::Chilly => "a bit chilly",
            ComfortLevel::Comfortable => "comfortable",
        }
    }
}

impl std::fmt::Display for ComfortLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Personal preference modifier for the clothing suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClothingBias {
    #[default]
    Normal,
    Warm,
}

/// Immutable bundle of advisory outputs for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Advisory {
    pub comfort: ComfortLevel,
    pub ventilation: String,
    pub clothing: String,
    pub insulation: String,
    pub air_exchange: String,
    pub window_status: String,
}

/// Compute the full advisory bundle from a snapshot.
pub fn advise(snapshot: &Snapshot, bias: ClothingBias) -> Advisory {
    Advisory {
        comfort: comfort_level(snapshot.thi),
        ventilation: ventilation_recommendation(snapshot),
        clothing: clothing_suggestion(snapshot.outdoor_temp, snapshot.outdoor_humidity, bias),
        insulation: insulation_verdict(snapshot.corr_temp),
        air_exchange: air_exchange_verdict(snapshot.corr_humidity),
        window_status: window_status_text(snapshot),
    }
}

/// Band the THI; checks run in this order, first match wins.
pub fn comfort_level(thi: f64) -> ComfortLevel {
    if thi > 27.0 {
        ComfortLevel::SweatyHot
    } else if thi > 20.0 {
        ComfortLevel::Warm
    } else if thi < 5.0 {
        ComfortLevel::Cold
    } else if thi < 15.0 {
        ComfortLevel::Chilly
    } else {
        ComfortLevel::Comfortable
    }
}

/// Ventilation recommendation, highest-priority rule first: spikes
/// outrank steady-state humidity rules, which outrank the cold-draft
/// warning.
pub fn ventilation_recommendation(snapshot: &Snapshot) -> String {
    if snapshot.humidity_spike {
        format!(
            "Rapid humidity spike, ventilate! (last \u{0394}H: {:.1}%)",
            snapshot.last_humid_change
        )
    } else if snapshot.temp_spike {
        format!(
            "Rapid temperature change, check window/heater (last \u{0394}T: {:.1}\u{00b0}C)",
            snapshot.last_temp_change
        )
    } else if snapshot.indoor_humidity_smooth > 70.0
        && snapshot.outdoor_humidity < 65.0
        && snapshot.delta_temp > 0.0
    {
        "Open window for 10-15 min, outdoor air is drier".to_string()
    } else if snapshot.indoor_humidity_smooth > 75.0 && snapshot.outdoor_humidity >= 65.0 {
        "High ambient humidity, try mechanical ventilation".to_string()
    } else if snapshot.delta_temp > 6.0 && snapshot.outdoor_temp < 5.0 {
        "Freezing outside, keep the window closed".to_string()
    } else {
        "Everything looks good, no action needed".to_string()
    }
}

/// Clothing suggestion from outdoor temperature bands, with a muggy
/// note in warm humid weather and an optional warmer-layers bias.
pub fn clothing_suggestion(outdoor_temp: f64, outdoor_humidity: f64, bias: ClothingBias) -> String {
    let base = if outdoor_temp < 0.0 {
        "Warm coat, layers, scarf"
    } else if outdoor_temp < 5.0 {
        "Coat + jumper"
    } else if outdoor_temp < 12.0 {
        "Jacket or warm sweater"
    } else if outdoor_temp < 18.0 {
        "Long sleeve + light jacket"
    } else if outdoor_temp < 24.0 {
        "T-shirt + light layer"
    } else {
        "Very light clothes"
    };

    let mut suggestion = base.to_string();
    if outdoor_humidity > 85.0 && outdoor_temp >= 12.0 {
        suggestion.push_str(" (it will feel muggy)");
    }
    if bias == ClothingBias::Warm {
        suggestion.push_str(", wear warmer layers");
    }
    suggestion
}

/// Insulation verdict from the indoor/outdoor temperature correlation.
pub fn insulation_verdict(corr_temp: Option<f64>) -> String {
    match corr_temp {
        None => "Insufficient data for an insulation verdict".to_string(),
        Some(c) if c > 0.6 => {
            "Poor insulation: indoor temperature closely tracks outdoor".to_string()
        }
        Some(c) if c > 0.3 => {
            "Fair insulation: moderate coupling with outdoor temperature".to_string()
        }
        Some(_) => "Good insulation: indoor temperature is well decoupled".to_string(),
    }
}

/// Air-exchange verdict from the indoor/outdoor humidity correlation.
pub fn air_exchange_verdict(corr_humidity: Option<f64>) -> String {
    match corr_humidity {
        None => "Insufficient data for an air-exchange verdict".to_string(),
        Some(c) if c > 0.6 => {
            "High air exchange: indoor humidity closely tracks outdoor".to_string()
        }
        Some(c) if c > 0.3 => "Normal ventilation: healthy air exchange".to_string(),
        Some(_) => "Low air exchange: indoor humidity is decoupled from outdoor".to_string(),
    }
}

/// One-line window verdict naming the stronger driving signal.
fn window_status_text(snapshot: &Snapshot) -> String {
    if !snapshot.likely_open {
        return "Likely closed".to_string();
    }

    match &snapshot.diagnostics {
        Some(d) => {
            let driver = if d.temp_change.abs() > d.humid_change.abs() {
                "temperature driven"
            } else {
                "humidity driven"
            };
            format!(
                "Likely OPEN (\u{0394}T/5m={}\u{00b0}, \u{0394}H/5m={}%), {}",
                d.temp_change, d.humid_change, driver
            )
        }
        None => "Likely OPEN".to_string(),
    }
}
