use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Format the weather API uses for sunrise and sunset, e.g. `06:30 AM`.
pub const SUN_TIME_FORMAT: &str = "%I:%M %p";

/// A single day of weather for one entity (city), as returned by a [`crate::WeatherSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub entity_id: String,              // q
    pub date: NaiveDate,                // dt
    pub temperature: f64,               // avgtemp_c (°C)
    pub condition: String,              // condition.text
    pub air_quality_index: Option<i32>, // us-epa-index
    pub alerts: Vec<String>,            // alert headlines
    /// Raw astro value, e.g. `06:30 AM` or `No sunset`.
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

impl DailyObservation {
    /// Creates an observation with only a temperature; every other field is empty.
    pub fn new(entity_id: impl Into<String>, date: NaiveDate, temperature: f64) -> Self {
        Self {
            entity_id: entity_id.into(),
            date,
            temperature,
            condition: String::new(),
            air_quality_index: None,
            alerts: Vec::new(),
            sunrise: None,
            sunset: None,
        }
    }

    pub fn sunrise_time(&self) -> Option<NaiveTime> {
        self.sunrise.as_deref().and_then(parse_sun_time)
    }

    pub fn sunset_time(&self) -> Option<NaiveTime> {
        self.sunset.as_deref().and_then(parse_sun_time)
    }

    /// Air quality as a single cell: the index, or `N/A`.
    pub fn air_quality_text(&self) -> String {
        air_quality_cell(self.air_quality_index)
    }

    /// Alerts as a single cell: headlines joined by `", "`, or `No Alerts`.
    pub fn alert_text(&self) -> String {
        alerts_cell(&self.alerts)
    }
}

/// Weather right now for one entity, with the alerts currently in effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub entity_id: String,
    pub temperature: f64,
    pub condition: String,
    pub air_quality_index: Option<i32>,
    pub alerts: Vec<String>,
}

impl CurrentConditions {
    pub fn air_quality_text(&self) -> String {
        air_quality_cell(self.air_quality_index)
    }

    pub fn alert_text(&self) -> String {
        alerts_cell(&self.alerts)
    }
}

fn air_quality_cell(index: Option<i32>) -> String {
    index.map_or_else(|| "N/A".to_string(), |index| index.to_string())
}

fn alerts_cell(alerts: &[String]) -> String {
    if alerts.is_empty() {
        "No Alerts".to_string()
    } else {
        alerts.join(", ")
    }
}

/// Parses a sunrise/sunset value such as `06:30 AM`. Values like `No sunset` yield `None`.
pub fn parse_sun_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), SUN_TIME_FORMAT).ok()
}
