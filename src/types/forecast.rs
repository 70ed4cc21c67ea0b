use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of days covered by a weekly forecast.
pub const FORECAST_DAYS: u64 = 7;

/// One predicted day following a queried range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Mean of the historical samples for this day, `None` when every fetch failed.
    pub predicted_temperature: Option<f64>,
    /// How many historical samples went into the prediction.
    pub sample_count: usize,
}
