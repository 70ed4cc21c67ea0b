//! Value types produced by historical sampling and anomaly classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Half-width of the anomaly band in °C.
pub const ANOMALY_TOLERANCE_C: f64 = 3.0;

/// Same-calendar-day temperatures drawn from previous years for one entity and target date.
///
/// `samples` holds the temperatures observed `365 * k` days before `target_date`, in
/// increasing `k` order. Failed fetches are left out, so an index does not map to a fixed
/// `k`. A window with fewer samples than `lookback_years` (or none at all) is a normal outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalWindow {
    pub entity_id: String,
    pub target_date: NaiveDate,
    pub lookback_years: u32,
    pub samples: Vec<f64>,
}

impl HistoricalWindow {
    /// The anomaly band for this window, `None` when no samples were collected.
    pub fn band(&self) -> Option<AnomalyBand> {
        AnomalyBand::from_samples(&self.samples)
    }
}

/// The `mean ± 3.0 °C` interval a temperature must stay within to count as normal.
///
/// # Examples
///
/// ```
/// use climate_analyzer::AnomalyBand;
///
/// let band = AnomalyBand::from_samples(&[20.0, 22.0, 24.0]).unwrap();
/// assert_eq!(band.mean, 22.0);
/// assert_eq!(band.low, 19.0);
/// assert_eq!(band.high, 25.0);
///
/// assert!(AnomalyBand::from_samples(&[]).is_none());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyBand {
    pub mean: f64,
    pub low: f64,
    pub high: f64,
}

impl AnomalyBand {
    /// Band around a known mean.
    pub fn around(mean: f64) -> Self {
        Self {
            mean,
            low: mean - ANOMALY_TOLERANCE_C,
            high: mean + ANOMALY_TOLERANCE_C,
        }
    }

    /// Band around the arithmetic mean of `samples`, or `None` if there are none.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        mean(samples).map(Self::around)
    }

    /// Whether `temperature` lies within `[low, high]`, bounds included.
    pub fn contains(&self, temperature: f64) -> bool {
        !(temperature < self.low || temperature > self.high)
    }
}

/// Outcome of comparing one observed temperature with its historical band.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Normal,
    Anomalous,
}

impl Classification {
    pub fn is_anomalous(self) -> bool {
        self == Classification::Anomalous
    }

    /// The `Anomaly` cell written to reports.
    pub fn as_report_flag(self) -> &'static str {
        match self {
            Classification::Normal => "No",
            Classification::Anomalous => "Yes",
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Normal => write!(f, "normal"),
            Classification::Anomalous => write!(f, "anomalous"),
        }
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
