use crate::types::anomaly::{AnomalyBand, Classification};
use crate::types::date_range::DateRange;
use crate::types::observation::DailyObservation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of an [`AnomalyReport`]: what was observed and how it compares to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub observation: DailyObservation,
    /// `None` when no historical sample could be fetched.
    pub band: Option<AnomalyBand>,
    pub sample_count: usize,
    pub classification: Classification,
}

/// Day-by-day anomaly flags for one entity over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub entity_id: String,
    pub range: DateRange,
    pub records: Vec<AnomalyRecord>,
}

impl AnomalyReport {
    /// Observed `(date, temperature)` pairs, ready for a [`crate::SimilarityInput`].
    pub fn series(&self) -> Vec<(NaiveDate, f64)> {
        self.records
            .iter()
            .map(|r| (r.observation.date, r.observation.temperature))
            .collect()
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &AnomalyRecord> {
        self.records
            .iter()
            .filter(|r| r.classification.is_anomalous())
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies().count()
    }
}
