use crate::analysis::{fetch_temperatures, years_before, DEFAULT_MAX_CONCURRENT_FETCHES};
use crate::history::source::WeatherSource;
use crate::types::anomaly::{AnomalyBand, HistoricalWindow};
use chrono::NaiveDate;
use log::debug;

/// Collects same-day temperatures from previous years to form a [`HistoricalWindow`].
pub struct HistoricalSampler<'a, S> {
    source: &'a S,
    max_concurrent_fetches: usize,
}

impl<'a, S: WeatherSource> HistoricalSampler<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    /// Caps the number of history requests in flight (minimum 1).
    pub fn with_max_concurrent_fetches(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    /// The dates queried for `target_date`: `target_date - 365 * k` days for `k` in `1..=lookback_years`.
    ///
    /// Dates that would fall before the start of the calendar are left out.
    pub fn sample_dates(target_date: NaiveDate, lookback_years: u32) -> Vec<NaiveDate> {
        (1..=lookback_years)
            .filter_map(|k| years_before(target_date, k))
            .collect()
    }

    /// Builds the historical window for `entity` on `target_date`.
    ///
    /// Failed fetches only shrink the window; this never returns an error.
    pub async fn sample(
        &self,
        entity: &str,
        target_date: NaiveDate,
        lookback_years: u32,
    ) -> HistoricalWindow {
        let dates = Self::sample_dates(target_date, lookback_years);
        let samples: Vec<f64> =
            fetch_temperatures(self.source, entity, dates, self.max_concurrent_fetches)
                .await
                .into_iter()
                .flatten()
                .collect();
        debug!(
            "Historical window for '{}' on {}: {}/{} samples",
            entity,
            target_date,
            samples.len(),
            lookback_years
        );

        HistoricalWindow {
            entity_id: entity.to_string(),
            target_date,
            lookback_years,
            samples,
        }
    }

    /// Anomaly band of a window; `None` for an empty window.
    pub fn band(window: &HistoricalWindow) -> Option<AnomalyBand> {
        window.band()
    }
}
