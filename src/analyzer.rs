//! Main entry point: anomaly reports and weekly forecasts over any [`WeatherSource`].

use crate::analysis::classifier::AnomalyClassifier;
use crate::analysis::forecaster::WeeklyForecaster;
use crate::analysis::sampler::HistoricalSampler;
use crate::analysis::{DEFAULT_LOOKBACK_YEARS, DEFAULT_MAX_CONCURRENT_FETCHES};
use crate::error::ClimateError;
use crate::history::cached_source::CachedSource;
use crate::history::source::WeatherSource;
use crate::types::anomaly_report::{AnomalyRecord, AnomalyReport};
use crate::types::date_range::DateRange;
use crate::types::forecast::ForecastPoint;
use bon::bon;
use chrono::NaiveDate;
use log::{debug, info};

/// Ties the sampler, classifier and forecaster to one cached weather source.
///
/// Every observation fetched through the analyzer is cached, so a forecast that follows an
/// anomaly report over the same entity reuses the history both of them need.
///
/// # Examples
///
/// ```rust
/// # use climate_analyzer::{ClimateAnalyzer, ClimateError, DateRange, InMemorySource};
/// # use chrono::NaiveDate;
/// # async fn run() -> Result<(), ClimateError> {
/// let mut source = InMemorySource::new();
/// source.insert_temperature("Oslo", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), -4.0);
/// let analyzer = ClimateAnalyzer::new(source);
///
/// let report = analyzer
///     .anomaly_report()
///     .entity("Oslo")
///     .range(DateRange::parse("2024-01-01", "2024-01-01")?)
///     .call()
///     .await?;
/// assert_eq!(report.records.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct ClimateAnalyzer<S> {
    source: CachedSource<S>,
    max_concurrent_fetches: usize,
}

#[bon]
impl<S: WeatherSource> ClimateAnalyzer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: CachedSource::new(source),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    /// Caps the number of history requests in flight for one window or forecast (minimum 1).
    pub fn with_max_concurrent_fetches(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    /// The cached source all requests go through.
    pub fn source(&self) -> &CachedSource<S> {
        &self.source
    }

    pub fn sampler(&self) -> HistoricalSampler<'_, CachedSource<S>> {
        HistoricalSampler::new(&self.source).with_max_concurrent_fetches(self.max_concurrent_fetches)
    }

    pub fn forecaster(&self) -> WeeklyForecaster<'_, CachedSource<S>> {
        WeeklyForecaster::new(&self.source).with_max_concurrent_fetches(self.max_concurrent_fetches)
    }

    /// Classifies every day of `range` for `entity` against its historical band.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `entity` - City or location identifier understood by the source.
    /// * `range` - Inclusive date range to report on.
    /// * `lookback_years` - Optional. Years of history per day. Defaults to [`DEFAULT_LOOKBACK_YEARS`].
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::Fetch`] when the observation of a day inside `range` cannot be
    /// fetched. Missing history never fails the report; such days are classified `Normal`.
    #[builder]
    pub async fn anomaly_report(
        &self,
        entity: &str,
        range: DateRange,
        lookback_years: Option<u32>,
    ) -> Result<AnomalyReport, ClimateError> {
        let lookback_years = lookback_years.unwrap_or(DEFAULT_LOOKBACK_YEARS);
        info!(
            "Building anomaly report for '{}' over {} ({} years of history)",
            entity, range, lookback_years
        );

        let sampler = self.sampler();
        let mut records = Vec::with_capacity(range.day_count());
        for date in range.days() {
            let window = sampler.sample(entity, date, lookback_years).await;
            let band = window.band();
            let observation = self.source.fetch_day(entity, date).await?;
            let classification =
                AnomalyClassifier::classify(observation.temperature, band.as_ref());
            debug!(
                "{} {}: {:.1} C -> {}",
                entity, date, observation.temperature, classification
            );

            records.push(AnomalyRecord {
                observation,
                band,
                sample_count: window.samples.len(),
                classification,
            });
        }

        let report = AnomalyReport {
            entity_id: entity.to_string(),
            range,
            records,
        };
        info!(
            "'{}': {} of {} days anomalous",
            entity,
            report.anomaly_count(),
            report.records.len()
        );
        Ok(report)
    }

    /// Predicts the 7 days following `range_end`.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `entity` - City or location identifier understood by the source.
    /// * `range_end` - Last day of the analysed range; the forecast starts the day after.
    /// * `lookback_years` - Optional. Years of history per day. Defaults to [`DEFAULT_LOOKBACK_YEARS`].
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::InvalidInput`] if the forecast week runs past the end of the calendar.
    #[builder]
    pub async fn weekly_forecast(
        &self,
        entity: &str,
        range_end: NaiveDate,
        lookback_years: Option<u32>,
    ) -> Result<Vec<ForecastPoint>, ClimateError> {
        let lookback_years = lookback_years.unwrap_or(DEFAULT_LOOKBACK_YEARS);
        info!("Forecasting the week after {} for '{}'", range_end, entity);
        self.forecaster()
            .forecast(entity, range_end, lookback_years)
            .await
    }
}
