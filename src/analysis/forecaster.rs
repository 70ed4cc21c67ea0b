use crate::analysis::{fetch_temperatures, years_before, DEFAULT_MAX_CONCURRENT_FETCHES};
use crate::error::ClimateError;
use crate::history::source::WeatherSource;
use crate::types::anomaly::mean;
use crate::types::forecast::{ForecastPoint, FORECAST_DAYS};
use chrono::{Days, NaiveDate};
use log::debug;

/// Predicts the week after a range by averaging the same days in previous years.
pub struct WeeklyForecaster<'a, S> {
    source: &'a S,
    max_concurrent_fetches: usize,
}

impl<'a, S: WeatherSource> WeeklyForecaster<'a, S> {
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

    /// Forecasts the 7 days after `range_end_date`.
    ///
    /// Day `d` (0-based) is predicted from `range_end + 1 - 365 * y + d` for `y` in
    /// `1..=lookback_years`. A day whose samples all failed gets `predicted_temperature: None`.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::InvalidInput`] only when the forecast week itself does not fit
    /// in the calendar. Fetch failures are never surfaced.
    pub async fn forecast(
        &self,
        entity: &str,
        range_end_date: NaiveDate,
        lookback_years: u32,
    ) -> Result<Vec<ForecastPoint>, ClimateError> {
        let prediction_start = range_end_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| out_of_calendar(range_end_date))?;
        let forecast_dates = (0..FORECAST_DAYS)
            .map(|offset| prediction_start.checked_add_days(Days::new(offset)))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| out_of_calendar(range_end_date))?;

        // (day offset, query date) for every sample, flattened so they share one fetch pool
        let queries: Vec<(usize, NaiveDate)> = forecast_dates
            .iter()
            .enumerate()
            .flat_map(|(offset, day)| {
                (1..=lookback_years)
                    .filter_map(move |year| years_before(*day, year).map(|date| (offset, date)))
            })
            .collect();

        let temperatures = fetch_temperatures(
            self.source,
            entity,
            queries.iter().map(|(_, date)| *date).collect(),
            self.max_concurrent_fetches,
        )
        .await;

        let mut samples_per_day: Vec<Vec<f64>> = vec![Vec::new(); forecast_dates.len()];
        for ((offset, _), temperature) in queries.iter().zip(temperatures) {
            if let Some(t) = temperature {
                samples_per_day[*offset].push(t);
            }
        }

        let points: Vec<ForecastPoint> = forecast_dates
            .into_iter()
            .zip(samples_per_day)
            .map(|(date, samples)| ForecastPoint {
                date,
                predicted_temperature: mean(&samples),
                sample_count: samples.len(),
            })
            .collect();
        debug!(
            "Forecast for '{}' after {}: {} of {} days predicted",
            entity,
            range_end_date,
            points
                .iter()
                .filter(|p| p.predicted_temperature.is_some())
                .count(),
            points.len()
        );
        Ok(points)
    }
}

fn out_of_calendar(range_end_date: NaiveDate) -> ClimateError {
    ClimateError::InvalidInput(format!(
        "cannot forecast the week after {}: date out of range",
        range_end_date
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::delayed_source::DelayedSource;
    use crate::history::memory_source::InMemorySource;

    fn range_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
    }

    #[tokio::test]
    async fn test_forecast_dates_follow_range_end() {
        let source = InMemorySource::new();
        let points = WeeklyForecaster::new(&source)
            .forecast("Test City", range_end(), 10)
            .await
            .unwrap();

        assert_eq!(points.len(), 7);
        for (offset, point) in points.iter().enumerate() {
            assert_eq!(
                point.date,
                NaiveDate::from_ymd_opt(2023, 4, 2 + offset as u32).unwrap()
            );
        }
        assert!(points.windows(2).all(|w| w[1].date == w[0].date.succ_opt().unwrap()));
    }

    #[tokio::test]
    async fn test_forecast_without_history_is_all_none() {
        let source = InMemorySource::new();
        let points = WeeklyForecaster::new(&source)
            .forecast("Test City", range_end(), 10)
            .await
            .unwrap();

        assert!(points.iter().all(|p| p.predicted_temperature.is_none()));
        assert!(points.iter().all(|p| p.sample_count == 0));
        assert_eq!(source.request_count(), 70);
    }

    #[tokio::test]
    async fn test_forecast_constant_history() {
        let mut source = InMemorySource::new();
        let prediction_start = NaiveDate::from_ymd_opt(2023, 4, 2).unwrap();
        for offset in 0..7 {
            let day = prediction_start + Days::new(offset);
            for year in 1..=10 {
                source.insert_temperature("Test City", years_before(day, year).unwrap(), 20.0);
            }
        }

        let points = WeeklyForecaster::new(&source)
            .forecast("Test City", range_end(), 10)
            .await
            .unwrap();

        assert!(points.iter().all(|p| p.predicted_temperature == Some(20.0)));
        assert!(points.iter().all(|p| p.sample_count == 10));
    }

    #[tokio::test]
    async fn test_forecast_averages_per_day_and_skips_gaps() {
        let mut source = InMemorySource::new();
        let first_day = NaiveDate::from_ymd_opt(2023, 4, 2).unwrap();
        let third_day = NaiveDate::from_ymd_opt(2023, 4, 4).unwrap();
        source.insert_temperature("Test City", years_before(first_day, 1).unwrap(), 10.0);
        source.insert_temperature("Test City", years_before(first_day, 2).unwrap(), 14.0);
        source.insert_temperature("Test City", years_before(third_day, 5).unwrap(), -3.5);

        let points = WeeklyForecaster::new(&source)
            .with_max_concurrent_fetches(3)
            .forecast("Test City", range_end(), 10)
            .await
            .unwrap();

        assert_eq!(points[0].predicted_temperature, Some(12.0));
        assert_eq!(points[0].sample_count, 2);
        assert_eq!(points[1].predicted_temperature, None);
        assert_eq!(points[2].predicted_temperature, Some(-3.5));
        assert!(points[3..].iter().all(|p| p.predicted_temperature.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_forecast_waits_for_every_sample() {
        let mut inner = InMemorySource::new();
        let prediction_start = NaiveDate::from_ymd_opt(2023, 4, 2).unwrap();
        for offset in 0..7 {
            let day = prediction_start + Days::new(offset);
            for year in 1..=3 {
                let t = offset as f64 * 10.0 + f64::from(year);
                inner.insert_temperature("Test City", years_before(day, year).unwrap(), t);
            }
        }
        let source = DelayedSource::new(inner);

        let points = WeeklyForecaster::new(&source)
            .with_max_concurrent_fetches(4)
            .forecast("Test City", range_end(), 3)
            .await
            .unwrap();

        for (offset, point) in points.iter().enumerate() {
            assert_eq!(point.sample_count, 3);
            assert_eq!(point.predicted_temperature, Some(offset as f64 * 10.0 + 2.0));
        }
        assert_eq!(source.max_in_flight(), 4);
        assert_eq!(source.settled(), 21);
        assert_eq!(source.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_forecast_past_calendar_end_is_invalid_input() {
        let source = InMemorySource::new();
        let err = WeeklyForecaster::new(&source)
            .forecast("Test City", NaiveDate::MAX, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::InvalidInput(_)));
    }
}
