use crate::history::error::FetchError;
use crate::history::source::WeatherSource;
use crate::types::observation::DailyObservation;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A [`WeatherSource`] answering from observations loaded up front.
///
/// Unknown `(entity, date)` pairs fail with [`FetchError::NotFound`], which makes it
/// easy to simulate partially failing history lookups.
///
/// # Examples
///
/// ```
/// use climate_analyzer::{InMemorySource, WeatherSource};
/// use chrono::NaiveDate;
///
/// # #[tokio::main]
/// # async fn main() {
/// let date = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
/// let mut source = InMemorySource::new();
/// source.insert_temperature("Utrecht", date, 11.5);
///
/// let obs = source.fetch_day("Utrecht", date).await.unwrap();
/// assert_eq!(obs.temperature, 11.5);
/// assert!(source.fetch_day("Utrecht", date.succ_opt().unwrap()).await.is_err());
/// assert_eq!(source.request_count(), 2);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemorySource {
    observations: HashMap<(String, NaiveDate), DailyObservation>,
    requests: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an observation, replacing any previous one for the same entity and date.
    pub fn insert(&mut self, observation: DailyObservation) {
        self.observations.insert(
            (observation.entity_id.clone(), observation.date),
            observation,
        );
    }

    pub fn insert_temperature(&mut self, entity: &str, date: NaiveDate, temperature: f64) {
        self.insert(DailyObservation::new(entity, date, temperature));
    }

    /// Number of `fetch_day` calls served so far, successful or not.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl WeatherSource for InMemorySource {
    async fn fetch_day(
        &self,
        entity: &str,
        date: NaiveDate,
    ) -> Result<DailyObservation, FetchError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.observations
            .get(&(entity.to_string(), date))
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                entity: entity.to_string(),
                date,
            })
    }
}
