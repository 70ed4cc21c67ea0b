use crate::history::error::FetchError;
use crate::history::source::WeatherSource;
use crate::types::observation::DailyObservation;
use chrono::NaiveDate;
use log::debug;
use std::collections::{hash_map::Entry, HashMap};
use tokio::sync::Mutex;

/// Wraps a [`WeatherSource`] and remembers every successful observation.
///
/// Historical windows of neighbouring days and the weekly forecast regularly ask for
/// the same `(entity, date)`; with this wrapper each one is requested upstream once.
/// Failures are not remembered, so a later call retries them.
pub struct CachedSource<S> {
    inner: S,
    observation_cache: Mutex<HashMap<(String, NaiveDate), DailyObservation>>,
}

impl<S: WeatherSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            observation_cache: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn cached_len(&self) -> usize {
        self.observation_cache.lock().await.len()
    }

    pub async fn clear(&self) {
        self.observation_cache.lock().await.clear();
    }
}

impl<S: WeatherSource> WeatherSource for CachedSource<S> {
    async fn fetch_day(
        &self,
        entity: &str,
        date: NaiveDate,
    ) -> Result<DailyObservation, FetchError> {
        let key = (entity.to_string(), date);

        {
            let cache = self.observation_cache.lock().await;
            if let Some(cached) = cache.get(&key) {
                debug!("Cache hit for '{}' on {}", entity, date);
                return Ok(cached.clone());
            }
        } // lock released before going upstream

        let fetched = self.inner.fetch_day(entity, date).await?;

        let mut cache = self.observation_cache.lock().await;
        match cache.entry(key) {
            // Another task filled it while we were fetching; keep the first one.
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(fetched.clone());
                Ok(fetched)
            }
        }
    }
}
