use crate::history::error::FetchError;
use crate::history::memory_source::InMemorySource;
use crate::history::source::WeatherSource;
use crate::types::observation::DailyObservation;
use chrono::{Datelike, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Test source that answers newer dates more slowly, so requests issued first finish last.
///
/// Tracks how many requests overlapped and how many settled.
pub(crate) struct DelayedSource {
    inner: InMemorySource,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    settled: AtomicUsize,
}

impl DelayedSource {
    pub(crate) fn new(inner: InMemorySource) -> Self {
        Self {
            inner,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            settled: AtomicUsize::new(0),
        }
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn settled(&self) -> usize {
        self.settled.load(Ordering::SeqCst)
    }

    fn delay_for(date: NaiveDate) -> Duration {
        Duration::from_millis(u64::try_from(date.year() - 1900).unwrap_or(0) * 10)
    }
}

impl WeatherSource for DelayedSource {
    async fn fetch_day(
        &self,
        entity: &str,
        date: NaiveDate,
    ) -> Result<DailyObservation, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Self::delay_for(date)).await;
        let result = self.inner.fetch_day(entity, date).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.settled.fetch_add(1, Ordering::SeqCst);
        result
    }
}
