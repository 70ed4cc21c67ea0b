//! The single fetch boundary every analysis component is built on.

use crate::history::error::FetchError;
use crate::types::observation::DailyObservation;
use chrono::NaiveDate;
use std::future::Future;

/// Something that can look up one day of weather for one entity.
///
/// Calls are treated as fallible and idempotent: asking twice for the same
/// `(entity, date)` must give the same answer, and a failure only ever concerns
/// that one day. Callers decide whether a failure is fatal.
///
/// Implemented by [`crate::WeatherApiClient`] for live data, [`crate::InMemorySource`]
/// for preloaded data and [`crate::CachedSource`] to memoize any other source.
pub trait WeatherSource: Send + Sync {
    fn fetch_day(
        &self,
        entity: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<DailyObservation, FetchError>> + Send;
}
