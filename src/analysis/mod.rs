pub mod classifier;
pub mod error;
pub mod forecaster;
pub mod sampler;
pub mod similarity;

use crate::history::source::WeatherSource;
use chrono::{Days, NaiveDate};
use futures_util::{stream, StreamExt};
use log::warn;

/// Days subtracted per year of lookback. Leap days are deliberately ignored.
pub const DAYS_PER_YEAR: u64 = 365;
pub const DEFAULT_LOOKBACK_YEARS: u32 = 10;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// `date` moved back by `years * 365` days, `None` if that leaves the calendar.
pub fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(DAYS_PER_YEAR * u64::from(years)))
}

/// Fetches the temperature for every date, at most `limit` requests in flight.
///
/// The output is index-aligned with `dates`; a failed fetch becomes `None` and is logged.
/// Returns only once every request has settled.
pub(crate) async fn fetch_temperatures<S: WeatherSource>(
    source: &S,
    entity: &str,
    dates: Vec<NaiveDate>,
    limit: usize,
) -> Vec<Option<f64>> {
    stream::iter(dates)
        .map(|date| async move {
            match source.fetch_day(entity, date).await {
                Ok(observation) => Some(observation.temperature),
                Err(e) => {
                    warn!("Skipping sample for '{}' on {}: {}", entity, date, e);
                    None
                }
            }
        })
        .buffered(limit.max(1))
        .collect()
        .await
}
