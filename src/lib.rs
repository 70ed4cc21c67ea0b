mod analysis;
mod analyzer;
mod error;
mod history;
mod report;
mod session;
mod types;
mod utils;

pub use analyzer::ClimateAnalyzer;
pub use error::ClimateError;
pub use session::ComparisonSession;

pub use analysis::classifier::AnomalyClassifier;
pub use analysis::forecaster::WeeklyForecaster;
pub use analysis::sampler::HistoricalSampler;
pub use analysis::similarity::*;
pub use analysis::{years_before, DAYS_PER_YEAR, DEFAULT_LOOKBACK_YEARS, DEFAULT_MAX_CONCURRENT_FETCHES};

pub use history::cached_source::CachedSource;
pub use history::memory_source::InMemorySource;
pub use history::source::WeatherSource;
pub use history::weather_api::*;

pub use report::writer::{ReportWriter, DEFAULT_OUTPUT_DIR};

pub use types::anomaly::*;
pub use types::anomaly_report::*;
pub use types::date_range::*;
pub use types::forecast::*;
pub use types::observation::*;

pub use utils::sanitize_filename;

pub use analysis::error::SimilarityError;
pub use history::error::FetchError;
pub use report::error::ReportError;
