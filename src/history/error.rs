use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body for {0}")]
    ResponseRead(String, #[source] reqwest::Error),

    #[error("Failed to parse weather response for '{entity}' on {date}")]
    JsonParse {
        entity: String,
        date: NaiveDate,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse current conditions for '{entity}'")]
    CurrentParse {
        entity: String,
        #[source]
        source: serde_json::Error,
    },

    // The API answered but had no day block for the requested date
    #[error("No forecast day in response for '{entity}' on {date}")]
    NoForecastDay { entity: String, date: NaiveDate },

    #[error("No weather data found for '{entity}' on {date}")]
    NotFound { entity: String, date: NaiveDate },

    #[error("Environment variable '{0}' with the weather API key is not set")]
    MissingApiKey(&'static str),
}
