//! [`WeatherSource`] backed by the weatherapi.com `history.json` endpoint.

use crate::history::error::FetchError;
use crate::history::source::WeatherSource;
use crate::types::date_range::DATE_FORMAT;
use crate::types::observation::{CurrentConditions, DailyObservation};
use bon::bon;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";
pub const BASE_URL_ENV: &str = "WEATHERAPI_BASE_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`WeatherApiClient`].
///
/// # Examples
///
/// ```
/// use climate_analyzer::WeatherApiConfig;
/// use std::time::Duration;
///
/// let config = WeatherApiConfig::builder()
///     .api_key("my-key")
///     .timeout(Duration::from_secs(5))
///     .build();
/// assert_eq!(config.base_url, "https://api.weatherapi.com/v1");
/// assert!(config.include_air_quality);
/// ```
#[derive(Debug, Clone)]
pub struct WeatherApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub include_air_quality: bool,
}

#[bon]
impl WeatherApiConfig {
    #[builder]
    pub fn new(
        #[builder(into)] api_key: String,
        #[builder(into)] base_url: Option<String>,
        timeout: Option<Duration>,
        include_air_quality: Option<bool>,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
            include_air_quality: include_air_quality.unwrap_or(true),
        }
    }

    /// Reads the API key from `WEATHERAPI_KEY` and an optional base URL from `WEATHERAPI_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingApiKey`] if the key variable is unset or empty.
    pub fn from_env() -> Result<Self, FetchError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(FetchError::MissingApiKey(API_KEY_ENV))?;
        Ok(Self::builder()
            .api_key(api_key)
            .maybe_base_url(std::env::var(BASE_URL_ENV).ok())
            .build())
    }
}

// --- Response payload (only the fields we use) ---

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    forecast: ForecastBlock,
    #[serde(default)]
    alerts: Option<AlertsBlock>,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    day: DaySummary,
    #[serde(default)]
    astro: Option<Astro>,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    avgtemp_c: f64,
    condition: Condition,
    #[serde(default)]
    air_quality: Option<AirQuality>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AirQuality {
    #[serde(rename = "us-epa-index")]
    us_epa_index: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Astro {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentBlock,
    #[serde(default)]
    alerts: Option<AlertsBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temp_c: f64,
    condition: Condition,
    #[serde(default)]
    air_quality: Option<AirQuality>,
}

#[derive(Debug, Deserialize)]
struct AlertsBlock {
    #[serde(default)]
    alert: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
struct Alert {
    headline: String,
}

/// Turns a `history.json` body into a [`DailyObservation`].
pub(crate) fn parse_history_response(
    entity: &str,
    date: NaiveDate,
    body: &str,
) -> Result<DailyObservation, FetchError> {
    let response: HistoryResponse =
        serde_json::from_str(body).map_err(|source| FetchError::JsonParse {
            entity: entity.to_string(),
            date,
            source,
        })?;

    let forecast_day = response
        .forecast
        .forecastday
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::NoForecastDay {
            entity: entity.to_string(),
            date,
        })?;

    let (sunrise, sunset) = match forecast_day.astro {
        Some(astro) => (astro.sunrise, astro.sunset),
        None => (None, None),
    };

    Ok(DailyObservation {
        entity_id: entity.to_string(),
        date,
        temperature: forecast_day.day.avgtemp_c,
        condition: forecast_day.day.condition.text,
        air_quality_index: forecast_day
            .day
            .air_quality
            .and_then(|aq| aq.us_epa_index),
        alerts: alert_headlines(response.alerts),
        sunrise,
        sunset,
    })
}

fn alert_headlines(alerts: Option<AlertsBlock>) -> Vec<String> {
    alerts
        .map(|block| block.alert.into_iter().map(|a| a.headline).collect())
        .unwrap_or_default()
}

/// Turns a `forecast.json` body into [`CurrentConditions`].
pub(crate) fn parse_current_response(
    entity: &str,
    body: &str,
) -> Result<CurrentConditions, FetchError> {
    let response: CurrentResponse =
        serde_json::from_str(body).map_err(|source| FetchError::CurrentParse {
            entity: entity.to_string(),
            source,
        })?;

    Ok(CurrentConditions {
        entity_id: entity.to_string(),
        temperature: response.current.temp_c,
        condition: response.current.condition.text,
        air_quality_index: response
            .current
            .air_quality
            .and_then(|aq| aq.us_epa_index),
        alerts: alert_headlines(response.alerts),
    })
}

/// Live weather source querying one day per request.
pub struct WeatherApiClient {
    config: WeatherApiConfig,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(config: WeatherApiConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self { config, http })
    }

    /// Client configured from the environment, see [`WeatherApiConfig::from_env`].
    pub fn from_env() -> Result<Self, FetchError> {
        Self::new(WeatherApiConfig::from_env()?)
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    fn history_url(&self) -> String {
        self.endpoint_url("history.json")
    }

    fn aqi_flag(&self) -> &'static str {
        if self.config.include_air_quality {
            "yes"
        } else {
            "no"
        }
    }

    /// Current conditions and active alerts for `entity` (`forecast.json`, one day).
    ///
    /// # Errors
    ///
    /// Same network and status failures as [`WeatherSource::fetch_day`], plus
    /// [`FetchError::CurrentParse`] for an unexpected body.
    pub async fn current_conditions(&self, entity: &str) -> Result<CurrentConditions, FetchError> {
        let url = self.endpoint_url("forecast.json");
        let body = self
            .get_text(
                url,
                &[
                    ("q", entity),
                    ("days", "1"),
                    ("aqi", self.aqi_flag()),
                    ("alerts", "yes"),
                ],
            )
            .await?;
        parse_current_response(entity, &body)
    }

    /// GETs `url` with the API key added and returns the body of a 2xx response.
    async fn get_text(&self, url: String, params: &[(&str, &str)]) -> Result<String, FetchError> {
        debug!("Requesting {} with {:?}", url, params);

        // without_url keeps the API key out of error messages
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e.without_url()))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {} with {:?}: {:?}", url, params, e.status());
                let e = e.without_url();
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url, e)
                });
            }
        };

        response
            .text()
            .await
            .map_err(|e| FetchError::ResponseRead(url, e.without_url()))
    }
}

impl WeatherSource for WeatherApiClient {
    async fn fetch_day(
        &self,
        entity: &str,
        date: NaiveDate,
    ) -> Result<DailyObservation, FetchError> {
        let dt = date.format(DATE_FORMAT).to_string();
        let body = self
            .get_text(
                self.history_url(),
                &[("q", entity), ("dt", dt.as_str()), ("aqi", self.aqi_flag())],
            )
            .await?;
        parse_history_response(entity, date, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
    }

    #[test]
    fn test_parse_full_response() {
        let body = r#"{
            "location": {"name": "Test City"},
            "forecast": {
                "forecastday": [{
                    "date": "2023-04-01",
                    "day": {
                        "avgtemp_c": 25.0,
                        "condition": {"text": "Sunny", "code": 1000},
                        "air_quality": {"us-epa-index": 2}
                    },
                    "astro": {"sunrise": "06:30 AM", "sunset": "07:45 PM"}
                }]
            },
            "alerts": {"alert": [{"headline": "Heat Advisory"}]}
        }"#;

        let obs = parse_history_response("Test City", date(), body).unwrap();
        assert_eq!(obs.entity_id, "Test City");
        assert_eq!(obs.date, date());
        assert_eq!(obs.temperature, 25.0);
        assert_eq!(obs.condition, "Sunny");
        assert_eq!(obs.air_quality_index, Some(2));
        assert_eq!(obs.alerts, vec!["Heat Advisory".to_string()]);
        assert_eq!(obs.sunrise.as_deref(), Some("06:30 AM"));
        assert_eq!(obs.sunrise_time(), NaiveTime::from_hms_opt(6, 30, 0));
        assert_eq!(obs.sunset_time(), NaiveTime::from_hms_opt(19, 45, 0));
    }

    #[test]
    fn test_parse_minimal_response() {
        let body = r#"{"forecast": {"forecastday": [{"day": {"avgtemp_c": 20.0, "condition": {"text": "Cloudy"}}}]}}"#;

        let obs = parse_history_response("Test City", date(), body).unwrap();
        assert_eq!(obs.temperature, 20.0);
        assert_eq!(obs.air_quality_index, None);
        assert!(obs.alerts.is_empty());
        assert_eq!(obs.sunrise, None);
        assert_eq!(obs.sunset, None);
    }

    #[test]
    fn test_parse_empty_forecast_day() {
        let body = r#"{"forecast": {"forecastday": []}}"#;
        let err = parse_history_response("Test City", date(), body).unwrap_err();
        assert!(matches!(err, FetchError::NoForecastDay { .. }));
    }

    #[test]
    fn test_parse_api_error_body() {
        let body = r#"{"error": {"code": 1006, "message": "No matching location found."}}"#;
        let err = parse_history_response("Nowhere", date(), body).unwrap_err();
        assert!(matches!(err, FetchError::JsonParse { .. }));
    }

    #[test]
    fn test_parse_current_response() {
        let body = r#"{
            "location": {"name": "Test City"},
            "current": {
                "temp_c": 18.3,
                "condition": {"text": "Light rain"},
                "air_quality": {"us-epa-index": 1}
            },
            "forecast": {"forecastday": []},
            "alerts": {"alert": [{"headline": "Flood Watch"}, {"headline": "Wind Advisory"}]}
        }"#;

        let current = parse_current_response("Test City", body).unwrap();
        assert_eq!(current.entity_id, "Test City");
        assert_eq!(current.temperature, 18.3);
        assert_eq!(current.condition, "Light rain");
        assert_eq!(current.air_quality_text(), "1");
        assert_eq!(current.alert_text(), "Flood Watch, Wind Advisory");

        let bare = parse_current_response(
            "Test City",
            r#"{"current": {"temp_c": 5.0, "condition": {"text": "Clear"}}}"#,
        )
        .unwrap();
        assert_eq!(bare.air_quality_text(), "N/A");
        assert_eq!(bare.alert_text(), "No Alerts");

        assert!(matches!(
            parse_current_response("Test City", r#"{"error": {"code": 1006}}"#),
            Err(FetchError::CurrentParse { .. })
        ));
    }

    #[test]
    fn test_history_url_trims_trailing_slash() {
        let config = WeatherApiConfig::builder()
            .api_key("key")
            .base_url("http://localhost:8080/v1/")
            .build();
        let client = WeatherApiClient::new(config).unwrap();
        assert_eq!(client.history_url(), "http://localhost:8080/v1/history.json");
    }
}
