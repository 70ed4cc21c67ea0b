//! CSV persistence for anomaly reports and weekly forecasts.

use crate::report::error::ReportError;
use crate::types::anomaly_report::AnomalyReport;
use crate::types::date_range::DATE_FORMAT;
use crate::types::forecast::ForecastPoint;
use crate::types::observation::CurrentConditions;
use crate::utils::{ensure_output_dir_exists, sanitize_filename};
use chrono::NaiveDate;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

pub const DEFAULT_OUTPUT_DIR: &str = "csv";

const COL_CITY: &str = "City";
const COL_DATE: &str = "Date";
const COL_TEMPERATURE: &str = "Temperature (C)";
const COL_CONDITION: &str = "Condition";
const COL_AQI: &str = "Air Quality Index";
const COL_ALERTS: &str = "Alerts";
const COL_SUNRISE: &str = "Sunrise";
const COL_SUNSET: &str = "Sunset";
const COL_ANOMALY: &str = "Anomaly";
const COL_PREDICTED: &str = "Predicted Temperature (C)";

/// Writes reports as CSV files into one output directory, one file per entity and kind.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `{output_dir}/{sanitized entity}_weather_with_anomalies.csv`
    pub fn anomaly_path(&self, entity: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}_weather_with_anomalies.csv",
            sanitize_filename(entity)
        ))
    }

    /// `{output_dir}/{sanitized entity}_predicted_weather.csv`
    pub fn forecast_path(&self, entity: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_predicted_weather.csv", sanitize_filename(entity)))
    }

    /// `{output_dir}/{sanitized entity}_weather_data.csv`
    pub fn current_path(&self, entity: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_weather_data.csv", sanitize_filename(entity)))
    }

    /// Appends one row of current conditions; the header is written only for a new file.
    ///
    /// Columns: `City, Temperature (C), Condition, Air Quality Index, Alerts`.
    pub async fn append_current(
        &self,
        current: &CurrentConditions,
    ) -> Result<PathBuf, ReportError> {
        let mut df = current_frame(current).map_err(ReportError::TableBuild)?;
        ensure_output_dir_exists(&self.output_dir).await?;
        let path = self.current_path(&current.entity_id);
        let path_buf = path.clone();
        task::spawn_blocking(move || {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path_buf)
                .map_err(|e| ReportError::CsvWriteIo(path_buf.clone(), e))?;
            let is_new = file
                .metadata()
                .map_err(|e| ReportError::CsvWriteIo(path_buf.clone(), e))?
                .len()
                == 0;
            CsvWriter::new(&mut file)
                .include_header(is_new)
                .finish(&mut df)
                .map_err(|e| ReportError::CsvWritePolars(path_buf, e))?;
            Ok::<(), ReportError>(())
        })
        .await??;
        info!("Appended current conditions for '{}' to {:?}", current.entity_id, path);
        Ok(path)
    }

    /// Writes the report, replacing any earlier file for the same entity.
    ///
    /// Columns: `City, Date, Temperature (C), Condition, Air Quality Index, Alerts, Sunrise, Sunset, Anomaly`.
    pub async fn write_anomalies(&self, report: &AnomalyReport) -> Result<PathBuf, ReportError> {
        let df = anomaly_frame(report).map_err(ReportError::TableBuild)?;
        let path = self.anomaly_path(&report.entity_id);
        self.write_csv(df, &path).await?;
        info!(
            "Wrote {} days ({} anomalous) for '{}' to {:?}",
            report.records.len(),
            report.anomaly_count(),
            report.entity_id,
            path
        );
        Ok(path)
    }

    /// Writes the forecast; days without a prediction get an empty cell.
    pub async fn write_forecast(
        &self,
        entity: &str,
        points: &[ForecastPoint],
    ) -> Result<PathBuf, ReportError> {
        let df = forecast_frame(points).map_err(ReportError::TableBuild)?;
        let path = self.forecast_path(entity);
        self.write_csv(df, &path).await?;
        info!("Wrote forecast for '{}' to {:?}", entity, path);
        Ok(path)
    }

    /// Reads the `(date, temperature)` series back from an anomaly report written earlier.
    ///
    /// Empty temperature cells come back as `NaN`, which comparisons treat as missing.
    pub async fn read_series(&self, entity: &str) -> Result<Vec<(NaiveDate, f64)>, ReportError> {
        let path = self.anomaly_path(entity);
        if tokio::fs::metadata(&path).await.is_err() {
            return Err(ReportError::ReportNotFound(path));
        }
        task::spawn_blocking(move || read_series_blocking(&path)).await?
    }

    async fn write_csv(&self, mut df: DataFrame, path: &Path) -> Result<(), ReportError> {
        ensure_output_dir_exists(&self.output_dir).await?;
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let mut file = std::fs::File::create(&path_buf)
                .map_err(|e| ReportError::CsvWriteIo(path_buf.clone(), e))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .map_err(|e| ReportError::CsvWritePolars(path_buf, e))?;
            Ok::<(), ReportError>(())
        })
        .await??;
        Ok(())
    }
}

fn anomaly_frame(report: &AnomalyReport) -> PolarsResult<DataFrame> {
    let observations = report.records.iter().map(|r| &r.observation);

    df!(
        COL_CITY => observations.clone().map(|o| o.entity_id.clone()).collect::<Vec<_>>(),
        COL_DATE => observations.clone().map(|o| o.date.format(DATE_FORMAT).to_string()).collect::<Vec<_>>(),
        COL_TEMPERATURE => observations.clone().map(|o| o.temperature).collect::<Vec<_>>(),
        COL_CONDITION => observations.clone().map(|o| o.condition.clone()).collect::<Vec<_>>(),
        COL_AQI => observations.clone().map(|o| o.air_quality_text()).collect::<Vec<_>>(),
        COL_ALERTS => observations.clone().map(|o| o.alert_text()).collect::<Vec<_>>(),
        COL_SUNRISE => observations.clone().map(|o| o.sunrise.clone()).collect::<Vec<_>>(),
        COL_SUNSET => observations.map(|o| o.sunset.clone()).collect::<Vec<_>>(),
        COL_ANOMALY => report.records.iter().map(|r| r.classification.as_report_flag()).collect::<Vec<_>>()
    )
}

fn current_frame(current: &CurrentConditions) -> PolarsResult<DataFrame> {
    df!(
        COL_CITY => [current.entity_id.as_str()],
        COL_TEMPERATURE => [current.temperature],
        COL_CONDITION => [current.condition.as_str()],
        COL_AQI => [current.air_quality_text()],
        COL_ALERTS => [current.alert_text()]
    )
}

fn forecast_frame(points: &[ForecastPoint]) -> PolarsResult<DataFrame> {
    df!(
        COL_DATE => points.iter().map(|p| p.date.format(DATE_FORMAT).to_string()).collect::<Vec<_>>(),
        COL_PREDICTED => points.iter().map(|p| p.predicted_temperature).collect::<Vec<_>>()
    )
}

fn read_series_blocking(path: &Path) -> Result<Vec<(NaiveDate, f64)>, ReportError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| ReportError::CsvRead(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| ReportError::CsvRead(path.to_path_buf(), e))?;

    // Integer-looking temperatures are inferred as i64, so cast before reading
    let df = df
        .lazy()
        .select([
            col(COL_DATE).cast(DataType::String),
            col(COL_TEMPERATURE).cast(DataType::Float64),
        ])
        .collect()
        .map_err(|e| ReportError::ColumnMissing {
            path: path.to_path_buf(),
            column: format!("{} / {}", COL_DATE, COL_TEMPERATURE),
            source: e,
        })?;

    let column_error = |column: &str, source: PolarsError| ReportError::ColumnMissing {
        path: path.to_path_buf(),
        column: column.to_string(),
        source,
    };
    let dates = df
        .column(COL_DATE)
        .and_then(|c| c.str())
        .map_err(|e| column_error(COL_DATE, e))?;
    let temperatures = df
        .column(COL_TEMPERATURE)
        .and_then(|c| c.f64())
        .map_err(|e| column_error(COL_TEMPERATURE, e))?;

    dates
        .into_iter()
        .zip(temperatures)
        .map(|(date, temperature)| {
            let raw = date.unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                ReportError::MalformedDate {
                    path: path.to_path_buf(),
                    value: raw.to_string(),
                }
            })?;
            Ok((date, temperature.unwrap_or(f64::NAN)))
        })
        .collect()
}
