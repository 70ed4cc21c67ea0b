use climate_analyzer::{ClimateAnalyzer, ClimateError, DateRange, ReportWriter, WeatherApiClient};
use std::env;

#[tokio::main]
async fn main() -> Result<(), ClimateError> {
    // usage: anomaly_report [city] [start] [end]
    let mut args = env::args().skip(1);
    let city = args.next().unwrap_or_else(|| "New York".to_string());
    let start = args.next().unwrap_or_else(|| "2024-04-01".to_string());
    let end = args.next().unwrap_or_else(|| "2024-04-07".to_string());
    let range = DateRange::parse(start, end)?;

    let client = WeatherApiClient::from_env()?;
    let writer = ReportWriter::default();

    let current = client.current_conditions(&city).await?;
    println!(
        "Now in {}: {:.1} C, {} (AQI {}, {})",
        city,
        current.temperature,
        current.condition,
        current.air_quality_text(),
        current.alert_text()
    );
    writer.append_current(&current).await?;

    let analyzer = ClimateAnalyzer::new(client);

    let report = analyzer
        .anomaly_report()
        .entity(&city)
        .range(range)
        .call()
        .await?;

    for record in &report.records {
        let observation = &record.observation;
        println!(
            "{}  {:>5.1} C  {:<24} {}",
            observation.date,
            observation.temperature,
            observation.condition,
            if record.classification.is_anomalous() {
                "ANOMALY"
            } else {
                ""
            }
        );
    }
    println!("Anomaly report written to {:?}", writer.write_anomalies(&report).await?);

    let forecast = analyzer
        .weekly_forecast()
        .entity(&city)
        .range_end(range.end())
        .call()
        .await?;
    for point in &forecast {
        match point.predicted_temperature {
            Some(t) => println!("{}  predicted {:.1} C", point.date, t),
            None => println!("{}  no history available", point.date),
        }
    }
    println!(
        "Forecast written to {:?}",
        writer.write_forecast(&city, &forecast).await?
    );

    Ok(())
}
