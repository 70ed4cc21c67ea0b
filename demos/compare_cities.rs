use climate_analyzer::{
    ClimateAnalyzer, ClimateError, ComparisonSession, DateRange, ReportError, ReportWriter,
    WeatherApiClient,
};

#[tokio::main]
async fn main() -> Result<(), ClimateError> {
    let cities = ["New York", "Boston", "Miami", "Chicago"];
    let range = DateRange::parse("2024-04-01", "2024-04-07")?;

    let analyzer = ClimateAnalyzer::new(WeatherApiClient::from_env()?);
    let writer = ReportWriter::default();
    let mut session = ComparisonSession::new(range);

    for city in cities {
        // reuse a report written by an earlier run when there is one
        match writer.read_series(city).await {
            Ok(series) => {
                println!("Loaded {} days for {} from disk", series.len(), city);
                session.add_series(city, series);
            }
            Err(ReportError::ReportNotFound(_)) => {
                let report = analyzer
                    .anomaly_report()
                    .entity(city)
                    .range(range)
                    .call()
                    .await?;
                writer.write_anomalies(&report).await?;
                println!("{}: {} anomalous days", city, report.anomaly_count());
                session.add_report(&report);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let pair = session.most_similar_pair()?;
    println!(
        "Most similar: {} and {} (distance {:.2})",
        pair.first, pair.second, pair.distance
    );

    let heatmap = session.heatmap().normalized();
    for (entity, row) in heatmap.entities.iter().zip(&heatmap.values) {
        let cells: Vec<String> = row
            .iter()
            .map(|v| v.map_or("  -  ".to_string(), |v| format!("{:.2} ", v)))
            .collect();
        println!("{:<10} {}", entity, cells.join(""));
    }

    Ok(())
}
