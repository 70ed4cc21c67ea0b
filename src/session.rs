use crate::analysis::error::SimilarityError;
use crate::analysis::similarity::{SimilarPair, SimilarityInput, SimilarityRanker, TemperatureMatrix};
use crate::types::anomaly_report::AnomalyReport;
use crate::types::date_range::DateRange;
use chrono::NaiveDate;
use log::{debug, warn};

/// Collects the series of several entities over one date range for comparison.
///
/// Entities keep the order they were first added in; that order breaks distance ties.
#[derive(Debug, Clone)]
pub struct ComparisonSession {
    range: DateRange,
    input: SimilarityInput,
}

impl ComparisonSession {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            input: SimilarityInput::new(),
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Adds the observed series of a report.
    pub fn add_report(&mut self, report: &AnomalyReport) {
        if report.range != self.range {
            warn!(
                "Report for '{}' covers {}, session covers {}",
                report.entity_id, report.range, self.range
            );
        }
        self.add_series(report.entity_id.clone(), report.series());
    }

    /// Adds a series, replacing the one already stored for `entity`.
    ///
    /// Days outside the session range are dropped with a warning.
    pub fn add_series(&mut self, entity: impl Into<String>, series: Vec<(NaiveDate, f64)>) {
        let entity = entity.into();
        let total = series.len();
        let (start, end) = (self.range.start(), self.range.end());
        let series: Vec<(NaiveDate, f64)> = series
            .into_iter()
            .filter(|(date, _)| (start..=end).contains(date))
            .collect();
        if series.len() < total {
            warn!(
                "Dropped {} of {} days for '{}' outside {}",
                total - series.len(),
                total,
                entity,
                self.range
            );
        }
        debug!("Adding {} days for '{}' to comparison", series.len(), entity);
        self.input.insert(entity, series);
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.input.entities()
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn input(&self) -> &SimilarityInput {
        &self.input
    }

    /// # Errors
    ///
    /// [`SimilarityError::InsufficientData`] until two entities with data have been added.
    pub fn most_similar_pair(&self) -> Result<SimilarPair, SimilarityError> {
        SimilarityRanker::most_similar_pair(&self.input)
    }

    /// The entity × date matrix behind the comparison.
    pub fn heatmap(&self) -> TemperatureMatrix {
        TemperatureMatrix::from_input(&self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::anomaly::Classification;
    use crate::types::anomaly_report::AnomalyRecord;
    use crate::types::observation::DailyObservation;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, day).unwrap()
    }

    fn range() -> DateRange {
        DateRange::parse(d(1), d(3)).unwrap()
    }

    fn report(entity: &str, temperatures: [f64; 3]) -> AnomalyReport {
        AnomalyReport {
            entity_id: entity.to_string(),
            range: range(),
            records: range()
                .days()
                .zip(temperatures)
                .map(|(date, t)| AnomalyRecord {
                    observation: DailyObservation::new(entity, date, t),
                    band: None,
                    sample_count: 0,
                    classification: Classification::Normal,
                })
                .collect(),
        }
    }

    #[test]
    fn test_single_entity_is_insufficient() {
        let mut session = ComparisonSession::new(range());
        session.add_report(&report("Miami", [28.0, 29.0, 30.0]));

        assert_eq!(
            session.most_similar_pair(),
            Err(SimilarityError::InsufficientData {
                entities: 1,
                columns: 3
            })
        );
    }

    #[test]
    fn test_most_similar_pair_across_reports() {
        let mut session = ComparisonSession::new(range());
        session.add_report(&report("New York", [12.0, 13.0, 14.0]));
        session.add_report(&report("Miami", [28.0, 29.0, 30.0]));
        session.add_report(&report("Boston", [11.0, 12.5, 14.0]));

        let pair = session.most_similar_pair().unwrap();
        assert_eq!(pair.entities(), ("New York", "Boston"));
        assert!((pair.distance - 1.25_f64.sqrt()).abs() < 1e-9);
        assert_eq!(
            session.entities().collect::<Vec<_>>(),
            vec!["New York", "Miami", "Boston"]
        );
    }

    #[test]
    fn test_readding_entity_replaces_series_in_place() {
        let mut session = ComparisonSession::new(range());
        session.add_series("A", vec![(d(1), 10.0)]);
        session.add_series("B", vec![(d(1), 30.0)]);
        session.add_series("A", vec![(d(1), 20.0)]);

        assert_eq!(session.len(), 2);
        assert_eq!(session.entities().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(session.input().get("A"), Some(&[(d(1), 20.0)][..]));
    }

    #[test]
    fn test_days_outside_range_are_dropped() {
        let mut session = ComparisonSession::new(range());
        session.add_series(
            "Stale",
            vec![(d(1), 10.0), (d(3), 12.0), (d(4), 40.0), (d(30), 50.0)],
        );
        session.add_series("Old", vec![(d(20), 15.0)]);

        assert_eq!(session.input().get("Stale"), Some(&[(d(1), 10.0), (d(3), 12.0)][..]));
        assert!(session.input().get("Old").unwrap().is_empty());
        assert_eq!(session.heatmap().entities, vec!["Stale"]);
        assert!(matches!(
            session.most_similar_pair(),
            Err(SimilarityError::InsufficientData { entities: 1, .. })
        ));
    }

    #[test]
    fn test_heatmap_shape() {
        let mut session = ComparisonSession::new(range());
        session.add_series("A", vec![(d(1), 10.0), (d(3), 12.0)]);
        session.add_series("B", vec![(d(1), 20.0)]);

        let matrix = session.heatmap();
        assert_eq!(matrix.entities, vec!["A", "B"]);
        assert_eq!(matrix.dates, vec![d(1), d(3)]);
        assert_eq!(matrix.values[1], vec![Some(20.0), None]);
    }
}
