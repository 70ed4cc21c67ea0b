//! Ranks entities by how closely their temperature series match.
//!
//! Series are pivoted into an entity × date matrix. Date columns without a single
//! value are dropped, remaining gaps count as `0.0`, and entities are compared by
//! plain Euclidean distance.

use crate::analysis::error::SimilarityError;
use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Temperature series per entity, kept in insertion order.
///
/// Insertion order decides ties in [`SimilarityRanker::most_similar_pair`]. A `NaN`
/// temperature counts as missing. If a series lists a date twice, the last value wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityInput {
    series: Vec<(String, Vec<(NaiveDate, f64)>)>,
}

impl SimilarityInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series, or replaces the series of an entity already present (keeping its position).
    pub fn insert(&mut self, entity: impl Into<String>, series: Vec<(NaiveDate, f64)>) {
        let entity = entity.into();
        match self.series.iter_mut().find(|(name, _)| *name == entity) {
            Some((_, existing)) => *existing = series,
            None => self.series.push((entity, series)),
        }
    }

    pub fn get(&self, entity: &str) -> Option<&[(NaiveDate, f64)]> {
        self.series
            .iter()
            .find(|(name, _)| name == entity)
            .map(|(_, series)| series.as_slice())
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl<E: Into<String>> FromIterator<(E, Vec<(NaiveDate, f64)>)> for SimilarityInput {
    fn from_iter<T: IntoIterator<Item = (E, Vec<(NaiveDate, f64)>)>>(iter: T) -> Self {
        let mut input = SimilarityInput::new();
        for (entity, series) in iter {
            input.insert(entity, series);
        }
        input
    }
}

/// Entity rows × date columns, the shape a heatmap is drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureMatrix {
    pub entities: Vec<String>,
    /// Sorted ascending; only dates where at least one entity has a value.
    pub dates: Vec<NaiveDate>,
    /// `values[row][column]`, `None` where the entity has no value for that date.
    pub values: Vec<Vec<Option<f64>>>,
}

impl TemperatureMatrix {
    /// Pivots the input.
    ///
    /// Every entity with at least one reading gets a row, even when all of its readings are
    /// `NaN`; such a row is all gaps and compares as zeros. Entities with an empty series get no row.
    pub fn from_input(input: &SimilarityInput) -> Self {
        let rows: Vec<(&str, BTreeMap<NaiveDate, f64>)> = input
            .series
            .iter()
            .filter(|(_, series)| !series.is_empty())
            .map(|(entity, series)| {
                let mut by_date = BTreeMap::new();
                for (date, temperature) in series {
                    if temperature.is_nan() {
                        by_date.remove(date);
                    } else {
                        by_date.insert(*date, *temperature);
                    }
                }
                (entity.as_str(), by_date)
            })
            .collect();

        let dates: Vec<NaiveDate> = rows
            .iter()
            .flat_map(|(_, by_date)| by_date.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let values = rows
            .iter()
            .map(|(_, by_date)| dates.iter().map(|d| by_date.get(d).copied()).collect())
            .collect();

        Self {
            entities: rows.iter().map(|(entity, _)| entity.to_string()).collect(),
            dates,
            values,
        }
    }

    /// Min-max scales every value into `[0, 1]` over the whole matrix.
    ///
    /// If all values are equal they all become `0.0`. Gaps stay `None`.
    pub fn normalized(&self) -> Self {
        let present = || self.values.iter().flatten().flatten().copied();
        let min = present().fold(f64::INFINITY, f64::min);
        let max = present().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        let values = self
            .values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| {
                        value.map(|v| if span > 0.0 { (v - min) / span } else { 0.0 })
                    })
                    .collect()
            })
            .collect();

        Self {
            entities: self.entities.clone(),
            dates: self.dates.clone(),
            values,
        }
    }

    /// A row with gaps filled as `0.0`.
    fn filled_row(&self, row: usize) -> Vec<f64> {
        self.values[row].iter().map(|v| v.unwrap_or(0.0)).collect()
    }
}

/// Two entities and the distance between their series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPair {
    pub first: String,
    pub second: String,
    pub distance: f64,
}

impl SimilarPair {
    pub fn entities(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

pub struct SimilarityRanker;

impl SimilarityRanker {
    /// Distance for every unordered pair, in input order: (0,1), (0,2), ..., (1,2), ...
    ///
    /// # Errors
    ///
    /// [`SimilarityError::InsufficientData`] when fewer than two entities have readings or no
    /// date column survives.
    pub fn pairwise_distances(
        inputs: &SimilarityInput,
    ) -> Result<Vec<SimilarPair>, SimilarityError> {
        let matrix = TemperatureMatrix::from_input(inputs);
        if matrix.entities.len() < 2 || matrix.dates.is_empty() {
            return Err(SimilarityError::InsufficientData {
                entities: matrix.entities.len(),
                columns: matrix.dates.len(),
            });
        }

        let rows: Vec<Vec<f64>> = (0..matrix.entities.len())
            .map(|i| matrix.filled_row(i))
            .collect();

        let mut pairs = Vec::new();
        for i in 0..rows.len() {
            for j in (i + 1)..rows.len() {
                pairs.push(SimilarPair {
                    first: matrix.entities[i].clone(),
                    second: matrix.entities[j].clone(),
                    distance: euclidean_distance(&rows[i], &rows[j]),
                });
            }
        }
        Ok(pairs)
    }

    /// The pair with the smallest distance; on a tie the first pair in input order wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use climate_analyzer::{SimilarityInput, SimilarityRanker};
    /// use chrono::NaiveDate;
    ///
    /// let d1 = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
    /// let d2 = NaiveDate::from_ymd_opt(2023, 4, 2).unwrap();
    /// let input: SimilarityInput = [
    ///     ("A", vec![(d1, 20.0), (d2, 21.0)]),
    ///     ("B", vec![(d1, 20.1), (d2, 21.1)]),
    ///     ("C", vec![(d1, 35.0), (d2, 36.0)]),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let pair = SimilarityRanker::most_similar_pair(&input).unwrap();
    /// assert_eq!(pair.entities(), ("A", "B"));
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`SimilarityRanker::pairwise_distances`].
    pub fn most_similar_pair(inputs: &SimilarityInput) -> Result<SimilarPair, SimilarityError> {
        let pairs = Self::pairwise_distances(inputs)?;
        // min_by_key keeps the first of equal minima
        pairs
            .into_iter()
            .min_by_key(|pair| OrderedFloat(pair.distance))
            .ok_or(SimilarityError::InsufficientData {
                entities: inputs.len(),
                columns: 0,
            })
    }
}

pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
