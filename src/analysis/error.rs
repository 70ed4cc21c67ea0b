use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimilarityError {
    #[error("Not enough data to compare: {entities} entities with data and {columns} shared date columns (need at least 2 entities and 1 column)")]
    InsufficientData { entities: usize, columns: usize },
}
