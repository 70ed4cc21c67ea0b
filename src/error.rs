use crate::analysis::error::SimilarityError;
use crate::history::error::FetchError;
use crate::report::error::ReportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
