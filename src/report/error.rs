use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Output path exists but is not a directory: '{0}'")]
    OutputPathNotDirectory(PathBuf),

    #[error("Failed to build report table")]
    TableBuild(#[source] PolarsError),

    #[error("I/O error writing CSV file '{0}'")]
    CsvWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing CSV file '{0}'")]
    CsvWritePolars(PathBuf, #[source] PolarsError),

    #[error("No report found at '{0}'")]
    ReportNotFound(PathBuf),

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Required column '{column}' missing or mistyped in '{path}'")]
    ColumnMissing {
        path: PathBuf,
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("Malformed date '{value}' in '{path}'")]
    MalformedDate { path: PathBuf, value: String },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
