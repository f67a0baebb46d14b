use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A stage's input table does not exist; the stage cannot run.
    #[error("input not found: {0}")]
    InputMissing(PathBuf),

    #[error("unsupported table format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A table is readable but lacks a column or carries a bad value.
    #[error("schema error in {path}: {reason}")]
    Schema { path: PathBuf, reason: String },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn schema(path: &Path, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
