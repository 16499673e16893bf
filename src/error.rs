use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by fragment evaluators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum IncluderError {
    #[error("No such order: {0} (expected `dir_order` or `file_order`)")]
    InvalidOrder(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to evaluate {path}: {source}")]
    Eval { path: PathBuf, source: BoxError },
    #[error("Invalid configuration: {0}")]
    Config(String),
}
impl IncluderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IncluderError::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn eval(path: impl Into<PathBuf>, source: BoxError) -> Self {
        IncluderError::Eval {
            path: path.into(),
            source,
        }
    }
}
