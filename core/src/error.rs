use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("ambiguous input: {0}")]
    AmbiguousInput(String),

    #[error("structural error: {0}")]
    Structural(String),

    #[error("suffix miss: {0}")]
    SuffixMiss(String),

    #[error("validation failure: {0}")]
    ValidationFailure(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error at {path}: {source}")]
    PathIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    pub fn io_at(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return CoreError::MissingInput(format!("{} not found", path.display()));
        }
        CoreError::PathIo {
            path: path.display().to_string(),
            source,
        }
    }

    /// Stable taxonomy tag for the error.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::MissingInput(_) => "missing_input",
            CoreError::AmbiguousInput(_) => "ambiguous_input",
            CoreError::Structural(_) => "structural",
            CoreError::SuffixMiss(_) => "suffix_miss",
            CoreError::ValidationFailure(_) => "validation_failure",
            CoreError::InvalidInput(_) | CoreError::Json(_) => "invalid_input",
            CoreError::PathIo { .. } | CoreError::Io(_) | CoreError::Csv(_) => "io_error",
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
