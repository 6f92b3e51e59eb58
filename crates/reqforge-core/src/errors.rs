//! Error types for the requirement-extraction engine.

#[cfg(feature = "python")]
use pyo3::exceptions::{PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Top-level error enum for the reqforge core library.
#[derive(Debug, thiserror::Error)]
pub enum RequirementsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("NLP parsing error: {0}")]
    NlpParsing(String),

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Extension error: {0}")]
    Extension(String),

    #[error("Framework not supported: {0}")]
    FrameworkNotSupported(String),

    #[error("Database not supported: {0}")]
    DatabaseNotSupported(String),

    #[error("Authentication method not supported: {0}")]
    AuthMethodNotSupported(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RequirementsError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RequirementsError::Validation(_))
    }
}

#[cfg(feature = "python")]
impl From<RequirementsError> for PyErr {
    fn from(err: RequirementsError) -> PyErr {
        match &err {
            RequirementsError::NlpParsing(_) => PyRuntimeError::new_err(err.to_string()),
            RequirementsError::Validation(_)
            | RequirementsError::InvalidPattern { .. }
            | RequirementsError::Extension(_)
            | RequirementsError::FrameworkNotSupported(_)
            | RequirementsError::DatabaseNotSupported(_)
            | RequirementsError::AuthMethodNotSupported(_)
            | RequirementsError::Json(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

pub type RequirementsResult<T> = Result<T, RequirementsError>;
