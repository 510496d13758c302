#[cfg(feature = "python")]
use pyo3::exceptions::{PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

use crate::dimension::Dimension;
use crate::category::QueryParameters;

#[derive(Error, Debug)]
pub enum DiError {
    #[error("Unknown party `{code}`, {hint}!")]
    UnknownParty { code: String, hint: String },

    #[error("Unknown {dimension} `{value}`")]
    UnknownDimensionValue { dimension: Dimension, value: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No {dimension} node with id {id}")]
    NodeNotFound { dimension: Dimension, id: i64 },

    #[error("No data returned for query {0}")]
    NoData(Box<QueryParameters>),

    #[error("Variable {0} is not part of the variable index")]
    UnknownVariable(i64),

    #[error("No {dimension} entry with id {id}")]
    MissingDimensionEntry { dimension: Dimension, id: i64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Request to `{path}` failed: {message}")]
    Transport {
        path: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(feature = "python")]
impl From<DiError> for PyErr {
    fn from(err: DiError) -> PyErr {
        match err {
            DiError::UnknownParty { .. }
            | DiError::UnknownDimensionValue { .. }
            | DiError::InvalidArgument(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}
