//! Error types for the allocation core and its data collaborators.

use thiserror::Error;

use crate::model::DistrictCode;

/// Errors raised by the allocation core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AllocError {
    /// Empty inputs or out-of-range parameters. Aborts the whole run.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No usage population to divide by, so a district has no pickup date.
    #[error("depletion estimate undefined for district {district}")]
    UndefinedEstimate { district: DistrictCode },
}

impl AllocError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AllocError::InvalidInput(message.into())
    }
}

/// Errors raised while fetching or preparing source records.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("geocoding failed: {0}")]
    Geocoding(String),
}
