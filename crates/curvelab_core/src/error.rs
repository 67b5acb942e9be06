//! Error types for curve configuration and computation.

use thiserror::Error;

/// Errors raised by curve construction, parameter edits and `calculate`.
///
/// Every failing `calculate` leaves the sample and time buffers exactly as they
/// were before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("Unknown parameter '{name}' for curve '{curve}'")]
    UnknownParameter { curve: String, name: String },

    #[error("Parameter '{name}' is required by curve '{curve}' but has no value")]
    MissingParameter { curve: String, name: String },

    #[error("Parameter '{name}' = {value} is outside [{min}, {max}]")]
    ParameterOutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: String },

    #[error("Initial conditions of '{curve}' are unresolved: {reason}")]
    UnresolvedInitialConditions { curve: String, reason: String },

    #[error("Domain error: {what}")]
    Domain { what: String },

    #[error("Integration failed: {what}")]
    Integration { what: String },

    #[error("Curve {id} is already a member of the bunch")]
    DuplicateCurve { id: u64 },
}

pub type CurveResult<T> = Result<T, CurveError>;

impl CurveError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        CurveError::InvalidParameter { what: what.into() }
    }

    pub(crate) fn domain(what: impl Into<String>) -> Self {
        CurveError::Domain { what: what.into() }
    }

    pub(crate) fn integration(what: impl Into<String>) -> Self {
        CurveError::Integration { what: what.into() }
    }
}
