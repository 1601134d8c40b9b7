//! Normalization errors.

use super::error_code::{self, SweepErrorCode};

/// The normalization routine rejected its input distribution.
#[derive(Debug, thiserror::Error)]
pub enum NormalizationError {
    #[error("{normalizer}: input is empty")]
    EmptyInput { normalizer: String },

    #[error("{normalizer}: every value is zero")]
    AllZero { normalizer: String },

    #[error("{normalizer}: group '{group}' sums to zero")]
    ZeroGroup { normalizer: String, group: String },

    #[error("{normalizer}: value {value} at row {row} is out of domain ({message})")]
    OutOfDomain {
        normalizer: String,
        row: usize,
        value: f64,
        message: String,
    },

    #[error("{normalizer}: missing covariate '{covariate}'")]
    MissingCovariate {
        normalizer: String,
        covariate: String,
    },

    #[error("{normalizer}: returned {actual} values for {expected} inputs")]
    LengthMismatch {
        normalizer: String,
        expected: usize,
        actual: usize,
    },
}

impl SweepErrorCode for NormalizationError {
    fn error_code(&self) -> &'static str {
        error_code::NORMALIZATION_ERROR
    }
}
