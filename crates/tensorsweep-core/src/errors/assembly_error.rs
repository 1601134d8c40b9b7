//! Tensor assembly errors.

use super::error_code::{self, SweepErrorCode};

/// Errors pivoting tidy records into a labeled tensor.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("Missing combination {coordinate} under strict fill policy")]
    MissingAxis { coordinate: String },

    #[error("Duplicate coordinate {coordinate} under strict reduction")]
    DuplicateCoordinate { coordinate: String },

    #[error("Unknown axis '{axis}'")]
    UnknownAxis { axis: String },

    #[error("Label '{label}' not present on axis '{axis}'")]
    UnknownLabel { axis: String, label: String },

    #[error("Shape mismatch: axes imply {expected:?}, data has {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("No records to assemble")]
    EmptyInput,

    #[error("No axes requested")]
    NoAxes,
}

impl SweepErrorCode for AssemblyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingAxis { .. } => error_code::MISSING_AXIS,
            _ => error_code::ASSEMBLY_ERROR,
        }
    }
}
