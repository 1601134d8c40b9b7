//! Model fit errors. Isolated to the configuration that produced them.

use super::error_code::{self, SweepErrorCode};

/// A single hyperparameter configuration failed to fit.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FitError {
    #[error("Invalid hyperparameters for {config}: {message}")]
    InvalidParams { config: String, message: String },

    #[error("Tensor has no observed entries for {config}")]
    EmptyTensor { config: String },

    #[error("Fit diverged for {config}: {message}")]
    Diverged { config: String, message: String },

    #[error("Fit for {config} panicked: {message}")]
    Panicked { config: String, message: String },

    #[error("Decomposer returned an unusable model for {config}: {message}")]
    InvalidOutput { config: String, message: String },
}

impl FitError {
    /// The configuration label this failure belongs to.
    pub fn config(&self) -> &str {
        match self {
            Self::InvalidParams { config, .. }
            | Self::EmptyTensor { config }
            | Self::Diverged { config, .. }
            | Self::Panicked { config, .. }
            | Self::InvalidOutput { config, .. } => config,
        }
    }
}

impl SweepErrorCode for FitError {
    fn error_code(&self) -> &'static str {
        error_code::FIT_ERROR
    }
}
