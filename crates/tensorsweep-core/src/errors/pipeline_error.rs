//! Pipeline errors: aggregates every stage error via `From` conversions.

use std::fmt;

use super::error_code::{self, SweepErrorCode};
use super::{
    AssemblyError, ConfigError, FitError, NormalizationError, ParseError, SchemaError,
    StorageError, WriteError,
};

/// Pipeline stage, reported with every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Config,
    Load,
    Normalize,
    Assemble,
    Fit,
    Cache,
    Archive,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Load => "load",
            Self::Normalize => "normalize",
            Self::Assemble => "assemble",
            Self::Fit => "fit",
            Self::Cache => "cache",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Fit error: {0}")]
    Fit(#[from] FitError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Pipeline cancelled after {completed} of {total} fits")]
    Cancelled { completed: usize, total: usize },
}

impl PipelineError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Schema(_) | Self::Parse(_) => Stage::Load,
            Self::Normalization(_) => Stage::Normalize,
            Self::Assembly(_) => Stage::Assemble,
            Self::Fit(_) | Self::Cancelled { .. } => Stage::Fit,
            Self::Write(_) => Stage::Archive,
            Self::Config(_) => Stage::Config,
            Self::Storage(_) => Stage::Cache,
        }
    }

    /// True for errors that invalidate everything downstream.
    pub fn is_fatal_input(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::Parse(_))
    }
}

impl SweepErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Schema(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Normalization(e) => e.error_code(),
            Self::Assembly(e) => e.error_code(),
            Self::Fit(e) => e.error_code(),
            Self::Write(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Cancelled { .. } => error_code::CANCELLED,
        }
    }
}
