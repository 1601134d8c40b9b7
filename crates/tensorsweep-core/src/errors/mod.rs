//! Error handling for tensorsweep.
//! One error enum per pipeline stage, `thiserror` only.

pub mod assembly_error;
pub mod config_error;
pub mod error_code;
pub mod fit_error;
pub mod normalization_error;
pub mod parse_error;
pub mod pipeline_error;
pub mod schema_error;
pub mod storage_error;
pub mod write_error;

pub use assembly_error::AssemblyError;
pub use config_error::ConfigError;
pub use error_code::SweepErrorCode;
pub use fit_error::FitError;
pub use normalization_error::NormalizationError;
pub use parse_error::ParseError;
pub use pipeline_error::{PipelineError, Stage};
pub use schema_error::SchemaError;
pub use storage_error::StorageError;
pub use write_error::WriteError;
