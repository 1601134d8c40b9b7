//! # tensorsweep-core
//!
//! Foundation crate for the tensorsweep pipeline.
//! Defines the shared types, traits, errors, config, events, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod traits;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::SweepConfig;
pub use errors::{PipelineError, SweepErrorCode};
pub use types::{
    Axis, CpModel, FitMetrics, FitResult, FitStatus, HyperParams, LabeledTensor, TidyRecord,
    TidyTable,
};
