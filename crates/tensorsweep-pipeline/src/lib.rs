//! # tensorsweep-pipeline
//!
//! The pipeline stages, leaf first:
//! loader → normalize → assembler → driver (decomposition + metrics).
//! Persistence lives in `tensorsweep-storage`.

pub mod assembler;
pub mod cross_validation;
pub mod decomposition;
pub mod driver;
pub mod grid;
pub mod loader;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod replicates;

pub use assembler::{AssemblyOptions, TensorAssembler};
pub use decomposition::SparseCp;
pub use driver::{SweepDriver, SweepOptions, SweepReport};
pub use grid::ParameterGrid;
pub use loader::{TableSchema, TidyTableLoader};
pub use pipeline::{AssembledInput, Pipeline};
pub use replicates::ReplicateSet;
