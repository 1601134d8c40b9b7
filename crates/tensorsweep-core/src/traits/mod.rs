//! Narrow capability interfaces at the pipeline seams.

pub mod cancellation;
pub mod decomposer;
pub mod fit_cache;
pub mod normalizer;

pub use cancellation::{Cancellable, CancellationToken};
pub use decomposer::{Decomposer, Decomposition};
pub use fit_cache::{FitCache, MemoryFitCache};
pub use normalizer::{Covariates, Normalizer};
