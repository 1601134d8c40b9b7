//! Fit-quality and stability metrics over CP models.

pub mod assignment;
pub mod congruence;
pub mod core_consistency;
pub mod quality;

pub use assignment::max_weight_matching;
pub use congruence::{component_congruence, congruence_matrix, factor_match_score, matched_congruence};
pub use core_consistency::core_consistency;
pub use quality::{degeneracy_score, factor_sparsity, fit_metrics, nonzero_components, relative_sse};
