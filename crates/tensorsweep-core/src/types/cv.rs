//! Replicate cross-validation records.

use serde::{Deserialize, Serialize};

/// One (modeled replicate, comparison replicate) comparison for one
/// configuration in one relabeling round. Flat so it maps onto one CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvRecord {
    /// Relabeling round the replicate fits came from.
    pub bootstrap_id: usize,
    pub config_hash: String,
    pub rank: usize,
    /// Lambda vector rendered as `[l0,l1,..]`.
    pub lambdas: String,
    pub modeled_replicate: String,
    pub comparison_replicate: String,
    /// Non-zero components of the modeled fit.
    pub n_components: usize,
    /// Fraction of zero entries in the modeled fit's first factor matrix.
    pub mode0_factor_sparsity: f64,
    /// Modeled fit against the comparison replicate's data.
    pub relative_sse: f64,
    /// Factor match score between the two fits. `NaN` for self and
    /// mirrored comparisons.
    pub fms: f64,
}
