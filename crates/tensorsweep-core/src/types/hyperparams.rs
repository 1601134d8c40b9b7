//! Hyperparameter configuration for one model fit.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::{xxh3_128, xxh3_64};

/// Immutable settings parameterizing one sparse CP fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Number of components.
    pub rank: usize,
    /// L1 sparsity coefficient per mode. Length equals the tensor order.
    pub lambdas: Vec<f64>,
    /// Modes whose factors are constrained non-negative.
    pub nonneg_modes: Vec<usize>,
    /// Convergence tolerance on relative loss change.
    pub tol: f64,
    /// Iteration cap per initialization.
    pub n_iter_max: usize,
    /// Random initializations; the lowest final loss wins.
    pub n_initializations: usize,
    /// Seed for initialization.
    pub seed: u64,
}

impl HyperParams {
    /// Short human label used in logs, events and error reports.
    pub fn label(&self) -> String {
        format!("rank={} lambdas={}", self.rank, self.lambdas_label())
    }

    /// Lambda vector as `[l0,l1,..]`.
    pub fn lambdas_label(&self) -> String {
        let lambdas: Vec<String> = self.lambdas.iter().map(|l| format!("{l}")).collect();
        format!("[{}]", lambdas.join(","))
    }

    /// Copy with a different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Stable hash (xxh3-128, hex) over every field, seed included.
    pub fn config_hash(&self) -> String {
        format!("{:032x}", xxh3_128(self.canonical_json().as_bytes()))
    }

    /// Stable 64-bit key over everything except the seed.
    ///
    /// Two grid points that differ only by seed share a key.
    pub fn grid_key(&self) -> u64 {
        xxh3_64(self.with_seed(0).canonical_json().as_bytes())
    }

    /// True when mode `m` is constrained non-negative.
    pub fn is_nonneg(&self, mode: usize) -> bool {
        self.nonneg_modes.contains(&mode)
    }

    fn canonical_json(&self) -> String {
        // Field order is fixed by the struct definition.
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}
