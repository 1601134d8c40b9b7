//! Hyperparameter grid: evaluated all-by-all.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GridConfig {
    /// Ranks to evaluate. Default: [1].
    pub ranks: Vec<usize>,
    /// Per-mode L1 coefficients to evaluate. Default: one all-zero vector.
    pub lambdas: Vec<Vec<f64>>,
}

impl GridConfig {
    pub fn effective_ranks(&self) -> Vec<usize> {
        if self.ranks.is_empty() {
            vec![1]
        } else {
            self.ranks.clone()
        }
    }

    /// Lambda vectors, defaulting to a single unpenalized vector of length `ndim`.
    pub fn effective_lambdas(&self, ndim: usize) -> Vec<Vec<f64>> {
        if self.lambdas.is_empty() {
            vec![vec![0.0; ndim]]
        } else {
            self.lambdas.clone()
        }
    }
}
