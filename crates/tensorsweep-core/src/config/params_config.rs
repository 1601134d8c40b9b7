//! Model parameters held constant across the grid.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_N_INITIALIZATIONS, DEFAULT_N_ITER_MAX, DEFAULT_TOL};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParamsConfig {
    /// Modes constrained non-negative. Default: none.
    pub nonneg_modes: Option<Vec<usize>>,
    /// Default: 1e-5.
    pub tol: Option<f64>,
    /// Default: 1000.
    pub n_iter_max: Option<usize>,
    /// Default: 3.
    pub n_initializations: Option<usize>,
}

impl ParamsConfig {
    pub fn effective_nonneg_modes(&self) -> Vec<usize> {
        self.nonneg_modes.clone().unwrap_or_default()
    }

    pub fn effective_tol(&self) -> f64 {
        self.tol.unwrap_or(DEFAULT_TOL)
    }

    pub fn effective_n_iter_max(&self) -> usize {
        self.n_iter_max.unwrap_or(DEFAULT_N_ITER_MAX)
    }

    pub fn effective_n_initializations(&self) -> usize {
        self.n_initializations.unwrap_or(DEFAULT_N_INITIALIZATIONS)
    }
}
