//! Decomposition boundary: `decompose(tensor, config) -> factors + metrics`.

use crate::errors::FitError;
use crate::types::{CpModel, HyperParams, LabeledTensor};

/// Raw output of one decomposition call, before metrics are derived.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// The winning model.
    pub model: CpModel,
    /// Penalized loss per iteration of the winning initialization.
    pub loss_history: Vec<f64>,
    pub converged: bool,
    /// Index of the winning initialization among `candidates`.
    pub best_init: usize,
    /// One model per initialization, winner included.
    pub candidates: Vec<CpModel>,
}

impl Decomposition {
    pub fn final_loss(&self) -> f64 {
        self.loss_history.last().copied().unwrap_or(f64::NAN)
    }

    pub fn iterations(&self) -> usize {
        self.loss_history.len()
    }
}

/// A tensor decomposition routine. Must be deterministic for a fixed seed.
pub trait Decomposer: Send + Sync {
    fn name(&self) -> &str;

    fn decompose(
        &self,
        tensor: &LabeledTensor,
        params: &HyperParams,
    ) -> Result<Decomposition, FitError>;
}
