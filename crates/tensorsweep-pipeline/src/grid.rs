//! Hyperparameter grid: every rank against every lambda vector.

use tensorsweep_core::config::SweepConfig;
use tensorsweep_core::types::HyperParams;

/// Ordered set of configurations to fit. Insertion order is rank-major and
/// is the tie-breaker when ranking results.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    points: Vec<HyperParams>,
}

impl ParameterGrid {
    /// All-by-all product of `ranks × lambdas`, with `base` supplying the
    /// settings held constant across the grid.
    pub fn product(ranks: &[usize], lambdas: &[Vec<f64>], base: &HyperParams) -> Self {
        let points = ranks
            .iter()
            .flat_map(|&rank| {
                lambdas.iter().map(move |l| HyperParams {
                    rank,
                    lambdas: l.clone(),
                    ..base.clone()
                })
            })
            .collect();
        Self { points }
    }

    /// Grid described by the `[grid]`, `[params]` and `[sweep]` tables.
    pub fn from_config(config: &SweepConfig, ndim: usize) -> Self {
        let base = HyperParams {
            rank: 1,
            lambdas: vec![0.0; ndim],
            nonneg_modes: config.params.effective_nonneg_modes(),
            tol: config.params.effective_tol(),
            n_iter_max: config.params.effective_n_iter_max(),
            n_initializations: config.params.effective_n_initializations(),
            seed: config.sweep.effective_seed(),
        };
        Self::product(
            &config.grid.effective_ranks(),
            &config.grid.effective_lambdas(ndim),
            &base,
        )
    }

    /// Explicit list of configurations, kept in the given order.
    pub fn from_points(points: Vec<HyperParams>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HyperParams> {
        self.points.iter()
    }

    pub fn points(&self) -> &[HyperParams] {
        &self.points
    }
}

impl<'a> IntoIterator for &'a ParameterGrid {
    type Item = &'a HyperParams;
    type IntoIter = std::slice::Iter<'a, HyperParams>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
