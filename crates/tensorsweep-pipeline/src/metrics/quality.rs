//! Scalar fit-quality metrics.

use ndarray::{ArrayD, Dimension};
use tensorsweep_core::traits::Decomposition;
use tensorsweep_core::types::{CpModel, FitMetrics};

use super::congruence::{column_norms, component_congruence, factor_match_score};
use super::core_consistency::core_consistency;

/// `‖X − X̂‖² / ‖X‖²` over the observed (non-`NaN`) entries of `data`.
///
/// `NaN` when nothing is observed or the observed data is all zero.
pub fn relative_sse(model: &CpModel, data: &ArrayD<f64>) -> f64 {
    let mut sse = 0.0;
    let mut norm = 0.0;
    for (idx, &x) in data.indexed_iter() {
        if x.is_nan() {
            continue;
        }
        let residual = x - model.value_at(idx.slice());
        sse += residual * residual;
        norm += x * x;
    }
    if norm == 0.0 {
        f64::NAN
    } else {
        sse / norm
    }
}

/// Minimum pairwise congruence between distinct components.
///
/// Values near −1 indicate two components cancelling each other out.
/// Models with fewer than two components score 0.
pub fn degeneracy_score(model: &CpModel) -> f64 {
    let rank = model.rank();
    let mut min = f64::INFINITY;
    for i in 0..rank {
        for j in (i + 1)..rank {
            min = min.min(component_congruence(model, i, model, j));
        }
    }
    if min.is_finite() {
        min
    } else {
        0.0
    }
}

/// Components with a non-zero weight and a non-zero column in every mode.
pub fn nonzero_components(model: &CpModel) -> usize {
    let norms: Vec<Vec<f64>> = model.factors.iter().map(column_norms).collect();
    (0..model.rank())
        .filter(|&r| model.weights[r] != 0.0 && norms.iter().all(|n| n[r] > 0.0))
        .count()
}

/// Fraction of exactly-zero entries in the factor matrix of `mode`.
pub fn factor_sparsity(model: &CpModel, mode: usize) -> f64 {
    match model.factors.get(mode) {
        Some(f) if !f.is_empty() => {
            f.iter().filter(|&&v| v == 0.0).count() as f64 / f.len() as f64
        }
        _ => 0.0,
    }
}

/// Metrics of a finished decomposition against the data it was fit to.
pub fn fit_metrics(decomposition: &Decomposition, data: &ArrayD<f64>) -> FitMetrics {
    let model = &decomposition.model;
    FitMetrics {
        relative_sse: relative_sse(model, data),
        loss: decomposition.final_loss(),
        iterations: decomposition.iterations(),
        converged: decomposition.converged,
        degeneracy: degeneracy_score(model),
        n_components: nonzero_components(model),
        core_consistency: core_consistency(model, data),
        best_init: decomposition.best_init,
        candidate_sse: decomposition
            .candidates
            .iter()
            .map(|c| relative_sse(c, data))
            .collect(),
        candidate_fms: decomposition
            .candidates
            .iter()
            .map(|c| factor_match_score(model, c))
            .collect(),
    }
}
