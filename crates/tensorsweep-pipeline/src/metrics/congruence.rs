//! Component congruence and the factor match score.

use ndarray::{Array2, ArrayView1, Axis};
use tensorsweep_core::types::CpModel;

use super::assignment::max_weight_matching;

fn cosine(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let na = a.dot(&a).sqrt();
    let nb = b.dot(&b).sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        a.dot(&b) / (na * nb)
    }
}

/// Product over modes of the cosine between component `i` of `a` and
/// component `j` of `b`. Weights are ignored.
pub fn component_congruence(a: &CpModel, i: usize, b: &CpModel, j: usize) -> f64 {
    a.factors
        .iter()
        .zip(&b.factors)
        .map(|(fa, fb)| cosine(fa.column(i), fb.column(j)))
        .product()
}

/// Congruence of every component of `a` (rows) with every component of `b`.
///
/// With `absolute`, per-mode cosines are taken in absolute value so that
/// sign flips shared between modes do not count against a match.
pub fn congruence_matrix(a: &CpModel, b: &CpModel, absolute: bool) -> Array2<f64> {
    let mut out = Array2::zeros((a.rank(), b.rank()));
    for ((i, j), c) in out.indexed_iter_mut() {
        *c = if absolute {
            a.factors
                .iter()
                .zip(&b.factors)
                .map(|(fa, fb)| cosine(fa.column(i), fb.column(j)).abs())
                .product()
        } else {
            component_congruence(a, i, b, j)
        };
    }
    out
}

/// Optimally matched congruences: `(component of a, congruence)` for each
/// of the `min(rank_a, rank_b)` matched pairs.
pub fn matched_congruence(a: &CpModel, b: &CpModel) -> Vec<(usize, f64)> {
    let congruence = congruence_matrix(a, b, true);
    max_weight_matching(&congruence)
        .into_iter()
        .map(|(i, j)| (i, congruence[[i, j]]))
        .collect()
}

/// Factor match score: mean congruence of optimally matched components.
///
/// Sign-invariant, weights ignored, and models of different rank are
/// compared over the smaller rank. `NaN` when either model has no
/// components or the models have different orders.
pub fn factor_match_score(a: &CpModel, b: &CpModel) -> f64 {
    if a.ndim() != b.ndim() || a.rank() == 0 || b.rank() == 0 {
        return f64::NAN;
    }
    let matched = matched_congruence(a, b);
    matched.iter().map(|(_, c)| c).sum::<f64>() / matched.len() as f64
}

/// Column norms of one factor matrix.
pub(crate) fn column_norms(factor: &Array2<f64>) -> Vec<f64> {
    factor
        .axis_iter(Axis(1))
        .map(|c| c.dot(&c).sqrt())
        .collect()
}
