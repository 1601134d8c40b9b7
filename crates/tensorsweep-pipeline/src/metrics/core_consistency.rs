//! Core consistency diagnostic (CORCONDIA).
//!
//! Fits an unconstrained Tucker core to the data with the CP factors held
//! fixed and measures how far it is from the superdiagonal core a valid
//! CP model implies.

use ndarray::{Array2, ArrayD, Axis, Dimension, IxDyn};
use tensorsweep_core::types::CpModel;

const JACOBI_SWEEPS: usize = 64;

/// Core consistency of `model` against `data`, in percent.
///
/// 100 means the least-squares core is exactly superdiagonal. Missing
/// entries are filled with the model's own values. `NaN` for a model with
/// no components or one that does not match the data's shape.
pub fn core_consistency(model: &CpModel, data: &ArrayD<f64>) -> f64 {
    let rank = model.rank();
    if rank == 0 || model.check_shape(data.shape()).is_err() {
        return f64::NAN;
    }

    let mut core = data.clone();
    for (idx, v) in core.indexed_iter_mut() {
        if v.is_nan() {
            *v = model.value_at(idx.slice());
        }
    }

    for (mode, factor) in model.factors.iter().enumerate() {
        let mut factor = factor.clone();
        if mode == 0 {
            for (mut col, &w) in factor.axis_iter_mut(Axis(1)).zip(&model.weights) {
                col *= w;
            }
        }
        core = mode_product(&core, &pseudo_inverse(&factor), mode);
    }

    let residual: f64 = core
        .indexed_iter()
        .map(|(idx, &g)| {
            let idx = idx.slice();
            let target = if idx.iter().all(|&i| i == idx[0]) { 1.0 } else { 0.0 };
            (g - target).powi(2)
        })
        .sum();
    100.0 * (1.0 - residual / rank as f64)
}

/// `x ×ₘ matrix`: every mode-`mode` fiber of `x` multiplied by `matrix`.
fn mode_product(x: &ArrayD<f64>, matrix: &Array2<f64>, mode: usize) -> ArrayD<f64> {
    let mut shape = x.shape().to_vec();
    shape[mode] = matrix.nrows();
    let mut out = ArrayD::zeros(IxDyn(&shape));
    for (fiber, mut target) in x.lanes(Axis(mode)).into_iter().zip(out.lanes_mut(Axis(mode))) {
        target.assign(&matrix.dot(&fiber));
    }
    out
}

/// Moore-Penrose pseudo-inverse `(AᵀA)⁺Aᵀ` of a tall factor matrix.
fn pseudo_inverse(a: &Array2<f64>) -> Array2<f64> {
    let (values, vectors) = symmetric_eigen(&a.t().dot(a));
    let largest = values.iter().copied().fold(0.0, f64::max);
    let cutoff = largest * 1e-12;
    let mut scaled = vectors.clone();
    for (mut col, &lambda) in scaled.axis_iter_mut(Axis(1)).zip(&values) {
        let inv = if lambda > cutoff { 1.0 / lambda } else { 0.0 };
        col *= inv;
    }
    scaled.dot(&vectors.t()).dot(&a.t())
}

/// Eigenvalues and eigenvectors (as columns) of a symmetric matrix, by
/// cyclic Jacobi rotations.
fn symmetric_eigen(s: &Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let n = s.nrows();
    let mut a = s.clone();
    let mut v = Array2::eye(n);
    let scale: f64 = s.iter().map(|x| x * x).sum();

    for _ in 0..JACOBI_SWEEPS {
        let off: f64 = a
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|(_, x)| x * x)
            .sum();
        if off <= scale * 1e-30 {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..n {
                    let (kp, kq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * kp - s * kq;
                    a[[k, q]] = s * kp + c * kq;
                }
                for k in 0..n {
                    let (pk, qk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * pk - s * qk;
                    a[[q, k]] = s * pk + c * qk;
                }
                for k in 0..n {
                    let (kp, kq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * kp - s * kq;
                    v[[k, q]] = s * kp + c * kq;
                }
            }
        }
    }
    ((0..n).map(|i| a[[i, i]]).collect(), v)
}
