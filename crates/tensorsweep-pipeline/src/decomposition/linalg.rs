//! Dense CP building blocks: MTTKRP, Gram products, imputation.

use ndarray::{Array2, ArrayD, Dimension, IxDyn, Zip};

/// Matricized tensor times Khatri-Rao product for `mode`:
/// `M[i, r] = Σ x[.., i, ..] · Π_{m≠mode} A_m[i_m, r]`.
pub(crate) fn mttkrp(data: &ArrayD<f64>, factors: &[Array2<f64>], mode: usize) -> Array2<f64> {
    let rank = factors[mode].ncols();
    let mut out = Array2::zeros((factors[mode].nrows(), rank));
    let mut row = vec![0.0; rank];
    for (idx, &x) in data.indexed_iter() {
        if x == 0.0 {
            continue;
        }
        let idx = idx.slice();
        row.iter_mut().for_each(|v| *v = x);
        for (m, factor) in factors.iter().enumerate() {
            if m == mode {
                continue;
            }
            for (r, v) in row.iter_mut().enumerate() {
                *v *= factor[[idx[m], r]];
            }
        }
        for (r, v) in row.iter().enumerate() {
            out[[idx[mode], r]] += v;
        }
    }
    out
}

/// Hadamard product of `AᵀA` over every mode except `mode`.
pub(crate) fn gram_hadamard(factors: &[Array2<f64>], mode: usize) -> Array2<f64> {
    let rank = factors[mode].ncols();
    let mut out = Array2::ones((rank, rank));
    for (m, factor) in factors.iter().enumerate() {
        if m != mode {
            out *= &factor.t().dot(factor);
        }
    }
    out
}

/// Model value at every position.
pub(crate) fn reconstruct(factors: &[Array2<f64>], shape: &[usize]) -> ArrayD<f64> {
    let rank = factors.first().map(|f| f.ncols()).unwrap_or(0);
    let mut out = ArrayD::zeros(IxDyn(shape));
    for (idx, v) in out.indexed_iter_mut() {
        let idx = idx.slice();
        *v = (0..rank)
            .map(|r| {
                factors
                    .iter()
                    .zip(idx)
                    .map(|(f, &i)| f[[i, r]])
                    .product::<f64>()
            })
            .sum();
    }
    out
}

/// Observed entries from `data`, missing (`NaN`) entries from `model`.
pub(crate) fn impute(data: &ArrayD<f64>, model: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(data)
        .and(model)
        .map_collect(|&x, &m| if x.is_nan() { m } else { x })
}

/// `½ Σ_observed (x − x̂)²`.
pub(crate) fn half_sse(data: &ArrayD<f64>, model: &ArrayD<f64>) -> f64 {
    let mut sse = 0.0;
    Zip::from(data).and(model).for_each(|&x, &m| {
        if !x.is_nan() {
            sse += (x - m) * (x - m);
        }
    });
    0.5 * sse
}
