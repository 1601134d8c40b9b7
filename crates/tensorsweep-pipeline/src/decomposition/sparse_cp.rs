//! Sparse CP decomposition.
//!
//! Minimizes `½‖X − ⟦A₁ … A_N⟧‖² + Σ_m λ_m ‖A_m‖₁` over observed entries by
//! cyclic column updates (HALS). Each column update is the exact minimizer
//! of the penalized objective in that column: a least-squares step followed
//! by soft-thresholding, clipped at zero for non-negative modes. Missing
//! entries are imputed from the current model once per outer iteration.

use ndarray::{Array2, ArrayD, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tensorsweep_core::errors::FitError;
use tensorsweep_core::traits::{Decomposer, Decomposition};
use tensorsweep_core::types::{CpModel, HyperParams, LabeledTensor};

use super::linalg::{gram_hadamard, half_sse, impute, mttkrp, reconstruct};

/// Diagonal Gram entries below this are treated as a dead component.
const MIN_CURVATURE: f64 = 1e-12;

/// The sparse CP model. Stateless; all settings come from `HyperParams`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseCp;

/// Outcome of one random initialization.
struct Run {
    factors: Vec<Array2<f64>>,
    losses: Vec<f64>,
    converged: bool,
}

impl SparseCp {
    pub fn new() -> Self {
        Self
    }

    fn validate(tensor: &LabeledTensor, params: &HyperParams) -> Result<(), FitError> {
        let invalid = |message: String| FitError::InvalidParams {
            config: params.label(),
            message,
        };
        if params.rank == 0 {
            return Err(invalid("rank must be at least 1".into()));
        }
        if params.lambdas.len() != tensor.ndim() {
            return Err(invalid(format!(
                "{} lambdas for a {}-way tensor",
                params.lambdas.len(),
                tensor.ndim()
            )));
        }
        if params.lambdas.iter().any(|l| !l.is_finite() || *l < 0.0) {
            return Err(invalid("lambdas must be finite and non-negative".into()));
        }
        if let Some(&m) = params.nonneg_modes.iter().find(|&&m| m >= tensor.ndim()) {
            return Err(invalid(format!("non-negative mode {m} out of range")));
        }
        if params.n_initializations == 0 || params.n_iter_max == 0 {
            return Err(invalid(
                "n_initializations and n_iter_max must be at least 1".into(),
            ));
        }
        if tensor.data().is_empty() || tensor.observed_count() == 0 {
            return Err(FitError::EmptyTensor {
                config: params.label(),
            });
        }
        Ok(())
    }

    /// Uniform random factors scaled so the initial model matches the
    /// data's observed magnitude.
    fn initial_factors(data: &ArrayD<f64>, rank: usize, rng: &mut StdRng) -> Vec<Array2<f64>> {
        let mut factors: Vec<Array2<f64>> = data
            .shape()
            .iter()
            .map(|&n| Array2::from_shape_fn((n, rank), |_| rng.gen_range(0.0..1.0)))
            .collect();

        let data_norm: f64 = data.iter().filter(|x| !x.is_nan()).map(|x| x * x).sum();
        let model_norm: f64 = reconstruct(&factors, data.shape())
            .iter()
            .zip(data.iter())
            .filter(|(_, x)| !x.is_nan())
            .map(|(m, _)| m * m)
            .sum();
        if data_norm > 0.0 && model_norm > 0.0 {
            let scale = (data_norm / model_norm).sqrt().powf(1.0 / factors.len() as f64);
            factors.iter_mut().for_each(|f| f.mapv_inplace(|v| v * scale));
        }
        factors
    }

    fn penalty(factors: &[Array2<f64>], lambdas: &[f64]) -> f64 {
        factors
            .iter()
            .zip(lambdas)
            .map(|(f, &l)| l * f.iter().map(|v| v.abs()).sum::<f64>())
            .sum()
    }

    /// Update every column of `mode` in place.
    fn update_mode(
        factors: &mut [Array2<f64>],
        filled: &ArrayD<f64>,
        mode: usize,
        lambda: f64,
        nonneg: bool,
        normalize: bool,
    ) {
        let m = mttkrp(filled, factors, mode);
        let v = gram_hadamard(factors, mode);
        let rank = v.nrows();
        let factor = &mut factors[mode];

        for r in 0..rank {
            let curvature = v[[r, r]];
            if curvature < MIN_CURVATURE {
                factor.column_mut(r).fill(0.0);
                continue;
            }
            let mut num = m.column(r).to_owned();
            for s in 0..rank {
                if s != r {
                    num.scaled_add(-v[[s, r]], &factor.column(s));
                }
            }
            let updated = num.mapv(|g| {
                let shrunk = if nonneg {
                    (g - lambda).max(0.0)
                } else {
                    g.signum() * (g.abs() - lambda).max(0.0)
                };
                shrunk / curvature
            });
            factor.column_mut(r).assign(&updated);
        }

        if normalize {
            for mut col in factor.axis_iter_mut(Axis(1)) {
                let norm = col.dot(&col).sqrt();
                if norm > 0.0 {
                    col.mapv_inplace(|x| x / norm);
                }
            }
        }
    }

    fn run(data: &ArrayD<f64>, params: &HyperParams, rng: &mut StdRng) -> Result<Run, FitError> {
        let mut factors = Self::initial_factors(data, params.rank, rng);
        let has_missing = data.iter().any(|x| x.is_nan());
        // With any penalty, unpenalized modes carry unit-norm columns so the
        // scale cannot escape the L1 term.
        let penalized = params.lambdas.iter().any(|&l| l > 0.0);

        let mut losses = Vec::with_capacity(params.n_iter_max);
        let mut converged = false;
        let mut model = reconstruct(&factors, data.shape());

        for _ in 0..params.n_iter_max {
            let filled = if has_missing {
                impute(data, &model)
            } else {
                data.clone()
            };
            for mode in 0..factors.len() {
                let lambda = params.lambdas[mode];
                Self::update_mode(
                    &mut factors,
                    &filled,
                    mode,
                    lambda,
                    params.is_nonneg(mode),
                    penalized && lambda == 0.0,
                );
            }

            model = reconstruct(&factors, data.shape());
            let loss = half_sse(data, &model) + Self::penalty(&factors, &params.lambdas);
            if !loss.is_finite() {
                return Err(FitError::Diverged {
                    config: params.label(),
                    message: format!("loss became {loss} after {} iterations", losses.len() + 1),
                });
            }

            let previous = losses.last().copied();
            losses.push(loss);
            if let Some(prev) = previous {
                let change = (prev - loss).abs() / prev.abs().max(f64::MIN_POSITIVE);
                if change < params.tol {
                    converged = true;
                    break;
                }
            }
        }

        Ok(Run {
            factors,
            losses,
            converged,
        })
    }
}

impl Decomposer for SparseCp {
    fn name(&self) -> &str {
        "sparse_cp"
    }

    fn decompose(
        &self,
        tensor: &LabeledTensor,
        params: &HyperParams,
    ) -> Result<Decomposition, FitError> {
        Self::validate(tensor, params)?;
        let data = tensor.data();
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut runs = Vec::with_capacity(params.n_initializations);
        for _ in 0..params.n_initializations {
            runs.push(Self::run(data, params, &mut rng)?);
        }

        // Lowest final loss wins; ties go to the earliest initialization.
        let best_init = runs
            .iter()
            .enumerate()
            .fold(0, |best, (i, run)| {
                let loss = |r: &Run| r.losses.last().copied().unwrap_or(f64::INFINITY);
                if loss(run) < loss(&runs[best]) {
                    i
                } else {
                    best
                }
            });

        let candidates: Vec<CpModel> = runs
            .iter()
            .map(|run| CpModel::new(vec![1.0; params.rank], run.factors.clone()).normalized())
            .collect();
        let winner = runs.swap_remove(best_init);

        tracing::trace!(
            config = %params.label(),
            best_init,
            iterations = winner.losses.len(),
            converged = winner.converged,
            "decomposition finished"
        );

        Ok(Decomposition {
            model: candidates[best_init].clone(),
            loss_history: winner.losses,
            converged: winner.converged,
            best_init,
            candidates,
        })
    }
}
