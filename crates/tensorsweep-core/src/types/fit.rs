//! Fit results: factor matrices, metrics and bootstrap confidence.

use std::fmt;

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayD, Axis as NdAxis, Dimension, IxDyn};
use serde::{Deserialize, Serialize};

use super::float::{nan_as_null, vec_nan_as_null};
use super::hyperparams::HyperParams;
use crate::errors::{FitError, SweepErrorCode};

/// A CP (canonical polyadic) model: `X ≈ Σ_r w_r · a¹_r ∘ a²_r ∘ … ∘ aᴺ_r`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpModel {
    pub weights: Vec<f64>,
    /// One `I_m × rank` factor matrix per mode.
    pub factors: Vec<Array2<f64>>,
}

impl CpModel {
    pub fn new(weights: Vec<f64>, factors: Vec<Array2<f64>>) -> Self {
        Self { weights, factors }
    }

    pub fn rank(&self) -> usize {
        self.weights.len()
    }

    pub fn ndim(&self) -> usize {
        self.factors.len()
    }

    /// Shape of the tensor this model reconstructs.
    pub fn shape(&self) -> Vec<usize> {
        self.factors.iter().map(|f| f.nrows()).collect()
    }

    /// Model value at one multi-index.
    pub fn value_at(&self, index: &[usize]) -> f64 {
        (0..self.rank())
            .map(|r| {
                self.factors
                    .iter()
                    .zip(index)
                    .fold(self.weights[r], |acc, (f, &i)| acc * f[[i, r]])
            })
            .sum()
    }

    /// Dense reconstruction of the full tensor.
    pub fn reconstruct(&self) -> ArrayD<f64> {
        let mut out = ArrayD::zeros(IxDyn(&self.shape()));
        for (idx, v) in out.indexed_iter_mut() {
            *v = self.value_at(idx.slice());
        }
        out
    }

    /// Copy with unit-norm factor columns; the norms move into the weights.
    /// Components with a zero column get weight 0.
    pub fn normalized(&self) -> Self {
        let mut weights = self.weights.clone();
        let mut factors = self.factors.clone();
        for factor in factors.iter_mut() {
            for (r, mut col) in factor.axis_iter_mut(NdAxis(1)).enumerate() {
                let norm = col.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    col.mapv_inplace(|v| v / norm);
                    weights[r] *= norm;
                } else {
                    weights[r] = 0.0;
                }
            }
        }
        Self { weights, factors }
    }

    /// Keep only the given rows of one mode's factor matrix.
    pub fn select_rows(&self, mode: usize, rows: &[usize]) -> Self {
        let mut factors = self.factors.clone();
        factors[mode] = self.factors[mode].select(NdAxis(0), rows);
        Self {
            weights: self.weights.clone(),
            factors,
        }
    }

    /// Checks that the model can reconstruct a tensor of `shape`: one factor
    /// per mode, each `shape[m] × rank`.
    pub fn check_shape(&self, shape: &[usize]) -> Result<(), String> {
        if self.ndim() != shape.len() {
            return Err(format!(
                "model has {} factors for a {}-way tensor",
                self.ndim(),
                shape.len()
            ));
        }
        for (mode, (factor, &len)) in self.factors.iter().zip(shape).enumerate() {
            if factor.dim() != (len, self.rank()) {
                return Err(format!(
                    "factor {mode} is {}x{}, expected {len}x{}",
                    factor.nrows(),
                    factor.ncols(),
                    self.rank()
                ));
            }
        }
        Ok(())
    }

    /// True when every weight and factor entry is finite.
    pub fn is_finite(&self) -> bool {
        self.weights.iter().all(|w| w.is_finite())
            && self.factors.iter().all(|f| f.iter().all(|v| v.is_finite()))
    }
}

/// Scalar fit-quality metrics for one fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    /// `‖X − X̂‖² / ‖X‖²` over observed entries.
    #[serde(with = "nan_as_null")]
    pub relative_sse: f64,
    /// Final value of the penalized objective.
    #[serde(with = "nan_as_null")]
    pub loss: f64,
    /// Iterations used by the winning initialization.
    pub iterations: usize,
    pub converged: bool,
    /// Minimum pairwise component congruence. Near -1 signals degeneracy.
    #[serde(with = "nan_as_null")]
    pub degeneracy: f64,
    /// Components whose every factor column is non-zero.
    pub n_components: usize,
    /// CORCONDIA: 100 for a perfectly superdiagonal core, lower (possibly
    /// negative) as the trilinear structure breaks down.
    #[serde(with = "nan_as_null")]
    pub core_consistency: f64,
    /// Index of the winning initialization.
    pub best_init: usize,
    /// Relative SSE of every initialization's candidate.
    #[serde(with = "vec_nan_as_null")]
    pub candidate_sse: Vec<f64>,
    /// Factor match score of each candidate against the winner.
    #[serde(with = "vec_nan_as_null")]
    pub candidate_fms: Vec<f64>,
}

/// Bootstrap stability of one component of the reference fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfidence {
    pub component: usize,
    /// Mean congruence with the matched bootstrap component.
    #[serde(with = "nan_as_null")]
    pub mean_congruence: f64,
    #[serde(with = "nan_as_null")]
    pub std_congruence: f64,
}

/// Summary of bootstrap refits against the reference fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSummary {
    /// Bootstraps that fit successfully.
    pub n_bootstraps: usize,
    /// Bootstraps that failed to fit.
    pub n_failed: usize,
    pub components: Vec<ComponentConfidence>,
    /// Factor match score of every successful bootstrap.
    #[serde(with = "vec_nan_as_null")]
    pub fms: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub mean_fms: f64,
}

/// What data a fit was run against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitTarget {
    /// The full assembled tensor.
    Full,
    /// A replicate-resampled tensor.
    Bootstrap { id: usize },
    /// A single replicate's tensor in one relabeling round.
    Replicate { round: usize, label: String },
}

impl fmt::Display for FitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Bootstrap { id } => write!(f, "bootstrap{id}"),
            Self::Replicate { round, label } => write!(f, "round{round}:replicate{label}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitStatus {
    Succeeded,
    Failed { code: String, message: String },
}

/// Outcome of one configuration on one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: HyperParams,
    pub config_hash: String,
    pub target: FitTarget,
    pub status: FitStatus,
    pub model: Option<CpModel>,
    pub metrics: Option<FitMetrics>,
    pub bootstrap: Option<BootstrapSummary>,
    pub duration_ms: u64,
    /// When the fit finished (or failed).
    pub finished_at: DateTime<Utc>,
}

impl FitResult {
    pub fn succeeded(
        params: HyperParams,
        target: FitTarget,
        model: CpModel,
        metrics: FitMetrics,
        duration_ms: u64,
    ) -> Self {
        Self {
            config_hash: params.config_hash(),
            params,
            target,
            status: FitStatus::Succeeded,
            model: Some(model),
            metrics: Some(metrics),
            bootstrap: None,
            duration_ms,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(params: HyperParams, target: FitTarget, error: &FitError, duration_ms: u64) -> Self {
        Self {
            config_hash: params.config_hash(),
            params,
            target,
            status: FitStatus::Failed {
                code: error.error_code().to_string(),
                message: error.to_string(),
            },
            model: None,
            metrics: None,
            bootstrap: None,
            duration_ms,
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, FitStatus::Succeeded)
    }

    pub fn relative_sse(&self) -> Option<f64> {
        self.metrics.as_ref().map(|m| m.relative_sse)
    }

    /// `rank=.. lambdas=[..] (target)` label for logs and reports.
    pub fn label(&self) -> String {
        format!("{} ({})", self.params.label(), self.target)
    }
}
