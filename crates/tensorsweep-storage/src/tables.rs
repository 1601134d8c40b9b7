//! Flat CSV tables of every fit and every replicate comparison.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tensorsweep_core::errors::WriteError;
use tensorsweep_core::types::{CvRecord, FitResult, FitStatus, FitTarget};

use crate::archive::write_atomic;

/// One row of `fitting_data.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRow {
    /// RFC 3339 time the fit finished.
    pub finished_at: String,
    pub config_hash: String,
    pub target: String,
    /// Resample id of a bootstrap fit, relabeling round of a replicate fit.
    pub bootstrap_id: Option<usize>,
    pub replicate: Option<String>,
    pub rank: usize,
    pub lambdas: String,
    pub seed: u64,
    pub status: String,
    pub relative_sse: Option<f64>,
    pub loss: Option<f64>,
    pub iterations: Option<usize>,
    pub converged: Option<bool>,
    pub degeneracy: Option<f64>,
    pub core_consistency: Option<f64>,
    pub n_components: Option<usize>,
    pub best_init: Option<usize>,
    /// Relative SSE per initialization, as `[s0,s1,..]`.
    pub candidate_sse: Option<String>,
    /// Factor match score of each initialization against the winner.
    pub candidate_fms: Option<String>,
    /// Mean bootstrap factor match score, full-tensor fits only.
    pub bootstrap_mean_fms: Option<f64>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

const FIT_COLUMNS: [&str; 22] = [
    "finished_at",
    "config_hash",
    "target",
    "bootstrap_id",
    "replicate",
    "rank",
    "lambdas",
    "seed",
    "status",
    "relative_sse",
    "loss",
    "iterations",
    "converged",
    "degeneracy",
    "core_consistency",
    "n_components",
    "best_init",
    "candidate_sse",
    "candidate_fms",
    "bootstrap_mean_fms",
    "duration_ms",
    "error",
];

const CV_COLUMNS: [&str; 10] = [
    "bootstrap_id",
    "config_hash",
    "rank",
    "lambdas",
    "modeled_replicate",
    "comparison_replicate",
    "n_components",
    "mode0_factor_sparsity",
    "relative_sse",
    "fms",
];

impl From<&FitResult> for FitRow {
    fn from(result: &FitResult) -> Self {
        let metrics = result.metrics.as_ref();
        let (status, error) = match &result.status {
            FitStatus::Succeeded => ("succeeded".to_string(), None),
            FitStatus::Failed { code, message } => (code.clone(), Some(message.clone())),
        };
        let (bootstrap_id, replicate) = match &result.target {
            FitTarget::Full => (None, None),
            FitTarget::Bootstrap { id } => (Some(*id), None),
            FitTarget::Replicate { round, label } => (Some(*round), Some(label.clone())),
        };
        Self {
            finished_at: result.finished_at.to_rfc3339(),
            config_hash: result.config_hash.clone(),
            target: result.target.to_string(),
            bootstrap_id,
            replicate,
            rank: result.params.rank,
            lambdas: result.params.lambdas_label(),
            seed: result.params.seed,
            status,
            relative_sse: metrics.map(|m| m.relative_sse),
            loss: metrics.map(|m| m.loss),
            iterations: metrics.map(|m| m.iterations),
            converged: metrics.map(|m| m.converged),
            degeneracy: metrics.map(|m| m.degeneracy),
            core_consistency: metrics.map(|m| m.core_consistency),
            n_components: metrics.map(|m| m.n_components),
            best_init: metrics.map(|m| m.best_init),
            candidate_sse: metrics.map(|m| list_label(&m.candidate_sse)),
            candidate_fms: metrics.map(|m| list_label(&m.candidate_fms)),
            bootstrap_mean_fms: result.bootstrap.as_ref().map(|b| b.mean_fms),
            duration_ms: result.duration_ms,
            error,
        }
    }
}

fn list_label(values: &[f64]) -> String {
    let values: Vec<String> = values.iter().map(|v| format!("{v}")).collect();
    format!("[{}]", values.join(","))
}

/// Write one row per fit to `path` (conventionally `fitting_data.csv`).
pub fn write_fit_table<'a>(
    path: &Path,
    results: impl IntoIterator<Item = &'a FitResult>,
) -> Result<u64, WriteError> {
    let rows = results.into_iter().map(FitRow::from);
    write_table(path, &FIT_COLUMNS, rows)
}

/// Write one row per replicate comparison to `path` (conventionally `cv_data.csv`).
pub fn write_cv_table(path: &Path, records: &[CvRecord]) -> Result<u64, WriteError> {
    write_table(path, &CV_COLUMNS, records.iter())
}

/// Serialize rows under an explicit header, so an empty table still has one.
fn write_table<T: Serialize>(
    path: &Path,
    columns: &[&str],
    rows: impl Iterator<Item = T>,
) -> Result<u64, WriteError> {
    let serialize_err = |message: String| WriteError::Serialize {
        artifact: path.display().to_string(),
        message,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(columns)
        .map_err(|e| serialize_err(e.to_string()))?;
    let mut count = 0usize;
    for row in rows {
        writer.serialize(row).map_err(|e| serialize_err(e.to_string()))?;
        count += 1;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| serialize_err(e.to_string()))?;

    let written = write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), rows = count, "wrote table");
    Ok(written)
}
