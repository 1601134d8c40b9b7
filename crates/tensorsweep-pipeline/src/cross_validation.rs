//! Replicate cross-validation: every replicate fit scored against every
//! replicate's data.

use ndarray::{ArrayD, Axis};
use tensorsweep_core::types::{CpModel, CvRecord, FitResult, HyperParams};

use crate::metrics::{factor_match_score, factor_sparsity, nonzero_components, relative_sse};
use crate::replicates::ReplicateSet;

/// Compare the per-replicate fits of one configuration in one relabeling
/// round.
///
/// `fits` pairs replicate labels with their fit results. Failed modeled
/// fits produce no rows. Comparisons between two different replicates are
/// restricted to the positions both replicates observed. The factor match
/// score is only computed once per unordered pair (modeled label <
/// comparison label); self and mirrored comparisons get `NaN`.
pub fn cross_validate(
    params: &HyperParams,
    bootstrap_id: usize,
    fits: &[(&str, &FitResult)],
    replicates: &ReplicateSet,
) -> Vec<CvRecord> {
    let mut records = Vec::new();
    for &(modeled_label, modeled) in fits {
        let Some(model) = modeled.model.as_ref() else {
            continue;
        };
        let Some(modeled_data) = replicates.get(modeled_label) else {
            continue;
        };
        let n_components = nonzero_components(model);
        let sparsity = factor_sparsity(model, 0);

        for (comparison_label, comparison_data) in replicates.iter() {
            let (relative_sse, fms) = if modeled_label == comparison_label {
                (relative_sse(model, comparison_data.data()), f64::NAN)
            } else {
                let keep = shared_support(modeled_data.data(), comparison_data.data());
                let modeled_sub = restrict_model(model, &keep);
                let fms = if modeled_label < comparison_label {
                    fits.iter()
                        .find(|(label, _)| *label == comparison_label)
                        .and_then(|(_, fit)| fit.model.as_ref())
                        .map(|other| factor_match_score(&modeled_sub, &restrict_model(other, &keep)))
                        .unwrap_or(f64::NAN)
                } else {
                    f64::NAN
                };
                let data = restrict_data(comparison_data.data(), &keep);
                (relative_sse(&modeled_sub, &data), fms)
            };

            records.push(CvRecord {
                bootstrap_id,
                config_hash: params.config_hash(),
                rank: params.rank,
                lambdas: params.lambdas_label(),
                modeled_replicate: modeled_label.to_string(),
                comparison_replicate: comparison_label.to_string(),
                n_components,
                mode0_factor_sparsity: sparsity,
                relative_sse,
                fms,
            });
        }
    }
    records
}

/// Per mode, the indices whose slice holds an observed entry in both `a`
/// and `b`.
fn shared_support(a: &ArrayD<f64>, b: &ArrayD<f64>) -> Vec<Vec<usize>> {
    let observed = |x: &ArrayD<f64>, mode: usize, i: usize| {
        x.index_axis(Axis(mode), i).iter().any(|v| !v.is_nan())
    };
    (0..a.ndim())
        .map(|mode| {
            (0..a.len_of(Axis(mode)))
                .filter(|&i| observed(a, mode, i) && observed(b, mode, i))
                .collect()
        })
        .collect()
}

fn restrict_model(model: &CpModel, keep: &[Vec<usize>]) -> CpModel {
    keep.iter()
        .enumerate()
        .fold(model.clone(), |m, (mode, rows)| m.select_rows(mode, rows))
}

fn restrict_data(data: &ArrayD<f64>, keep: &[Vec<usize>]) -> ArrayD<f64> {
    keep.iter()
        .enumerate()
        .fold(data.clone(), |d, (mode, rows)| d.select(Axis(mode), rows))
}
