//! Job planning: one fit per (configuration, target), seeds fixed up front.

use tensorsweep_core::types::{FitTarget, HyperParams, LabeledTensor};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// One planned fit.
#[derive(Debug, Clone)]
pub(crate) struct FitJob {
    /// Position in job-assembly order.
    pub index: usize,
    /// Index of the configuration in the grid.
    pub config: usize,
    /// Configuration with its derived seed.
    pub params: HyperParams,
    pub target: FitTarget,
}

/// Seed for one fit, derived from the configuration's master seed, its
/// seed-free grid key and the fit target. Independent of scheduling and of
/// which other configurations are in the grid.
pub(crate) fn derive_seed(params: &HyperParams, target: &FitTarget) -> u64 {
    let tag = format!("{}:{}", params.grid_key(), target);
    xxh3_64_with_seed(tag.as_bytes(), params.seed)
}

/// Seed for the resampling of bootstrap `id`.
pub(crate) fn bootstrap_seed(master: u64, id: usize) -> u64 {
    xxh3_64_with_seed(format!("bootstrap:{id}").as_bytes(), master)
}

/// Cache key: configuration hash, data fingerprint and target.
pub(crate) fn cache_key(params: &HyperParams, tensor: &LabeledTensor, target: &FitTarget) -> String {
    format!("{}:{}:{}", params.config_hash(), tensor.fingerprint(), target)
}

/// Jobs in assembly order: per configuration the full fit, then each
/// bootstrap, then each replicate of each relabeling round.
pub(crate) fn plan(
    grid: &[HyperParams],
    n_bootstraps: usize,
    round_labels: &[Vec<String>],
) -> Vec<FitJob> {
    let mut jobs = Vec::new();
    for (config, point) in grid.iter().enumerate() {
        let targets = std::iter::once(FitTarget::Full)
            .chain((0..n_bootstraps).map(|id| FitTarget::Bootstrap { id }))
            .chain(round_labels.iter().enumerate().flat_map(|(round, labels)| {
                labels.iter().map(move |label| FitTarget::Replicate {
                    round,
                    label: label.clone(),
                })
            }));
        for target in targets {
            jobs.push(FitJob {
                index: jobs.len(),
                config,
                params: point.with_seed(derive_seed(point, &target)),
                target,
            });
        }
    }
    jobs
}
