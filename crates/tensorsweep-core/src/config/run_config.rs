//! Sweep execution configuration (`[sweep]` table).

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SEED;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    /// Master seed; every fit seed derives from it. Default: 9481.
    pub seed: Option<u64>,
    /// Bootstrap refits per configuration. Default: 0.
    pub n_bootstraps: Option<usize>,
    /// Worker threads for the sweep. Default: available parallelism.
    pub max_workers: Option<usize>,
    /// Fit each replicate separately and cross-compare. Default: false.
    pub cross_validate: Option<bool>,
    /// Shuffle replicate labels within groups of this column before
    /// cross-validation.
    pub shuffle_replicates_by: Option<String>,
    /// Cross-validation rounds, each on a fresh relabeling. More than one
    /// needs `shuffle_replicates_by`. Default: 1.
    pub cv_rounds: Option<usize>,
}

impl RunConfig {
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn effective_n_bootstraps(&self) -> usize {
        self.n_bootstraps.unwrap_or(0)
    }

    pub fn effective_max_workers(&self) -> usize {
        self.max_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn effective_cv_rounds(&self) -> usize {
        self.cv_rounds.unwrap_or(1)
    }

    pub fn effective_cross_validate(&self) -> bool {
        self.cross_validate.unwrap_or(false)
    }
}
