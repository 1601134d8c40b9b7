//! Sweep execution options.

use tensorsweep_core::config::SweepConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    /// Bootstrap refits per configuration.
    pub n_bootstraps: usize,
    /// Worker threads.
    pub max_workers: usize,
    /// Fit each replicate separately and cross-compare.
    pub cross_validate: bool,
    /// Master seed for bootstrap resampling.
    pub seed: u64,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self::from_config(&SweepConfig::default())
    }
}

impl SweepOptions {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            n_bootstraps: config.sweep.effective_n_bootstraps(),
            max_workers: config.sweep.effective_max_workers(),
            cross_validate: config.sweep.effective_cross_validate(),
            seed: config.sweep.effective_seed(),
        }
    }
}
