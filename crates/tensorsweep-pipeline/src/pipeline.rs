//! End-to-end wiring of the stages for one resolved configuration.

use std::path::Path;
use std::time::Instant;

use tensorsweep_core::config::SweepConfig;
use tensorsweep_core::errors::PipelineError;
use tensorsweep_core::types::{LabeledTensor, TidyTable};

use crate::assembler::{AssemblyOptions, TensorAssembler};
use crate::driver::{SweepDriver, SweepReport};
use crate::grid::ParameterGrid;
use crate::loader::{TableSchema, TidyTableLoader};
use crate::normalize::{normalize_table, normalizer_from_config};
use crate::replicates::{relabel_rounds, ReplicateSet};

/// Everything the fit stage needs from one input table.
#[derive(Debug, Clone)]
pub struct AssembledInput {
    /// The normalized table, original replicate labels.
    pub table: TidyTable,
    /// Tensor over the configured dimensions, replicates pooled.
    pub tensor: LabeledTensor,
    /// One tensor per replicate, on the same axes as `tensor`.
    pub replicates: ReplicateSet,
    /// Replicate tensors for each cross-validation round. Relabeled per
    /// round when `sweep.shuffle_replicates_by` is set.
    pub rounds: Vec<ReplicateSet>,
}

/// Runs load → normalize → assemble → sweep for a configuration.
pub struct Pipeline {
    config: SweepConfig,
}

impl Pipeline {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Load, normalize and assemble the configured input file.
    pub fn assemble(&self) -> Result<AssembledInput, PipelineError> {
        let path = self.config.require_input()?;
        self.assemble_from(path)
    }

    /// Same as [`Pipeline::assemble`], reading `path` instead of the
    /// configured input.
    pub fn assemble_from(&self, path: &Path) -> Result<AssembledInput, PipelineError> {
        let start = Instant::now();
        let schema = TableSchema::from_config(&self.config.input);
        let table = TidyTableLoader::new(schema).load(path)?;

        let normalizer = normalizer_from_config(&self.config.normalize, &table);
        tracing::debug!(normalizer = normalizer.name(), "normalizing");
        let table = normalize_table(table, normalizer.as_ref())?;

        let assembler = TensorAssembler::new(AssemblyOptions::from_config(&self.config.tensor));
        let axes: Vec<&str> = self.config.input.dimensions.iter().map(String::as_str).collect();
        let tensor = assembler.assemble(&table, &axes)?;
        let replicates = ReplicateSet::build(&assembler, &table, &tensor)?;
        let group_by = self.config.sweep.shuffle_replicates_by.as_deref();
        let rounds = relabel_rounds(
            &assembler,
            &table,
            &tensor,
            group_by,
            self.config.sweep.effective_cv_rounds(),
            self.config.sweep.effective_seed(),
        )?;
        if let Some(group_by) = group_by {
            tracing::info!(group_by, rounds = rounds.len(), "relabeled replicates");
        }

        tracing::info!(
            path = %path.display(),
            records = table.records.len(),
            shape = ?tensor.shape(),
            observed = tensor.observed_count(),
            replicates = replicates.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "assembled input"
        );
        Ok(AssembledInput {
            table,
            tensor,
            replicates,
            rounds,
        })
    }

    /// The configured hyperparameter grid for a tensor of `ndim` modes.
    pub fn grid(&self, ndim: usize) -> ParameterGrid {
        ParameterGrid::from_config(&self.config, ndim)
    }

    /// Sweep the configured grid over `input` with `driver`.
    pub fn sweep(
        &self,
        input: &AssembledInput,
        driver: &SweepDriver,
    ) -> Result<SweepReport, PipelineError> {
        let grid = self.grid(input.tensor.ndim());
        driver.run_rounds(&input.tensor, Some(&input.replicates), &input.rounds, &grid)
    }
}
