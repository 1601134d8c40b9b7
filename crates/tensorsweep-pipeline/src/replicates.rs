//! Replicate handling: per-replicate tensors, label shuffling and
//! bootstrap resampling.

use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tensorsweep_core::config::FillPolicy;
use tensorsweep_core::errors::AssemblyError;
use tensorsweep_core::types::{LabeledTensor, TidyTable};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::assembler::{AssemblyOptions, TensorAssembler};

/// One tensor per replicate, all sharing the reference tensor's axes.
#[derive(Debug, Clone)]
pub struct ReplicateSet {
    replicates: Vec<(String, LabeledTensor)>,
}

impl ReplicateSet {
    /// Split `table` by replicate label (sorted) and assemble each part on
    /// the axes of `reference`. Positions a replicate never observed take
    /// the assembler's fill value, or `NaN` under a strict fill policy.
    pub fn build(
        assembler: &TensorAssembler,
        table: &TidyTable,
        reference: &LabeledTensor,
    ) -> Result<Self, AssemblyError> {
        let assembler = match assembler.options().fill {
            FillPolicy::Error => TensorAssembler::new(AssemblyOptions {
                fill: FillPolicy::Nan,
                ..*assembler.options()
            }),
            _ => assembler.clone(),
        };
        let mut replicates = Vec::new();
        for label in table.replicates() {
            let tensor = assembler.assemble_with_axes(table, reference.axes().to_vec(), |r| {
                r.replicate == label
            })?;
            replicates.push((label, tensor));
        }
        tracing::debug!(replicates = replicates.len(), "built replicate tensors");
        Ok(Self { replicates })
    }

    /// Wrap already-assembled replicate tensors, kept in the given order.
    pub fn from_tensors(replicates: Vec<(String, LabeledTensor)>) -> Self {
        Self { replicates }
    }

    pub fn len(&self) -> usize {
        self.replicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicates.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.replicates.iter().map(|(l, _)| l.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&LabeledTensor> {
        self.replicates
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabeledTensor)> {
        self.replicates.iter().map(|(l, t)| (l.as_str(), t))
    }

    /// Draw `len()` replicates with replacement and combine them by a
    /// NaN-aware mean. Positions missing from every draw stay `NaN`.
    pub fn bootstrap_resample<R: Rng>(&self, rng: &mut R) -> Result<LabeledTensor, AssemblyError> {
        let Some((_, first)) = self.replicates.first() else {
            return Err(AssemblyError::EmptyInput);
        };
        let shape = first.shape();
        let mut sums = ArrayD::<f64>::zeros(IxDyn(&shape));
        let mut counts = ArrayD::<f64>::zeros(IxDyn(&shape));

        for _ in 0..self.replicates.len() {
            let (_, tensor) = &self.replicates[rng.gen_range(0..self.replicates.len())];
            Zip::from(&mut sums)
                .and(&mut counts)
                .and(tensor.data())
                .for_each(|s, c, &v| {
                    if !v.is_nan() {
                        *s += v;
                        *c += 1.0;
                    }
                });
        }

        let mean = Zip::from(&sums)
            .and(&counts)
            .map_collect(|&s, &c| if c > 0.0 { s / c } else { f64::NAN });
        first.with_data(mean)
    }
}

/// Randomly relabel replicates within each group of `group_by`.
///
/// Inside every group, the group's distinct replicates are mapped onto
/// distinct labels drawn without replacement from the table's replicate
/// pool. Groups are visited in sorted order, so the result depends only on
/// the table and the seed.
pub fn shuffle_replicate_labels(
    table: &TidyTable,
    group_by: &str,
    seed: u64,
) -> Result<TidyTable, AssemblyError> {
    let groups = table
        .categorical_column(group_by)
        .ok_or_else(|| AssemblyError::UnknownAxis {
            axis: group_by.to_string(),
        })?;
    let pool = table.replicates();

    let mut members: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (group, record) in groups.iter().zip(&table.records) {
        let reps = members.entry(group.as_str()).or_default();
        if !reps.contains(&record.replicate.as_str()) {
            reps.push(record.replicate.as_str());
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut mapping: BTreeMap<(&str, &str), String> = BTreeMap::new();
    for (group, reps) in members.iter_mut() {
        reps.sort_unstable();
        let mut drawn = pool.clone();
        drawn.shuffle(&mut rng);
        for (old, new) in reps.iter().zip(drawn) {
            mapping.insert((*group, *old), new);
        }
    }

    let mut shuffled = table.clone();
    for (record, group) in shuffled.records.iter_mut().zip(&groups) {
        let key = (group.as_str(), record.replicate.as_str());
        if let Some(new) = mapping.get(&key).cloned() {
            record.replicate = new;
        }
    }
    tracing::debug!(group_by, seed, groups = members.len(), "shuffled replicate labels");
    Ok(shuffled)
}

/// Seed for relabeling round `round`.
pub fn relabel_seed(master: u64, round: usize) -> u64 {
    xxh3_64_with_seed(format!("relabel:{round}").as_bytes(), master)
}

/// One replicate set per cross-validation round.
///
/// With `group_by`, round `r` splits a copy of `table` relabeled with
/// [`relabel_seed`]`(seed, r)`. Without it there is a single round on the
/// table's own labels and `rounds` is ignored.
pub fn relabel_rounds(
    assembler: &TensorAssembler,
    table: &TidyTable,
    reference: &LabeledTensor,
    group_by: Option<&str>,
    rounds: usize,
    seed: u64,
) -> Result<Vec<ReplicateSet>, AssemblyError> {
    let Some(group_by) = group_by else {
        return Ok(vec![ReplicateSet::build(assembler, table, reference)?]);
    };
    (0..rounds.max(1))
        .map(|round| {
            let relabeled = shuffle_replicate_labels(table, group_by, relabel_seed(seed, round))?;
            ReplicateSet::build(assembler, &relabeled, reference)
        })
        .collect()
}
