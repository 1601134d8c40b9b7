//! Per-cell reduction of colliding records.

use tensorsweep_core::config::{FillPolicy, Reduction};

pub(crate) struct Accumulator {
    reduction: Reduction,
    values: Vec<f64>,
    counts: Vec<u32>,
}

impl Accumulator {
    pub(crate) fn new(len: usize, reduction: Reduction) -> Self {
        Self {
            reduction,
            values: vec![0.0; len],
            counts: vec![0; len],
        }
    }

    /// Fold one value into cell `flat`. Returns false when the cell is
    /// already occupied and the reduction forbids duplicates.
    pub(crate) fn add(&mut self, flat: usize, value: f64) -> bool {
        let seen = self.counts[flat] > 0;
        match self.reduction {
            Reduction::Error if seen => return false,
            Reduction::Sum | Reduction::Mean => {
                self.values[flat] = if seen { self.values[flat] + value } else { value }
            }
            Reduction::Last | Reduction::Error => self.values[flat] = value,
        }
        self.counts[flat] += 1;
        true
    }

    /// Reduced values in cell order. Empty cells take the fill sentinel;
    /// under a strict fill the first empty cell index is returned as the error.
    pub(crate) fn finish(self, fill: FillPolicy) -> Result<Vec<f64>, usize> {
        let sentinel = fill.sentinel();
        let reduction = self.reduction;
        self.values
            .into_iter()
            .zip(self.counts)
            .enumerate()
            .map(|(i, (value, count))| match count {
                0 => sentinel.ok_or(i),
                1 => Ok(value),
                n if reduction == Reduction::Mean => Ok(value / f64::from(n)),
                _ => Ok(value),
            })
            .collect()
    }
}
