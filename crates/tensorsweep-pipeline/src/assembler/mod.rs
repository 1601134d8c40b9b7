//! Tensor Assembler: pivots a tidy table into a dense labeled tensor.

mod accumulator;
mod columns;

use ndarray::{ArrayD, IxDyn};
use tensorsweep_core::config::{FillPolicy, LabelOrder, Reduction, TensorConfig};
use tensorsweep_core::errors::AssemblyError;
use tensorsweep_core::types::{Axis, FxHashMap, FxHashSet, LabeledTensor, TidyRecord, TidyTable};

use accumulator::Accumulator;
use columns::ColumnRef;

/// Fill, duplicate reduction and label ordering for one assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyOptions {
    pub fill: FillPolicy,
    pub reduction: Reduction,
    pub label_order: LabelOrder,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            fill: FillPolicy::Nan,
            reduction: Reduction::Mean,
            label_order: LabelOrder::Sorted,
        }
    }
}

impl AssemblyOptions {
    pub fn from_config(config: &TensorConfig) -> Self {
        Self {
            fill: config.effective_fill(),
            reduction: config.effective_reduction(),
            label_order: config.effective_label_order(),
        }
    }
}

/// Stateless pivot from records to a `LabeledTensor`.
///
/// Identical input and options always produce a bit-identical tensor:
/// records are visited in table order and labels are ordered by a
/// deterministic rule.
#[derive(Debug, Clone, Default)]
pub struct TensorAssembler {
    options: AssemblyOptions,
}

impl TensorAssembler {
    pub fn new(options: AssemblyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Assemble all records along the named axes, deriving labels from the data.
    ///
    /// Axis names may be any categorical column: a dimension, the replicate
    /// column or a covariate. Columns left out collapse via the reduction.
    pub fn assemble(&self, table: &TidyTable, axes: &[&str]) -> Result<LabeledTensor, AssemblyError> {
        let columns = resolve(table, axes)?;
        if table.is_empty() {
            return Err(AssemblyError::EmptyInput);
        }
        let labeled_axes: Vec<Axis> = axes
            .iter()
            .zip(&columns)
            .map(|(name, column)| Axis::new(*name, self.labels(&table.records, *column)))
            .collect();
        self.scatter(table.records.iter(), &columns, labeled_axes)
    }

    /// Assemble the records accepted by `keep` onto fixed axes.
    ///
    /// Every kept record must carry labels present on the given axes;
    /// positions with no kept record follow the fill policy. Used to build
    /// tensors that share another tensor's shape.
    pub fn assemble_with_axes<F>(
        &self,
        table: &TidyTable,
        axes: Vec<Axis>,
        keep: F,
    ) -> Result<LabeledTensor, AssemblyError>
    where
        F: Fn(&TidyRecord) -> bool,
    {
        let names: Vec<&str> = axes.iter().map(|a| a.name.as_str()).collect();
        let columns = resolve(table, &names)?;
        self.scatter(table.records.iter().filter(|r| keep(r)), &columns, axes)
    }

    fn labels(&self, records: &[TidyRecord], column: ColumnRef) -> Vec<String> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut labels = Vec::new();
        for record in records {
            let label = column.get(record);
            if seen.insert(label) {
                labels.push(label.to_string());
            }
        }
        if self.options.label_order == LabelOrder::Sorted {
            labels.sort();
        }
        labels
    }

    fn scatter<'a>(
        &self,
        records: impl Iterator<Item = &'a TidyRecord>,
        columns: &[ColumnRef],
        axes: Vec<Axis>,
    ) -> Result<LabeledTensor, AssemblyError> {
        let positions: Vec<FxHashMap<&str, usize>> = axes
            .iter()
            .map(|axis| {
                axis.labels
                    .iter()
                    .enumerate()
                    .map(|(i, l)| (l.as_str(), i))
                    .collect()
            })
            .collect();
        let shape: Vec<usize> = axes.iter().map(Axis::len).collect();
        let strides = row_major_strides(&shape);
        let mut acc = Accumulator::new(shape.iter().product(), self.options.reduction);

        for record in records {
            let mut flat = 0;
            for (i, column) in columns.iter().enumerate() {
                let label = column.get(record);
                let pos = positions[i]
                    .get(label)
                    .ok_or_else(|| AssemblyError::UnknownLabel {
                        axis: axes[i].name.clone(),
                        label: label.to_string(),
                    })?;
                flat += pos * strides[i];
            }
            if !acc.add(flat, record.value()) {
                return Err(AssemblyError::DuplicateCoordinate {
                    coordinate: describe(&axes, &strides, flat),
                });
            }
        }

        let values = acc.finish(self.options.fill).map_err(|flat| AssemblyError::MissingAxis {
            coordinate: describe(&axes, &strides, flat),
        })?;
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
            AssemblyError::ShapeMismatch {
                expected: shape.clone(),
                actual: vec![],
            }
        })?;
        let tensor = LabeledTensor::new(axes, data)?;

        tracing::debug!(
            shape = ?tensor.shape(),
            observed = tensor.observed_count(),
            missing = tensor.missing_count(),
            "assembled tensor"
        );
        Ok(tensor)
    }
}

/// Map axis names to record columns.
fn resolve(table: &TidyTable, axes: &[&str]) -> Result<Vec<ColumnRef>, AssemblyError> {
    if axes.is_empty() {
        return Err(AssemblyError::NoAxes);
    }
    axes.iter()
        .map(|name| {
            ColumnRef::resolve(table, name).ok_or_else(|| AssemblyError::UnknownAxis {
                axis: name.to_string(),
            })
        })
        .collect()
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// `(gene=A, taxon=X)` for a flat row-major index.
fn describe(axes: &[Axis], strides: &[usize], flat: usize) -> String {
    let parts: Vec<String> = axes
        .iter()
        .zip(strides)
        .map(|(axis, stride)| {
            let pos = (flat / stride) % axis.len().max(1);
            let label = axis.labels.get(pos).map(String::as_str).unwrap_or("?");
            format!("{}={}", axis.name, label)
        })
        .collect();
    format!("({})", parts.join(", "))
}
