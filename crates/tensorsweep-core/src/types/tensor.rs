//! Labeled tensors: a dense N-dimensional array plus per-axis labels.

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::errors::AssemblyError;

/// One tensor axis: a name and the ordered labels mapping position to value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub labels: Vec<String>,
}

impl Axis {
    pub fn new(name: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of a label on this axis.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

/// A dense tensor whose shape along axis `i` equals `axes[i].len()`.
///
/// Missing combinations hold whatever the assembler's fill policy put there;
/// `NaN` is treated as unobserved by every downstream consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTensor {
    axes: Vec<Axis>,
    data: ArrayD<f64>,
}

impl LabeledTensor {
    /// Build a tensor, checking the shape against the axis labels.
    pub fn new(axes: Vec<Axis>, data: ArrayD<f64>) -> Result<Self, AssemblyError> {
        let expected: Vec<usize> = axes.iter().map(Axis::len).collect();
        if expected.as_slice() != data.shape() {
            return Err(AssemblyError::ShapeMismatch {
                expected,
                actual: data.shape().to_vec(),
            });
        }
        Ok(Self { axes, data })
    }

    /// Same axes, new values.
    pub fn with_data(&self, data: ArrayD<f64>) -> Result<Self, AssemblyError> {
        Self::new(self.axes.clone(), data)
    }

    /// A tensor of the given axes filled with one value.
    pub fn filled(axes: Vec<Axis>, value: f64) -> Self {
        let shape: Vec<usize> = axes.iter().map(Axis::len).collect();
        Self {
            axes,
            data: ArrayD::from_elem(IxDyn(&shape), value),
        }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn shape(&self) -> Vec<usize> {
        self.data.shape().to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Value at the coordinate given by one label per axis.
    pub fn get(&self, labels: &[&str]) -> Option<f64> {
        if labels.len() != self.axes.len() {
            return None;
        }
        let index: Option<Vec<usize>> = self
            .axes
            .iter()
            .zip(labels)
            .map(|(axis, label)| axis.position(label))
            .collect();
        self.data.get(IxDyn(&index?)).copied()
    }

    /// Number of entries that are not `NaN`.
    pub fn observed_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Number of `NaN` entries.
    pub fn missing_count(&self) -> usize {
        self.data.len() - self.observed_count()
    }

    /// Stable content fingerprint (xxh3-128, hex) over axis names, labels and value bits.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Xxh3::new();
        for axis in &self.axes {
            hasher.update(axis.name.as_bytes());
            hasher.update(&[0]);
            for label in &axis.labels {
                hasher.update(label.as_bytes());
                hasher.update(&[0]);
            }
            hasher.update(&[1]);
        }
        for v in self.data.iter() {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        format!("{:032x}", hasher.digest128())
    }

    /// Bit-level equality: labels match and every value has identical bits (NaN included).
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.axes == other.axes
            && self.data.shape() == other.data.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> Vec<Axis> {
        vec![
            Axis::new("gene", vec!["A".into(), "B".into()]),
            Axis::new("taxon", vec!["X".into(), "Y".into(), "Z".into()]),
        ]
    }

    #[test]
    fn new_rejects_shape_mismatch() {
        let data = ArrayD::zeros(IxDyn(&[2, 2]));
        let err = LabeledTensor::new(axes(), data).unwrap_err();
        assert!(matches!(err, AssemblyError::ShapeMismatch { .. }));
    }

    #[test]
    fn get_by_labels() {
        let mut data = ArrayD::zeros(IxDyn(&[2, 3]));
        data[IxDyn(&[1, 2])] = 7.5;
        let t = LabeledTensor::new(axes(), data).unwrap();
        assert_eq!(t.get(&["B", "Z"]), Some(7.5));
        assert_eq!(t.get(&["B", "nope"]), None);
        assert_eq!(t.get(&["B"]), None);
    }

    #[test]
    fn fingerprint_tracks_values_and_labels() {
        let t = LabeledTensor::filled(axes(), f64::NAN);
        let same = LabeledTensor::filled(axes(), f64::NAN);
        assert_eq!(t.fingerprint(), same.fingerprint());
        assert!(t.bit_eq(&same));
        assert_eq!(t.missing_count(), 6);

        let zeros = LabeledTensor::filled(axes(), 0.0);
        assert_ne!(t.fingerprint(), zeros.fingerprint());

        let mut relabeled = axes();
        relabeled[0].labels[0] = "C".into();
        let other = LabeledTensor::filled(relabeled, f64::NAN);
        assert_ne!(t.fingerprint(), other.fingerprint());
    }
}
