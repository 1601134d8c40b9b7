//! Tensor assembly configuration.

use serde::{Deserialize, Serialize};

/// How missing combinations are filled (config form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillKind {
    #[default]
    Nan,
    Zero,
    Constant,
    Error,
}

/// How missing combinations are filled (resolved form).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillPolicy {
    /// Leave missing entries as `NaN`; downstream treats them as unobserved.
    Nan,
    /// Fill with a constant.
    Constant(f64),
    /// Fail with `MissingAxis` on the first missing combination.
    Error,
}

impl FillPolicy {
    /// The sentinel stored for missing entries, if any.
    pub fn sentinel(self) -> Option<f64> {
        match self {
            Self::Nan => Some(f64::NAN),
            Self::Constant(v) => Some(v),
            Self::Error => None,
        }
    }
}

/// What to do when two records land on the same coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Sum,
    #[default]
    Mean,
    /// Keep the value of the record that appears last in the table.
    Last,
    /// Fail with `DuplicateCoordinate`.
    Error,
}

/// Order of labels along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelOrder {
    #[default]
    Sorted,
    FirstSeen,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TensorConfig {
    /// Default: nan.
    pub fill: Option<FillKind>,
    /// Used when `fill = "constant"`. Default: 0.0.
    pub fill_value: Option<f64>,
    /// Default: mean.
    pub reduction: Option<Reduction>,
    /// Default: sorted.
    pub label_order: Option<LabelOrder>,
}

impl TensorConfig {
    pub fn effective_fill(&self) -> FillPolicy {
        match self.fill.unwrap_or_default() {
            FillKind::Nan => FillPolicy::Nan,
            FillKind::Zero => FillPolicy::Constant(0.0),
            FillKind::Constant => FillPolicy::Constant(self.fill_value.unwrap_or(0.0)),
            FillKind::Error => FillPolicy::Error,
        }
    }

    pub fn effective_reduction(&self) -> Reduction {
        self.reduction.unwrap_or_default()
    }

    pub fn effective_label_order(&self) -> LabelOrder {
        self.label_order.unwrap_or_default()
    }
}
