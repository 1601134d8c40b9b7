//! Tidy records: one row per observation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One observation of the input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRecord {
    /// Dimension values, in the table's declared dimension order.
    pub dims: Vec<String>,
    /// Replicate identifier.
    pub replicate: String,
    /// Raw measurement as read from the value column.
    pub raw: f64,
    /// Adjusted measurement. `None` until the normalizer runs.
    pub normalized: Option<f64>,
    /// Covariate values, in the table's declared covariate order.
    pub covariates: Vec<String>,
}

impl TidyRecord {
    /// The value fed to tensor assembly: normalized if available, raw otherwise.
    pub fn value(&self) -> f64 {
        self.normalized.unwrap_or(self.raw)
    }
}

/// A loaded tidy table together with the schema it was loaded under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyTable {
    /// File the table was read from.
    pub source: PathBuf,
    pub dimensions: Vec<String>,
    pub replicate_column: String,
    pub value_column: String,
    pub covariate_columns: Vec<String>,
    pub records: Vec<TidyRecord>,
}

impl TidyTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a dimension column.
    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d == name)
    }

    /// True once every record carries a normalized value.
    pub fn is_normalized(&self) -> bool {
        self.records.iter().all(|r| r.normalized.is_some())
    }

    /// Raw measurements in record order.
    pub fn raw_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.raw).collect()
    }

    /// Values of any categorical column (dimension, replicate or covariate) by name.
    pub fn categorical_column(&self, name: &str) -> Option<Vec<String>> {
        if let Some(i) = self.dimension_index(name) {
            return Some(self.records.iter().map(|r| r.dims[i].clone()).collect());
        }
        if name == self.replicate_column {
            return Some(self.records.iter().map(|r| r.replicate.clone()).collect());
        }
        let i = self.covariate_columns.iter().position(|c| c == name)?;
        Some(self.records.iter().map(|r| r.covariates[i].clone()).collect())
    }

    /// Distinct replicate labels, sorted.
    pub fn replicates(&self) -> Vec<String> {
        let mut reps: Vec<String> = self.records.iter().map(|r| r.replicate.clone()).collect();
        reps.sort();
        reps.dedup();
        reps
    }
}
