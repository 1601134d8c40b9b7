//! Normalization boundary: `normalize(values, covariates) -> values`.

use crate::errors::NormalizationError;

/// Named categorical columns aligned with the values being normalized.
#[derive(Debug, Clone, Default)]
pub struct Covariates {
    columns: Vec<(String, Vec<String>)>,
}

impl Covariates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. Its length must match the values passed to `normalize`.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.columns.push((name.into(), values));
        self
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }
}

/// A stateless numeric transform over one value column.
///
/// Implementations must return exactly one output per input, in order.
pub trait Normalizer: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    fn normalize(
        &self,
        values: &[f64],
        covariates: &Covariates,
    ) -> Result<Vec<f64>, NormalizationError>;
}
