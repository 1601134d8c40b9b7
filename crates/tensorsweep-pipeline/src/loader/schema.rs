//! Declared column layout of a tidy table.

use tensorsweep_core::config::InputConfig;
use tensorsweep_core::errors::SchemaError;

/// Which columns of the input hold dimensions, replicate, value and covariates.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub dimensions: Vec<String>,
    pub replicate: String,
    pub value: String,
    pub covariates: Vec<String>,
    pub delimiter: char,
}

impl TableSchema {
    pub fn new(dimensions: &[&str], replicate: &str, value: &str) -> Self {
        Self {
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            replicate: replicate.to_string(),
            value: value.to_string(),
            covariates: Vec::new(),
            delimiter: ',',
        }
    }

    pub fn with_covariates(mut self, covariates: &[&str]) -> Self {
        self.covariates = covariates.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn from_config(input: &InputConfig) -> Self {
        Self {
            dimensions: input.dimensions.clone(),
            replicate: input.effective_replicate().to_string(),
            value: input.effective_value().to_string(),
            covariates: input.covariates.clone(),
            delimiter: input.effective_delimiter(),
        }
    }

    /// Every declared column, in declaration order.
    pub fn declared_columns(&self) -> impl Iterator<Item = &str> {
        self.dimensions
            .iter()
            .chain(std::iter::once(&self.replicate))
            .chain(std::iter::once(&self.value))
            .chain(self.covariates.iter())
            .map(String::as_str)
    }

    /// Reject schemas that could never load: no dimensions, a column
    /// declared twice, or a multi-byte delimiter.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.dimensions.is_empty() {
            return Err(SchemaError::NoDimensions);
        }
        let columns: Vec<&str> = self.declared_columns().collect();
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(SchemaError::DuplicateColumn {
                    column: column.to_string(),
                });
            }
        }
        if !self.delimiter.is_ascii() {
            return Err(SchemaError::InvalidDelimiter {
                delimiter: self.delimiter,
            });
        }
        Ok(())
    }
}
