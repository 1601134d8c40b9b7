//! Input table configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the tidy table lives and which columns mean what.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InputConfig {
    /// Path to the delimited table.
    pub path: Option<PathBuf>,
    /// Dimension columns, in tensor axis order.
    pub dimensions: Vec<String>,
    /// Replicate column. Default: "replicate".
    pub replicate: Option<String>,
    /// Value column. Default: "value".
    pub value: Option<String>,
    /// Extra categorical columns carried for normalization.
    pub covariates: Vec<String>,
    /// Field delimiter. Default: ','.
    pub delimiter: Option<char>,
}

impl InputConfig {
    pub fn effective_replicate(&self) -> &str {
        self.replicate.as_deref().unwrap_or("replicate")
    }

    pub fn effective_value(&self) -> &str {
        self.value.as_deref().unwrap_or("value")
    }

    pub fn effective_delimiter(&self) -> char {
        self.delimiter.unwrap_or(',')
    }
}
