//! Normalization configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CLR_PSEUDOCOUNT, DEFAULT_TOTAL_SUM_SCALE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeMethod {
    #[default]
    Identity,
    Log1p,
    TotalSum,
    Clr,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Default: identity.
    pub method: Option<NormalizeMethod>,
    /// Categorical column defining groups for `total_sum` and `clr`.
    pub group_by: Option<String>,
    /// Added before the log in `clr`. Default: 0.5.
    pub pseudocount: Option<f64>,
    /// Target group total for `total_sum`. Default: 1e6.
    pub scale: Option<f64>,
}

impl NormalizeConfig {
    pub fn effective_method(&self) -> NormalizeMethod {
        self.method.unwrap_or_default()
    }

    pub fn effective_pseudocount(&self) -> f64 {
        self.pseudocount.unwrap_or(DEFAULT_CLR_PSEUDOCOUNT)
    }

    pub fn effective_scale(&self) -> f64 {
        self.scale.unwrap_or(DEFAULT_TOTAL_SUM_SCALE)
    }
}
