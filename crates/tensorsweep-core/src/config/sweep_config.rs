//! Top-level tensorsweep configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    GridConfig, InputConfig, NormalizeConfig, NormalizeMethod, OutputConfig, ParamsConfig,
    RunConfig, TensorConfig,
};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`TENSORSWEEP_*`)
/// 3. Config file (explicit path, or `tensorsweep.toml` in the working root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SweepConfig {
    pub input: InputConfig,
    pub normalize: NormalizeConfig,
    pub tensor: TensorConfig,
    pub grid: GridConfig,
    pub params: ParamsConfig,
    pub sweep: RunConfig,
    pub output: OutputConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub max_workers: Option<usize>,
    pub n_bootstraps: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub no_cache: bool,
}

impl SweepConfig {
    /// Load configuration with layered resolution.
    ///
    /// `explicit` must exist when given; otherwise `root/tensorsweep.toml`
    /// is used if present.
    pub fn load(
        root: &Path,
        explicit: Option<&Path>,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 3: config file
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::merge_toml_file(&mut config, path)?;
            }
            None => {
                let project_config_path = root.join(PROJECT_CONFIG_FILE);
                if project_config_path.exists() {
                    Self::merge_toml_file(&mut config, &project_config_path)?;
                }
            }
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &SweepConfig) -> Result<(), ConfigError> {
        let dims = &config.input.dimensions;
        for (i, d) in dims.iter().enumerate() {
            if dims[..i].contains(d) {
                return Err(invalid("input.dimensions", format!("'{d}' is listed twice")));
            }
        }
        if config.grid.ranks.iter().any(|&r| r == 0) {
            return Err(invalid("grid.ranks", "ranks must be greater than 0"));
        }
        for lambdas in &config.grid.lambdas {
            if !dims.is_empty() && lambdas.len() != dims.len() {
                return Err(invalid(
                    "grid.lambdas",
                    format!(
                        "each lambda vector needs {} entries (one per dimension), got {}",
                        dims.len(),
                        lambdas.len()
                    ),
                ));
            }
            if lambdas.iter().any(|l| !l.is_finite() || *l < 0.0) {
                return Err(invalid("grid.lambdas", "lambdas must be finite and >= 0"));
            }
        }
        if let Some(ref modes) = config.params.nonneg_modes {
            if !dims.is_empty() && modes.iter().any(|&m| m >= dims.len()) {
                return Err(invalid(
                    "params.nonneg_modes",
                    format!("modes must be below {}", dims.len()),
                ));
            }
        }
        if let Some(tol) = config.params.tol {
            if !(tol > 0.0) {
                return Err(invalid("params.tol", "must be greater than 0"));
            }
        }
        if config.params.n_iter_max == Some(0) {
            return Err(invalid("params.n_iter_max", "must be greater than 0"));
        }
        if config.params.n_initializations == Some(0) {
            return Err(invalid("params.n_initializations", "must be greater than 0"));
        }
        if config.sweep.max_workers == Some(0) {
            return Err(invalid("sweep.max_workers", "must be greater than 0"));
        }
        match config.sweep.cv_rounds {
            Some(0) => return Err(invalid("sweep.cv_rounds", "must be greater than 0")),
            Some(n) if n > 1 && config.sweep.shuffle_replicates_by.is_none() => {
                return Err(invalid(
                    "sweep.cv_rounds",
                    "more than one round requires sweep.shuffle_replicates_by",
                ));
            }
            _ => {}
        }
        if let Some(p) = config.normalize.pseudocount {
            if !(p > 0.0) {
                return Err(invalid("normalize.pseudocount", "must be greater than 0"));
            }
        }
        if let Some(s) = config.normalize.scale {
            if !(s > 0.0) {
                return Err(invalid("normalize.scale", "must be greater than 0"));
            }
        }
        if matches!(
            config.normalize.method,
            Some(NormalizeMethod::TotalSum | NormalizeMethod::Clr)
        ) && config.normalize.group_by.is_none()
        {
            return Err(invalid(
                "normalize.group_by",
                "required for total_sum and clr normalization",
            ));
        }
        Ok(())
    }

    /// Check the fields a pipeline run cannot do without.
    pub fn require_input(&self) -> Result<&Path, ConfigError> {
        if self.input.dimensions.is_empty() {
            return Err(ConfigError::MissingField {
                field: "input.dimensions".to_string(),
            });
        }
        self.input
            .path
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField {
                field: "input.path".to_string(),
            })
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut SweepConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: SweepConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` (or non-empty) value.
    fn merge(base: &mut SweepConfig, other: &SweepConfig) {
        // Input
        if other.input.path.is_some() {
            base.input.path = other.input.path.clone();
        }
        if !other.input.dimensions.is_empty() {
            base.input.dimensions = other.input.dimensions.clone();
        }
        if other.input.replicate.is_some() {
            base.input.replicate = other.input.replicate.clone();
        }
        if other.input.value.is_some() {
            base.input.value = other.input.value.clone();
        }
        if !other.input.covariates.is_empty() {
            base.input.covariates = other.input.covariates.clone();
        }
        if other.input.delimiter.is_some() {
            base.input.delimiter = other.input.delimiter;
        }

        // Normalize
        if other.normalize.method.is_some() {
            base.normalize.method = other.normalize.method;
        }
        if other.normalize.group_by.is_some() {
            base.normalize.group_by = other.normalize.group_by.clone();
        }
        if other.normalize.pseudocount.is_some() {
            base.normalize.pseudocount = other.normalize.pseudocount;
        }
        if other.normalize.scale.is_some() {
            base.normalize.scale = other.normalize.scale;
        }

        // Tensor
        if other.tensor.fill.is_some() {
            base.tensor.fill = other.tensor.fill;
        }
        if other.tensor.fill_value.is_some() {
            base.tensor.fill_value = other.tensor.fill_value;
        }
        if other.tensor.reduction.is_some() {
            base.tensor.reduction = other.tensor.reduction;
        }
        if other.tensor.label_order.is_some() {
            base.tensor.label_order = other.tensor.label_order;
        }

        // Grid
        if !other.grid.ranks.is_empty() {
            base.grid.ranks = other.grid.ranks.clone();
        }
        if !other.grid.lambdas.is_empty() {
            base.grid.lambdas = other.grid.lambdas.clone();
        }

        // Params
        if other.params.nonneg_modes.is_some() {
            base.params.nonneg_modes = other.params.nonneg_modes.clone();
        }
        if other.params.tol.is_some() {
            base.params.tol = other.params.tol;
        }
        if other.params.n_iter_max.is_some() {
            base.params.n_iter_max = other.params.n_iter_max;
        }
        if other.params.n_initializations.is_some() {
            base.params.n_initializations = other.params.n_initializations;
        }

        // Sweep
        if other.sweep.seed.is_some() {
            base.sweep.seed = other.sweep.seed;
        }
        if other.sweep.n_bootstraps.is_some() {
            base.sweep.n_bootstraps = other.sweep.n_bootstraps;
        }
        if other.sweep.max_workers.is_some() {
            base.sweep.max_workers = other.sweep.max_workers;
        }
        if other.sweep.cross_validate.is_some() {
            base.sweep.cross_validate = other.sweep.cross_validate;
        }
        if other.sweep.shuffle_replicates_by.is_some() {
            base.sweep.shuffle_replicates_by = other.sweep.shuffle_replicates_by.clone();
        }
        if other.sweep.cv_rounds.is_some() {
            base.sweep.cv_rounds = other.sweep.cv_rounds;
        }

        // Output
        if other.output.dir.is_some() {
            base.output.dir = other.output.dir.clone();
        }
        if other.output.archive.is_some() {
            base.output.archive = other.output.archive.clone();
        }
        if other.output.cache.is_some() {
            base.output.cache = other.output.cache.clone();
        }
        if other.output.use_cache.is_some() {
            base.output.use_cache = other.output.use_cache;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `TENSORSWEEP_SWEEP_SEED`, `TENSORSWEEP_PARAMS_TOL`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut SweepConfig) {
        if let Ok(val) = std::env::var("TENSORSWEEP_SWEEP_SEED") {
            if let Ok(v) = val.parse::<u64>() {
                config.sweep.seed = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TENSORSWEEP_SWEEP_MAX_WORKERS") {
            if let Ok(v) = val.parse::<usize>() {
                config.sweep.max_workers = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TENSORSWEEP_SWEEP_N_BOOTSTRAPS") {
            if let Ok(v) = val.parse::<usize>() {
                config.sweep.n_bootstraps = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TENSORSWEEP_SWEEP_CV_ROUNDS") {
            if let Ok(v) = val.parse::<usize>() {
                config.sweep.cv_rounds = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TENSORSWEEP_PARAMS_N_ITER_MAX") {
            if let Ok(v) = val.parse::<usize>() {
                config.params.n_iter_max = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TENSORSWEEP_PARAMS_TOL") {
            if let Ok(v) = val.parse::<f64>() {
                config.params.tol = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TENSORSWEEP_OUTPUT_DIR") {
            config.output.dir = Some(PathBuf::from(val));
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut SweepConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.input_path {
            config.input.path = Some(v.clone());
        }
        if let Some(v) = cli.seed {
            config.sweep.seed = Some(v);
        }
        if let Some(v) = cli.max_workers {
            config.sweep.max_workers = Some(v);
        }
        if let Some(v) = cli.n_bootstraps {
            config.sweep.n_bootstraps = Some(v);
        }
        if let Some(ref v) = cli.output_dir {
            config.output.dir = Some(v.clone());
        }
        if cli.no_cache {
            config.output.use_cache = Some(false);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.into(),
    }
}
