//! Configuration system for tensorsweep.
//! TOML-based, layered resolution: CLI > env > config file > defaults.

pub mod grid_config;
pub mod input_config;
pub mod normalize_config;
pub mod output_config;
pub mod params_config;
pub mod run_config;
pub mod sweep_config;
pub mod tensor_config;

pub use grid_config::GridConfig;
pub use input_config::InputConfig;
pub use normalize_config::{NormalizeConfig, NormalizeMethod};
pub use output_config::OutputConfig;
pub use params_config::ParamsConfig;
pub use run_config::RunConfig;
pub use sweep_config::{CliOverrides, SweepConfig};
pub use tensor_config::{FillKind, FillPolicy, LabelOrder, Reduction, TensorConfig};
