//! Workspace-wide constants.

/// Tool name recorded in archives.
pub const TOOL_NAME: &str = "tensorsweep";

/// Tool version embedded in archives.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Archive format version. Bump on any incompatible layout change.
pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

/// Project config file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "tensorsweep.toml";

/// Per-fit metrics table written next to the archive.
pub const FIT_TABLE_FILE: &str = "fitting_data.csv";

/// Replicate cross-validation table written next to the archive.
pub const CV_TABLE_FILE: &str = "cv_data.csv";

/// Default master seed.
pub const DEFAULT_SEED: u64 = 9481;

/// Default convergence tolerance on relative loss change.
pub const DEFAULT_TOL: f64 = 1e-5;

/// Default iteration cap per initialization.
pub const DEFAULT_N_ITER_MAX: usize = 1000;

/// Default number of random initializations per fit.
pub const DEFAULT_N_INITIALIZATIONS: usize = 3;

/// Default scale applied by total-sum normalization (counts per million).
pub const DEFAULT_TOTAL_SUM_SCALE: f64 = 1e6;

/// Default pseudocount for centered log-ratio normalization.
pub const DEFAULT_CLR_PSEUDOCOUNT: f64 = 0.5;
