//! SweepErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this to provide a structured error code
/// string for log filtering and process exit reporting.
pub trait SweepErrorCode {
    /// Returns the error code string (e.g., "SCHEMA_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted report string: `[ERROR_CODE] message`.
    fn report_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCHEMA_ERROR: &str = "SCHEMA_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const NORMALIZATION_ERROR: &str = "NORMALIZATION_ERROR";
pub const MISSING_AXIS: &str = "MISSING_AXIS";
pub const ASSEMBLY_ERROR: &str = "ASSEMBLY_ERROR";
pub const FIT_ERROR: &str = "FIT_ERROR";
pub const WRITE_ERROR: &str = "WRITE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const CANCELLED: &str = "CANCELLED";
