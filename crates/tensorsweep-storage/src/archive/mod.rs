//! Result Archiver: one self-describing JSON file per chosen fit.

mod atomic;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tensorsweep_core::constants::{ARCHIVE_FORMAT_VERSION, TOOL_NAME, TOOL_VERSION};
use tensorsweep_core::errors::WriteError;
use tensorsweep_core::types::{Axis, FitResult, LabeledTensor};

pub use atomic::write_atomic;

/// Where a fit came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub tool: String,
    pub tool_version: String,
    pub created_at: DateTime<Utc>,
    /// Input table the tensor was assembled from.
    pub input: Option<PathBuf>,
    /// Axis names and labels of the fitted tensor, in mode order.
    pub axes: Vec<Axis>,
    pub shape: Vec<usize>,
}

impl Provenance {
    /// Provenance for a fit of `tensor`, stamped now.
    pub fn for_tensor(tensor: &LabeledTensor, input: Option<&Path>) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            tool_version: TOOL_VERSION.to_string(),
            created_at: Utc::now(),
            input: input.map(Path::to_path_buf),
            axes: tensor.axes().to_vec(),
            shape: tensor.shape(),
        }
    }
}

/// On-disk archive layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub format_version: u32,
    pub provenance: Provenance,
    pub result: FitResult,
}

impl Archive {
    pub fn new(result: FitResult, provenance: Provenance) -> Self {
        Self {
            format_version: ARCHIVE_FORMAT_VERSION,
            provenance,
            result,
        }
    }
}

/// Serialize `archive` to pretty JSON and write it atomically to `path`.
/// Returns the number of bytes written.
pub fn write_archive(path: &Path, archive: &Archive) -> Result<u64, WriteError> {
    let json = serde_json::to_vec_pretty(archive).map_err(|e| WriteError::Serialize {
        artifact: path.display().to_string(),
        message: e.to_string(),
    })?;
    let bytes = write_atomic(path, &json)?;
    tracing::info!(
        path = %path.display(),
        bytes,
        config = %archive.result.label(),
        "wrote archive"
    );
    Ok(bytes)
}

/// Read an archive back, rejecting other format versions.
pub fn load_archive(path: &Path) -> Result<Archive, WriteError> {
    let read_err = |message: String| WriteError::Read {
        path: path.display().to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| read_err(e.to_string()))?;

    #[derive(Deserialize)]
    struct Header {
        format_version: u32,
    }
    let header: Header = serde_json::from_str(&content).map_err(|e| read_err(e.to_string()))?;
    if header.format_version != ARCHIVE_FORMAT_VERSION {
        return Err(WriteError::UnsupportedVersion {
            path: path.display().to_string(),
            found: header.format_version,
            expected: ARCHIVE_FORMAT_VERSION,
        });
    }
    serde_json::from_str(&content).map_err(|e| read_err(e.to_string()))
}
