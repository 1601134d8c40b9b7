//! Temp-file-and-rename writes.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tensorsweep_core::errors::WriteError;

/// Write `bytes` to `path` atomically. Creates missing parent directories.
///
/// The temporary file lives in the destination directory so the final
/// rename never crosses a filesystem. On any failure the temporary file is
/// removed and `path` is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<u64, WriteError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| WriteError::CreateDir {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let io_err = |e: std::io::Error| WriteError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(bytes.len() as u64)
}
