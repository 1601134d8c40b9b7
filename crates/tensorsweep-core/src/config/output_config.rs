//! Output locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory. Default: "tensorsweep-out".
    pub dir: Option<PathBuf>,
    /// Archive file name inside `dir`. Default: "model.json".
    pub archive: Option<String>,
    /// Fit cache file name inside `dir`. Default: "fits.db".
    pub cache: Option<String>,
    /// Enable the persistent fit cache. Default: true.
    pub use_cache: Option<bool>,
}

impl OutputConfig {
    pub fn effective_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("tensorsweep-out"))
    }

    pub fn archive_path(&self) -> PathBuf {
        self.effective_dir()
            .join(self.archive.as_deref().unwrap_or("model.json"))
    }

    /// Cache database path, or `None` when the cache is disabled.
    pub fn cache_path(&self) -> Option<PathBuf> {
        if self.use_cache.unwrap_or(true) {
            Some(
                self.effective_dir()
                    .join(self.cache.as_deref().unwrap_or("fits.db")),
            )
        } else {
            None
        }
    }
}
