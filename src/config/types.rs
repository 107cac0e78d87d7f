use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::records::Probes;

/// Settings persisted in `config.toml`.
///
/// Config keys (TOML): `records_dir`, `bind_addr`, `[probes]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Directory holding the snapshot files. Relative paths are resolved
    /// against the working directory once, at startup.
    #[serde(default = "default_records_dir")]
    pub records_dir: PathBuf,
    /// Socket address the HTTP view listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub probes: Probes,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            records_dir: default_records_dir(),
            bind_addr: default_bind_addr(),
            probes: Probes::default(),
        }
    }
}

impl AppSettings {
    /// Anchor a relative `records_dir` to `base` and trim the bind address.
    pub fn resolved(mut self, base: &Path) -> Self {
        if self.records_dir.is_relative() {
            self.records_dir = base.join(&self.records_dir);
        }
        self.bind_addr = self.bind_addr.trim().to_string();
        if self.bind_addr.is_empty() {
            self.bind_addr = default_bind_addr();
        }
        self
    }
}

pub(super) fn default_records_dir() -> PathBuf {
    PathBuf::from("Records")
}

pub(super) fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}
