//! Bundler configuration loader.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "bundler.config.json";

/// Settings controlling archive layout and temporary storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
  /// Top-level archive directory holding files that live outside the document base.
  pub external_namespace: String,
  /// Name prefix for the temporary directories created per bundle.
  pub temp_dir_prefix: String,
  /// File name of the archive inside its temporary directory.
  pub archive_file_name: String,
  /// Deflate compression level used for archive entries.
  pub compression_level: i64,
  /// Directory in which temporary bundles are created, the system default when unset.
  pub temp_root: Option<PathBuf>,
  /// Age in seconds after which leftover bundles are removed by the sweeper.
  pub stale_after_secs: u64,
}

impl Default for BundlerConfig {
  fn default() -> Self {
    Self {
      external_namespace: "_ext".into(),
      temp_dir_prefix: "asset-bundle-".into(),
      archive_file_name: "bundle.zip".into(),
      compression_level: 5,
      temp_root: None,
      stale_after_secs: 3600,
    }
  }
}

impl BundlerConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or unparsable configuration file falls back to the defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Directory in which temporary bundles are created.
  pub fn temp_root(&self) -> PathBuf {
    self
      .temp_root
      .clone()
      .unwrap_or_else(std::env::temp_dir)
  }

  /// Age after which leftover bundles count as stale.
  pub fn stale_after(&self) -> Duration {
    Duration::from_secs(self.stale_after_secs)
  }
}
