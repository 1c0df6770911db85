//! Assignment of archive paths to resolved assets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::asset_paths::{relative_to, suffixed_file_name, to_archive_path};
use crate::models::{Asset, ResolvedReference};

/// Per-operation archive path assigner.
///
/// Files underneath the document base keep their relative layout. Anything else lands in the
/// external namespace under its base name, suffixed with a counter when that name is taken.
#[derive(Debug)]
pub struct ArchiveLayout {
  base_dir: PathBuf,
  external_namespace: String,
  taken: BTreeSet<String>,
  external_counter: usize,
}

impl ArchiveLayout {
  /// Create a layout rooted at the canonical document base directory.
  pub fn new(base_dir: impl Into<PathBuf>, external_namespace: &str) -> Self {
    Self {
      base_dir: base_dir.into(),
      external_namespace: external_namespace.trim_matches('/').to_string(),
      taken: BTreeSet::new(),
      external_counter: 0,
    }
  }

  /// Reserve an archive path that is not backed by an asset, such as the main document.
  pub fn reserve(&mut self, archive_path: &str) {
    self.taken.insert(archive_path.to_string());
  }

  /// Compute archive paths for every resolved reference of the operation, keeping input order.
  ///
  /// Base-relative paths are recorded before any external name is chosen, so the external
  /// counter skips names a file under the base directory already occupies.
  pub fn assign(&mut self, resolved: Vec<ResolvedReference>) -> Vec<Asset> {
    let relative: Vec<Option<String>> = resolved
      .iter()
      .map(|reference| {
        relative_to(&self.base_dir, &reference.disk_path).map(|path| to_archive_path(&path))
      })
      .collect();
    self.taken.extend(relative.iter().flatten().cloned());

    resolved
      .into_iter()
      .zip(relative)
      .map(|(reference, relative)| {
        let archive_path = match relative {
          Some(path) => path,
          None => {
            let path = self.external_path(&reference.disk_path);
            self.taken.insert(path.clone());
            path
          }
        };
        Asset {
          original_ref: reference.original_ref,
          disk_path: reference.disk_path,
          archive_path,
        }
      })
      .collect()
  }

  fn external_path(&mut self, disk_path: &Path) -> String {
    let file_name = disk_path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "asset".to_string());

    let mut candidate = self.namespaced(&file_name);
    while self.taken.contains(&candidate) {
      self.external_counter += 1;
      candidate = self.namespaced(&suffixed_file_name(&file_name, self.external_counter));
    }
    candidate
  }

  fn namespaced(&self, file_name: &str) -> String {
    if self.external_namespace.is_empty() {
      file_name.to_string()
    } else {
      format!("{}/{}", self.external_namespace, file_name)
    }
  }
}
