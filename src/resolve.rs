//! Resolution of extracted references against the filesystem.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::ResolvedReference;

/// Canonical disk paths already claimed during one bundling operation.
///
/// A fresh registry is created per call and threaded through every resolution step so that
/// a file reached through two syntaxes (a tag and a stylesheet rule, say) is bundled once.
#[derive(Debug, Default, Clone)]
pub struct ClaimedPaths {
  paths: BTreeSet<PathBuf>,
}

impl ClaimedPaths {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a path, returning `false` when it was already claimed.
  pub fn claim(&mut self, path: &Path) -> bool {
    if self.contains(path) {
      return false;
    }
    self.paths.insert(path.to_path_buf())
  }

  /// Whether the path has been claimed.
  pub fn contains(&self, path: &Path) -> bool {
    self.paths.contains(path)
  }
}

/// Resolve references against `base_dir`, keeping only those naming existing regular files.
///
/// Missing files, directories and paths already present in `claimed` are dropped without an
/// error. Accepted paths are claimed immediately, so the first reference in iteration order
/// wins when several point at the same file.
pub fn resolve_references<'a, I>(
  references: I,
  base_dir: &Path,
  claimed: &mut ClaimedPaths,
) -> Vec<ResolvedReference>
where
  I: IntoIterator<Item = &'a String>,
{
  let mut resolved = Vec::new();

  for reference in references {
    let Some(disk_path) = resolve_reference(base_dir, reference) else {
      log::debug!(
        "skipping unresolved reference {reference:?} relative to {}",
        base_dir.display()
      );
      continue;
    };

    if !claimed.claim(&disk_path) {
      log::debug!("skipping {reference:?}, {} already bundled", disk_path.display());
      continue;
    }

    resolved.push(ResolvedReference {
      original_ref: reference.clone(),
      disk_path,
    });
  }

  resolved
}

/// Canonical path of the regular file a reference names, if any.
///
/// Relative references are joined to `base_dir`; absolute ones replace it.
pub fn resolve_reference(base_dir: &Path, reference: &str) -> Option<PathBuf> {
  let candidate = base_dir.join(reference);
  let metadata = fs::metadata(&candidate).ok()?;
  if !metadata.is_file() {
    return None;
  }
  fs::canonicalize(&candidate).ok()
}
