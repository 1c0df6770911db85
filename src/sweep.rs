//! Age-based cleanup of bundle directories that were never released.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Remove entries in `temp_root` whose name starts with `prefix` and that are older than
/// `max_age`, returning how many were removed.
///
/// Entries that vanish or cannot be removed are logged and skipped. Only a failure to list
/// `temp_root` itself is reported as an error.
pub fn sweep_stale_bundles(temp_root: &Path, prefix: &str, max_age: Duration) -> io::Result<usize> {
  if prefix.is_empty() {
    return Err(io::Error::new(
      ErrorKind::InvalidInput,
      "refusing to sweep without a name prefix",
    ));
  }

  let entries = match fs::read_dir(temp_root) {
    Ok(entries) => entries,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
    Err(err) => return Err(err),
  };

  let now = SystemTime::now();
  let mut removed = 0;

  for entry in entries.flatten() {
    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      continue;
    };
    if !name.starts_with(prefix) {
      continue;
    }

    let path = entry.path();
    let Ok(metadata) = entry.metadata() else {
      continue;
    };
    let age = metadata
      .modified()
      .ok()
      .and_then(|modified| now.duration_since(modified).ok())
      .unwrap_or_default();
    if age < max_age {
      continue;
    }

    let result = if metadata.is_dir() {
      fs::remove_dir_all(&path)
    } else {
      fs::remove_file(&path)
    };

    match result {
      Ok(()) => {
        log::debug!("removed stale bundle {}", path.display());
        removed += 1;
      }
      Err(err) if err.kind() == ErrorKind::NotFound => {}
      Err(err) => log::warn!("failed to remove stale bundle {}: {err}", path.display()),
    }
  }

  Ok(removed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn removes_matching_entries_past_their_age() {
    let root = tempdir().unwrap();
    fs::create_dir_all(root.path().join("asset-bundle-abc")).unwrap();
    fs::write(root.path().join("asset-bundle-abc/bundle.zip"), b"zip").unwrap();
    fs::write(root.path().join("asset-bundle-loose.zip"), b"zip").unwrap();
    fs::write(root.path().join("unrelated.txt"), b"keep").unwrap();

    let removed = sweep_stale_bundles(root.path(), "asset-bundle-", Duration::ZERO).unwrap();

    assert_eq!(removed, 2);
    assert!(!root.path().join("asset-bundle-abc").exists());
    assert!(root.path().join("unrelated.txt").exists());
  }

  #[test]
  fn keeps_fresh_entries() {
    let root = tempdir().unwrap();
    fs::create_dir_all(root.path().join("asset-bundle-new")).unwrap();

    let removed =
      sweep_stale_bundles(root.path(), "asset-bundle-", Duration::from_secs(3600)).unwrap();

    assert_eq!(removed, 0);
    assert!(root.path().join("asset-bundle-new").exists());
  }

  #[test]
  fn missing_root_is_not_an_error() {
    let root = tempdir().unwrap();
    let missing = root.path().join("nope");
    assert_eq!(
      sweep_stale_bundles(&missing, "asset-bundle-", Duration::ZERO).unwrap(),
      0
    );
  }

  #[test]
  fn empty_prefix_is_rejected() {
    let root = tempdir().unwrap();
    assert!(sweep_stale_bundles(root.path(), "", Duration::ZERO).is_err());
  }
}
