//! Zip archive construction in a per-bundle temporary directory.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::TempDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::config::BundlerConfig;
use crate::models::{ArchiveEntry, Asset, EntrySource};

/// A produced archive together with the temporary directory that holds it.
///
/// The caller owns the temporary directory. [`BundleResult::release`] removes it once the
/// archive has been consumed. Dropping an unreleased result removes it as well.
#[derive(Debug)]
pub struct BundleResult {
  dir: TempDir,
  archive_path: PathBuf,
  main_filename: String,
  assets: Vec<Asset>,
}

impl BundleResult {
  /// Location of the zip archive on disk.
  pub fn archive_path(&self) -> &Path {
    &self.archive_path
  }

  /// Archive-internal name of the main document.
  pub fn main_filename(&self) -> &str {
    &self.main_filename
  }

  /// Assets written alongside the main document.
  pub fn assets(&self) -> &[Asset] {
    &self.assets
  }

  /// Temporary directory holding the archive.
  pub fn temp_dir(&self) -> &Path {
    self.dir.path()
  }

  /// Delete the temporary directory and everything under it.
  pub fn release(self) -> io::Result<()> {
    let path = self.dir.path().to_path_buf();
    self.dir.close()?;
    log::debug!("released bundle directory {}", path.display());
    Ok(())
  }
}

/// Write the main document and every entry into a fresh archive.
///
/// The temporary directory is removed again when any step fails, so callers either get a
/// complete bundle or an error.
pub fn write_bundle(
  config: &BundlerConfig,
  document: &str,
  main_filename: &str,
  entries: &[ArchiveEntry],
  assets: Vec<Asset>,
) -> Result<BundleResult> {
  let temp_root = config.temp_root();
  let dir = tempfile::Builder::new()
    .prefix(&config.temp_dir_prefix)
    .tempdir_in(&temp_root)
    .with_context(|| format!("failed to create bundle directory in {}", temp_root.display()))?;

  let archive_path = dir.path().join(&config.archive_file_name);
  write_archive(
    &archive_path,
    config.compression_level,
    document,
    main_filename,
    entries,
  )?;

  log::debug!(
    "wrote {} with {} entries",
    archive_path.display(),
    entries.len() + 1
  );

  Ok(BundleResult {
    dir,
    archive_path,
    main_filename: main_filename.to_string(),
    assets,
  })
}

fn write_archive(
  archive_path: &Path,
  compression_level: i64,
  document: &str,
  main_filename: &str,
  entries: &[ArchiveEntry],
) -> Result<()> {
  let file = File::create(archive_path)
    .with_context(|| format!("failed to create {}", archive_path.display()))?;
  let mut zip = zip::ZipWriter::new(BufWriter::new(file));
  let options = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .compression_level(Some(compression_level));

  let mut names = BTreeSet::new();
  names.insert(main_filename.to_string());
  zip
    .start_file(main_filename, options)
    .with_context(|| format!("failed to add {main_filename} to archive"))?;
  zip.write_all(document.as_bytes())?;

  for entry in entries {
    if !names.insert(entry.archive_path.clone()) {
      bail!("duplicate archive entry {}", entry.archive_path);
    }

    zip
      .start_file(entry.archive_path.as_str(), options)
      .with_context(|| format!("failed to add {} to archive", entry.archive_path))?;

    match &entry.source {
      EntrySource::File(path) => {
        let mut source =
          File::open(path).with_context(|| format!("failed to read {}", path.display()))?;
        io::copy(&mut source, &mut zip)
          .with_context(|| format!("failed to copy {} into archive", path.display()))?;
      }
      EntrySource::Rewritten(content) => {
        zip.write_all(content.as_bytes())?;
      }
    }
  }

  let mut writer = zip
    .finish()
    .with_context(|| format!("failed to finalise {}", archive_path.display()))?;
  writer.flush()?;
  Ok(())
}

/// Copy a finished archive to a destination outside the temporary directory.
pub fn copy_archive(bundle: &BundleResult, destination: &Path) -> Result<u64> {
  if let Some(parent) = destination.parent() {
    if !parent.as_os_str().is_empty() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
  }
  fs::copy(bundle.archive_path(), destination).with_context(|| {
    format!(
      "failed to copy {} to {}",
      bundle.archive_path().display(),
      destination.display()
    )
  })
}
