//! Data structures produced while bundling a document with its local assets.

use std::path::PathBuf;

use serde::Serialize;

/// A reference that resolved to an existing file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
  /// Reference exactly as it appeared in the source text.
  pub original_ref: String,
  /// Canonical absolute path of the referenced file.
  pub disk_path: PathBuf,
}

/// A local file scheduled for inclusion in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
  /// Reference exactly as it appeared in the source text, used for verbatim rewriting.
  pub original_ref: String,
  /// Canonical absolute path of the file on disk.
  pub disk_path: PathBuf,
  /// Destination of the file inside the archive, always using forward slashes.
  pub archive_path: String,
}

/// Bytes to write for one archive entry.
#[derive(Debug, Clone)]
pub enum EntrySource {
  /// Copy the file verbatim from disk.
  File(PathBuf),
  /// Write rewritten content in place of the file on disk.
  Rewritten(String),
}

/// One entry of the archive produced for a bundle.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
  /// Entry name inside the archive.
  pub archive_path: String,
  /// Where the entry's bytes come from.
  pub source: EntrySource,
}

impl ArchiveEntry {
  /// Entry for an asset, preferring rewritten content when present.
  pub fn for_asset(asset: &Asset, rewritten: Option<String>) -> Self {
    let source = match rewritten {
      Some(content) => EntrySource::Rewritten(content),
      None => EntrySource::File(asset.disk_path.clone()),
    };
    Self {
      archive_path: asset.archive_path.clone(),
      source,
    }
  }
}
