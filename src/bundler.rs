//! Bundling orchestrator: extract, resolve, remap, rewrite and archive.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::archive::{BundleResult, write_bundle};
use crate::asset_paths::{archive_dir, to_archive_path};
use crate::config::BundlerConfig;
use crate::extract::{extract_css_references, extract_html_references};
use crate::models::{ArchiveEntry, Asset, ResolvedReference};
use crate::remap::ArchiveLayout;
use crate::resolve::{ClaimedPaths, resolve_reference, resolve_references};
use crate::rewrite::rewrite_references;

/// Bundle a document with the default configuration.
///
/// See [`AssetBundler::bundle`].
pub fn bundle_assets(
  html: &str,
  base_dir: &Path,
  main_filename: &str,
) -> Result<Option<BundleResult>> {
  AssetBundler::default().bundle(html, base_dir, main_filename)
}

/// Packages an HTML document and the local files it references into a zip archive.
#[derive(Debug, Clone, Default)]
pub struct AssetBundler {
  config: BundlerConfig,
}

struct Stylesheet {
  disk_path: PathBuf,
  content: String,
  references: BTreeSet<String>,
}

impl AssetBundler {
  /// Create a bundler using the provided configuration.
  pub fn new(config: BundlerConfig) -> Self {
    Self { config }
  }

  /// Bundle `html` and its local assets, resolving references against `base_dir`.
  ///
  /// Returns `Ok(None)` when the document references no existing local file, in which case
  /// nothing is written. Unresolvable references are skipped. Stylesheets are scanned for
  /// further `url(...)` references, including stylesheets reached from other stylesheets.
  pub fn bundle(
    &self,
    html: &str,
    base_dir: &Path,
    main_filename: &str,
  ) -> Result<Option<BundleResult>> {
    let references = extract_html_references(html);
    if references.is_empty() {
      log::debug!("no local references found, skipping bundling");
      return Ok(None);
    }

    let base_dir = canonical_base_dir(base_dir)?;
    let main_filename = archive_main_filename(main_filename)?;

    let mut claimed = ClaimedPaths::new();
    let mut resolved = resolve_references(&references, &base_dir, &mut claimed);
    if resolved.is_empty() {
      log::debug!("none of {} local references resolved, skipping bundling", references.len());
      return Ok(None);
    }

    let stylesheets = discover_stylesheet_assets(&mut resolved, &mut claimed);

    let mut layout = ArchiveLayout::new(base_dir.clone(), &self.config.external_namespace);
    layout.reserve(&main_filename);
    let mut assets = layout.assign(resolved);
    assets.retain(|asset| {
      let is_document = asset.archive_path == main_filename;
      if is_document {
        log::debug!("{} is the main document, not bundling it twice", asset.disk_path.display());
      }
      !is_document
    });
    if assets.is_empty() {
      return Ok(None);
    }

    let assigned: BTreeMap<PathBuf, String> = assets
      .iter()
      .map(|asset| (asset.disk_path.clone(), asset.archive_path.clone()))
      .collect();

    let mut rewrites: BTreeMap<PathBuf, String> = BTreeMap::new();
    for sheet in stylesheets {
      let (Some(sheet_dir), Some(sheet_archive_path)) =
        (sheet.disk_path.parent(), assigned.get(&sheet.disk_path))
      else {
        continue;
      };
      let targets = rewrite_targets(&sheet.references, sheet_dir, &assigned);
      let rewritten = rewrite_references(&sheet.content, &targets, archive_dir(sheet_archive_path));
      if rewritten != sheet.content {
        rewrites.insert(sheet.disk_path, rewritten);
      }
    }

    let targets = rewrite_targets(&references, &base_dir, &assigned);
    let document = rewrite_references(html, &targets, archive_dir(&main_filename));

    let entries: Vec<ArchiveEntry> = assets
      .iter()
      .map(|asset| ArchiveEntry::for_asset(asset, rewrites.remove(&asset.disk_path)))
      .collect();

    log::info!(
      "bundling {} with {} local assets from {}",
      main_filename,
      assets.len(),
      base_dir.display()
    );

    write_bundle(&self.config, &document, &main_filename, &entries, assets).map(Some)
  }
}

/// Scan stylesheet references for sub-references, appending newly resolved files to `resolved`.
///
/// Stylesheets that cannot be read as UTF-8 are still bundled, only their sub-references are
/// not followed.
fn discover_stylesheet_assets(
  resolved: &mut Vec<ResolvedReference>,
  claimed: &mut ClaimedPaths,
) -> Vec<Stylesheet> {
  let mut pending: VecDeque<PathBuf> = resolved
    .iter()
    .map(|reference| reference.disk_path.clone())
    .filter(|path| is_stylesheet(path))
    .collect();
  let mut stylesheets = Vec::new();

  while let Some(disk_path) = pending.pop_front() {
    let content = match fs::read_to_string(&disk_path) {
      Ok(content) => content,
      Err(err) => {
        log::debug!("skipping sub-assets of {}: {err}", disk_path.display());
        continue;
      }
    };

    let references = extract_css_references(&content);
    if references.is_empty() {
      continue;
    }

    let Some(sheet_dir) = disk_path.parent() else {
      continue;
    };
    for sub_reference in resolve_references(&references, sheet_dir, claimed) {
      if is_stylesheet(&sub_reference.disk_path) {
        pending.push_back(sub_reference.disk_path.clone());
      }
      resolved.push(sub_reference);
    }

    stylesheets.push(Stylesheet {
      disk_path,
      content,
      references,
    });
  }

  stylesheets
}

/// Map every reference in a file to the archive path of the asset it resolves to.
///
/// This covers references that lost the race for a shared file as well, so each spelling of
/// a reference is rewritten to the single bundled copy.
fn rewrite_targets(
  references: &BTreeSet<String>,
  base_dir: &Path,
  assigned: &BTreeMap<PathBuf, String>,
) -> Vec<Asset> {
  references
    .iter()
    .filter_map(|reference| {
      let disk_path = resolve_reference(base_dir, reference)?;
      let archive_path = assigned.get(&disk_path)?.clone();
      Some(Asset {
        original_ref: reference.clone(),
        disk_path,
        archive_path,
      })
    })
    .collect()
}

fn is_stylesheet(path: &Path) -> bool {
  path
    .extension()
    .is_some_and(|extension| extension.eq_ignore_ascii_case("css"))
}

fn canonical_base_dir(base_dir: &Path) -> Result<PathBuf> {
  match fs::canonicalize(base_dir) {
    Ok(path) => Ok(path),
    Err(_) => std::path::absolute(base_dir)
      .with_context(|| format!("failed to resolve base directory {}", base_dir.display())),
  }
}

fn archive_main_filename(main_filename: &str) -> Result<String> {
  let name = to_archive_path(Path::new(main_filename.trim()));
  if name.is_empty() {
    bail!("invalid main document name {main_filename:?}");
  }
  Ok(name)
}
