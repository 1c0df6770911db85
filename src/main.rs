//! Command line front end for bundling HTML documents with their local assets.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use local_asset_bundler::archive::copy_archive;
use local_asset_bundler::sweep::sweep_stale_bundles;
use local_asset_bundler::{AssetBundler, BundleResult, BundlerConfig};

#[derive(Parser, Debug)]
#[command(name = "local-asset-bundler", version, about)]
struct Cli {
  /// Configuration file, `bundler.config.json` in the working directory by default.
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Bundle an HTML document and the local files it references into a zip archive.
  Bundle {
    /// HTML document to bundle.
    html: PathBuf,
    /// Directory used to resolve relative references, the document's directory by default.
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// Name of the document inside the archive, the document's file name by default.
    #[arg(long)]
    main_filename: Option<String>,
    /// Where to write the archive.
    #[arg(long, short)]
    output: PathBuf,
    /// Print the bundled assets as JSON.
    #[arg(long)]
    json: bool,
  },
  /// Remove leftover bundle directories from the temporary directory.
  Sweep {
    /// Minimum age in seconds, the configured `stale_after_secs` by default.
    #[arg(long)]
    max_age_secs: Option<u64>,
  },
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  let config = match &cli.config {
    Some(path) => BundlerConfig::from_path(path)
      .with_context(|| format!("failed to load configuration from {}", path.display()))?,
    None => BundlerConfig::discover(&std::env::current_dir()?),
  };

  match cli.command {
    Command::Bundle {
      html,
      base_dir,
      main_filename,
      output,
      json,
    } => run_bundle(config, &html, base_dir, main_filename, &output, json),
    Command::Sweep { max_age_secs } => {
      let max_age = max_age_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.stale_after());
      let temp_root = config.temp_root();
      let removed = sweep_stale_bundles(&temp_root, &config.temp_dir_prefix, max_age)
        .with_context(|| format!("failed to sweep {}", temp_root.display()))?;
      println!("removed {removed} stale bundle(s) from {}", temp_root.display());
      Ok(())
    }
  }
}

fn run_bundle(
  config: BundlerConfig,
  html_path: &Path,
  base_dir: Option<PathBuf>,
  main_filename: Option<String>,
  output: &Path,
  json: bool,
) -> Result<()> {
  let html = fs::read_to_string(html_path)
    .with_context(|| format!("failed to read {}", html_path.display()))?;

  let base_dir = base_dir.unwrap_or_else(|| {
    html_path
      .parent()
      .filter(|parent| !parent.as_os_str().is_empty())
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from("."))
  });
  let main_filename = main_filename.unwrap_or_else(|| {
    html_path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "index.html".to_string())
  });

  let bundler = AssetBundler::new(config);
  let Some(bundle) = bundler.bundle(&html, &base_dir, &main_filename)? else {
    println!("no local assets referenced by {}", html_path.display());
    return Ok(());
  };

  let outcome = copy_archive(&bundle, output).and_then(|_| report(&bundle, output, json));

  bundle
    .release()
    .context("failed to remove temporary bundle directory")?;
  outcome
}

fn report(bundle: &BundleResult, output: &Path, json: bool) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(bundle.assets())?);
  } else {
    println!(
      "wrote {} ({} assets) to {}",
      bundle.main_filename(),
      bundle.assets().len(),
      output.display()
    );
  }
  Ok(())
}
