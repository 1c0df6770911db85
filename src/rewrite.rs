//! Verbatim reference rewriting for documents and stylesheets.

use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::asset_paths::relative_archive_reference;
use crate::models::Asset;

/// Replace references whose archive location differs from where they would naturally resolve.
///
/// `content_archive_dir` is the archive directory of the file being rewritten. All references
/// are matched in a single pass over the original text, longest reference first, so neither a
/// shorter reference inside a longer one nor text produced by an earlier replacement is ever
/// rewritten.
pub fn rewrite_references(content: &str, assets: &[Asset], content_archive_dir: &str) -> String {
  let replacements: BTreeMap<&str, String> = assets
    .iter()
    .filter(|asset| !asset.original_ref.is_empty())
    .map(|asset| {
      (
        asset.original_ref.as_str(),
        relative_archive_reference(content_archive_dir, &asset.archive_path),
      )
    })
    .collect();

  if replacements
    .iter()
    .all(|(original, replacement)| original == replacement)
  {
    return content.to_string();
  }

  let mut ordered: Vec<&str> = replacements.keys().copied().collect();
  ordered.sort_by(|left, right| right.len().cmp(&left.len()).then_with(|| left.cmp(right)));

  let alternatives: Vec<String> = ordered.iter().map(|original| regex::escape(original)).collect();
  let pattern = match Regex::new(&alternatives.join("|")) {
    Ok(pattern) => pattern,
    Err(err) => {
      log::warn!("failed to build reference pattern, leaving content unchanged: {err}");
      return content.to_string();
    }
  };

  pattern
    .replace_all(content, |captures: &Captures| {
      let matched = &captures[0];
      replacements
        .get(matched)
        .cloned()
        .unwrap_or_else(|| matched.to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  fn asset(original_ref: &str, archive_path: &str) -> Asset {
    Asset {
      original_ref: original_ref.to_string(),
      disk_path: PathBuf::from("/unused"),
      archive_path: archive_path.to_string(),
    }
  }

  #[test]
  fn leaves_naturally_resolving_references_alone() {
    let html = r#"<img src="a.png"><img src="img/b.png">"#;
    let assets = vec![asset("a.png", "a.png"), asset("img/b.png", "img/b.png")];
    assert_eq!(rewrite_references(html, &assets, ""), html);
  }

  #[test]
  fn rewrites_external_references() {
    let html = r#"<img src="/home/me/photo.png">"#;
    let assets = vec![asset("/home/me/photo.png", "_ext/photo.png")];
    assert_eq!(
      rewrite_references(html, &assets, ""),
      r#"<img src="_ext/photo.png">"#
    );
  }

  #[test]
  fn rewrites_relative_to_nested_documents() {
    let html = r#"<img src="/abs/logo.png">"#;
    let assets = vec![asset("/abs/logo.png", "_ext/logo.png")];
    assert_eq!(
      rewrite_references(html, &assets, "docs"),
      r#"<img src="../_ext/logo.png">"#
    );
  }

  #[test]
  fn normalises_dot_prefixed_references() {
    let css = "body { background: url(./bg.png) }";
    let assets = vec![asset("./bg.png", "bg.png")];
    assert_eq!(
      rewrite_references(css, &assets, ""),
      "body { background: url(bg.png) }"
    );
  }

  #[test]
  fn longer_references_are_replaced_before_their_substrings() {
    let html = r#"<img src="/data/img/a.png"><img src="/data/img/a.png.bak.png">"#;
    let assets = vec![
      asset("/data/img/a.png", "_ext/a.png"),
      asset("/data/img/a.png.bak.png", "_ext/a.png.bak.png"),
    ];
    assert_eq!(
      rewrite_references(html, &assets, ""),
      r#"<img src="_ext/a.png"><img src="_ext/a.png.bak.png">"#
    );
  }

  #[test]
  fn replacement_output_is_never_rewritten_again() {
    let html = r#"<img src="a.png"><img src="/x/a.png">"#;
    let assets = vec![asset("a.png", "a.png"), asset("/x/a.png", "_ext/a.png")];
    assert_eq!(
      rewrite_references(html, &assets, "docs"),
      r#"<img src="../a.png"><img src="../_ext/a.png">"#
    );
  }

  #[test]
  fn differently_cased_references_are_independent() {
    let html = r#"<img src="/x/Logo.PNG"><img src="/x/logo.png">"#;
    let assets = vec![
      asset("/x/Logo.PNG", "_ext/Logo.PNG"),
      asset("/x/logo.png", "_ext/logo.png"),
    ];
    assert_eq!(
      rewrite_references(html, &assets, ""),
      r#"<img src="_ext/Logo.PNG"><img src="_ext/logo.png">"#
    );
  }
}
