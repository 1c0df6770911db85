//! Reference extraction from HTML documents and stylesheets.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::asset_paths::is_remote_reference;

fn tag_attribute_patterns() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(
          r#"(?i)<(?:img|script|video|audio|source|embed|input)\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#,
        )
        .expect("invalid src attribute regex"),
        Regex::new(r#"(?i)<link\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#)
          .expect("invalid link href regex"),
        Regex::new(r#"(?i)<object\b[^>]*?\bdata\s*=\s*["']([^"']+)["']"#)
          .expect("invalid object data regex"),
      ]
    })
    .as_slice()
}

fn css_url_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)url\s*\(\s*["']?([^"')\s]+)["']?\s*\)"#).expect("invalid css url regex")
  })
}

/// Collect local references from an HTML document.
///
/// Covers `src` on media and script tags, `href` on `link`, `data` on `object`, and every
/// CSS `url(...)` occurring anywhere in the text (inline styles included).
pub fn extract_html_references(html: &str) -> BTreeSet<String> {
  let mut references = BTreeSet::new();

  for pattern in tag_attribute_patterns() {
    for captures in pattern.captures_iter(html) {
      if let Some(value) = captures.get(1) {
        add_reference(&mut references, value.as_str());
      }
    }
  }

  references.extend(extract_css_references(html));
  references
}

/// Collect local references from CSS `url(...)` tokens.
pub fn extract_css_references(css: &str) -> BTreeSet<String> {
  let mut references = BTreeSet::new();
  for captures in css_url_pattern().captures_iter(css) {
    if let Some(value) = captures.get(1) {
      add_reference(&mut references, value.as_str());
    }
  }
  references
}

fn add_reference(references: &mut BTreeSet<String>, value: &str) {
  let value = value.trim();
  if value.is_empty() || is_remote_reference(value) {
    return;
  }
  references.insert(value.to_string());
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collects_tag_attribute_references() {
    let html = r#"
      <img src="img/logo.png" alt="logo">
      <script type="text/javascript" src='app.js'></script>
      <video src="intro.mp4"></video>
      <link rel="stylesheet" href="style.css">
      <object type="application/pdf" data="doc.pdf"></object>
      <INPUT type="image" SRC="button.png">
    "#;

    let references = extract_html_references(html);
    let expected: BTreeSet<String> = [
      "img/logo.png",
      "app.js",
      "intro.mp4",
      "style.css",
      "doc.pdf",
      "button.png",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(references, expected);
  }

  #[test]
  fn ignores_attributes_on_unrelated_tags() {
    let html = r#"<a href="page.html">next</a><iframe src="frame.html"></iframe>"#;
    assert!(extract_html_references(html).is_empty());
  }

  #[test]
  fn collects_inline_css_urls() {
    let html = r#"<style>body { background: url( "bg.png" ); }</style>
      <div style="background-image:url('tile.png')"></div>"#;
    let references = extract_html_references(html);
    assert!(references.contains("bg.png"));
    assert!(references.contains("tile.png"));
  }

  #[test]
  fn css_urls_accept_optional_quotes_and_whitespace() {
    let css = "a { background: url(one.png) } b { src: URL ( 'two.woff' ) } c { x: url(\"three.svg\") }";
    let references = extract_css_references(css);
    let expected: BTreeSet<String> = ["one.png", "two.woff", "three.svg"]
      .into_iter()
      .map(String::from)
      .collect();
    assert_eq!(references, expected);
  }

  #[test]
  fn drops_remote_and_special_references() {
    let html = r##"
      <img src="https://example.com/a.png">
      <img src="data:image/png;base64,AAAA">
      <script src="//cdn.example.com/lib.js"></script>
      <link href="#top">
      <div style="background:url(http://example.com/bg.png)"></div>
    "##;
    assert!(extract_html_references(html).is_empty());
  }

  #[test]
  fn trims_and_deduplicates_references() {
    let html = r#"<img src=" a.png "><img src="a.png"><div style="background:url(a.png)"></div>"#;
    let references = extract_html_references(html);
    assert_eq!(references.len(), 1);
    assert!(references.contains("a.png"));
  }

  #[test]
  fn extraction_is_idempotent() {
    let html = r#"<img src="b.png"><link href="s.css"><p style="background:url(c.png)"></p>"#;
    assert_eq!(extract_html_references(html), extract_html_references(html));
  }

  #[test]
  fn plain_text_yields_nothing() {
    assert!(extract_html_references("<h1>Hello</h1><p>World</p>").is_empty());
    assert!(extract_css_references("body { color: red; }").is_empty());
  }
}
