use regex::Regex;

fn remote_reference_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^https?:").expect("invalid http(s) regex"),
                Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
                Regex::new(r"(?i)^javascript:").expect("invalid javascript regex"),
                Regex::new(r"(?i)^mailto:").expect("invalid mailto regex"),
                Regex::new(r"^#").expect("invalid fragment regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
            ]
        })
        .as_slice()
}

/// Determine whether a reference points somewhere other than the local filesystem.
///
/// Remote URLs, inline data URIs, script and mail links, fragment-only anchors and
/// protocol-relative URLs are never bundled. The scheme comparison ignores case and the
/// value is trimmed before matching.
pub fn is_remote_reference(value: &str) -> bool {
    let value = value.trim();
    remote_reference_patterns()
        .iter()
        .any(|pattern| pattern.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::is_remote_reference;

    #[test]
    fn ignores_http_urls() {
        assert!(is_remote_reference("https://example.com/logo.png"));
        assert!(is_remote_reference("HTTP://example.com"));
    }

    #[test]
    fn ignores_data_uris() {
        assert!(is_remote_reference("data:image/png;base64,abc"));
        assert!(is_remote_reference("  DATA:text/plain,hi"));
    }

    #[test]
    fn ignores_script_and_mail_links() {
        assert!(is_remote_reference("javascript:void(0)"));
        assert!(is_remote_reference("JavaScript:alert(1)"));
        assert!(is_remote_reference("mailto:user@example.com"));
    }

    #[test]
    fn ignores_fragments_and_protocol_relative_urls() {
        assert!(is_remote_reference("#section"));
        assert!(is_remote_reference("//cdn.example.com/app.js"));
    }

    #[test]
    fn keeps_relative_and_absolute_paths() {
        assert!(!is_remote_reference("images/photo.png"));
        assert!(!is_remote_reference("../shared/style.css"));
        assert!(!is_remote_reference("/tmp/photo.png"));
        assert!(!is_remote_reference("httpdocs/a.png"));
    }
}
