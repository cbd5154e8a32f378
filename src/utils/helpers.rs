//! Helper utility functions

/// Check whether a URL belongs to the browser itself and must not be
/// scripted. An absent or empty URL is never restricted.
pub fn is_restricted_url<S: AsRef<str>>(url: Option<&str>, prefixes: &[S]) -> bool {
    match url {
        Some(url) if !url.is_empty() => prefixes
            .iter()
            .map(AsRef::as_ref)
            .any(|prefix| !prefix.is_empty() && url.starts_with(prefix)),
        _ => false,
    }
}

/// Shorten a URL for log lines and CLI output
pub fn short_url(url: &str, max_len: usize) -> String {
    if url.chars().count() <= max_len {
        return url.to_string();
    }
    let kept: String = url.chars().take(max_len.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("chrome://settings", true ; "settings page")]
    #[test_case("chrome-extension://abc/popup.html", true ; "extension page")]
    #[test_case("chromebook.example.com", true ; "bare prefix match")]
    #[test_case("https://example.com", false ; "web page")]
    #[test_case("https://chrome.google.com", false ; "prefix elsewhere")]
    #[test_case("", false ; "empty url")]
    fn test_is_restricted_url(url: &str, expected: bool) {
        assert_eq!(is_restricted_url(Some(url), &["chrome"]), expected);
    }

    #[test]
    fn test_absent_url_is_not_restricted() {
        assert!(!is_restricted_url(None, &["chrome"]));
    }

    #[test]
    fn test_empty_prefix_matches_nothing() {
        assert!(!is_restricted_url(Some("https://example.com"), &[""]));
    }

    #[test]
    fn test_short_url() {
        assert_eq!(short_url("https://a.test", 40), "https://a.test");
        assert_eq!(short_url("https://example.com/long", 10), "https://e…");
    }
}
