//! Structured page scripts handed to the host's script-execution facility
//!
//! The controller never builds JavaScript text itself. It hands a
//! [`PageScript`] to the host, and the host serializes it with
//! [`PageScript::to_js`] (or interprets it directly, as the in-memory host
//! does).

use serde::Serialize;
use std::fmt;

/// Element id of the injected `<style>` element
pub const STYLE_MARKER_ID: &str = "dark-reader-style";

/// When the host should run a script relative to page load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
    /// Before any DOM is constructed, so styles apply before first paint
    DocumentStart,
    /// Host default timing
    #[default]
    Default,
}

impl RunAt {
    /// Value for the `runAt` field of `tabs.executeScript`, if any
    pub fn as_host_str(&self) -> Option<&'static str> {
        match self {
            RunAt::DocumentStart => Some("document_start"),
            RunAt::Default => None,
        }
    }
}

impl fmt::Display for RunAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_host_str().unwrap_or("default"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleAction {
    Inject { css: String },
    Remove,
}

/// A self-contained, idempotent page script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageScript {
    pub marker_id: String,
    pub action: StyleAction,
    pub run_at: RunAt,
}

impl PageScript {
    pub fn inject(marker_id: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            marker_id: marker_id.into(),
            action: StyleAction::Inject { css: css.into() },
            run_at: RunAt::DocumentStart,
        }
    }

    pub fn remove(marker_id: impl Into<String>) -> Self {
        Self {
            marker_id: marker_id.into(),
            action: StyleAction::Remove,
            run_at: RunAt::Default,
        }
    }

    pub fn is_injection(&self) -> bool {
        matches!(self.action, StyleAction::Inject { .. })
    }

    /// CSS text carried by an injection script
    pub fn css(&self) -> Option<&str> {
        match &self.action {
            StyleAction::Inject { css } => Some(css),
            StyleAction::Remove => None,
        }
    }

    /// Serialize to JavaScript source for `tabs.executeScript({ code })`
    pub fn to_js(&self) -> String {
        let id = js_string_literal(&self.marker_id);
        match &self.action {
            StyleAction::Inject { css } => format!(
                "(function () {{ \
                 if (document.getElementById({id})) {{ return; }} \
                 var style = document.createElement('style'); \
                 style.setAttribute('id', {id}); \
                 style.type = 'text/css'; \
                 style.appendChild(document.createTextNode({css})); \
                 var parent = document.head || document.getElementsByTagName('head')[0] || document.documentElement; \
                 parent.appendChild(style); \
                 }})();",
                id = id,
                css = js_string_literal(css),
            ),
            StyleAction::Remove => format!(
                "(function () {{ \
                 var style = document.getElementById({id}); \
                 style && style.parentNode && style.parentNode.removeChild(style); \
                 }})();",
                id = id,
            ),
        }
    }
}

/// Quote text as a JavaScript string literal.
///
/// JSON string syntax is a subset of JS string syntax, so quotes, backslashes
/// and newlines in stylesheets survive intact. U+2028 and U+2029 are legal
/// in JSON strings but not in pre-ES2019 JS string literals.
fn js_string_literal(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_defaults_to_document_start() {
        let script = PageScript::inject(STYLE_MARKER_ID, "body{color:red}");
        assert_eq!(script.run_at, RunAt::DocumentStart);
        assert_eq!(script.css(), Some("body{color:red}"));
        assert!(script.is_injection());
    }

    #[test]
    fn test_remove_uses_default_timing() {
        let script = PageScript::remove(STYLE_MARKER_ID);
        assert_eq!(script.run_at, RunAt::Default);
        assert_eq!(script.run_at.as_host_str(), None);
        assert_eq!(script.css(), None);
    }

    #[test]
    fn test_inject_js_contains_marker_check() {
        let js = PageScript::inject(STYLE_MARKER_ID, "body{color:red}").to_js();
        assert!(js.contains(r#"document.getElementById("dark-reader-style")"#));
        assert!(js.contains(r#"createTextNode("body{color:red}")"#));
        assert!(js.contains("appendChild(style)"));
    }

    #[test]
    fn test_inject_js_escapes_quotes() {
        let js = PageScript::inject(STYLE_MARKER_ID, "a::after{content:'x'}\n\"y\"").to_js();
        assert!(js.contains(r#""a::after{content:'x'}\n\"y\"""#));
    }

    #[test]
    fn test_inject_js_escapes_line_separators() {
        let js = PageScript::inject(STYLE_MARKER_ID, "a{}\u{2028}b{}\u{2029}").to_js();
        assert!(!js.contains('\u{2028}'));
        assert!(!js.contains('\u{2029}'));
        assert!(js.contains(r#""a{}\u2028b{}\u2029""#));
    }

    #[test]
    fn test_remove_js_detaches_marker() {
        let js = PageScript::remove(STYLE_MARKER_ID).to_js();
        assert!(js.contains("removeChild(style)"));
        assert!(!js.contains("createElement"));
    }
}
