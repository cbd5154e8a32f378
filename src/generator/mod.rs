//! Stylesheet generation capability

pub mod config;

use anyhow::{Context, Result};
use regex::Regex;

pub use config::{SiteSheet, StylesheetConfig};

/// Produces the CSS pushed into pages.
///
/// `C` is the generator's configuration. This extension has no settings, so
/// the controller always works with `C = ()`.
pub trait CssGenerator<C = ()> {
    /// Stylesheet for an arbitrary page
    fn create_css_code(&self, config: &C) -> String;

    /// Stylesheet tailored to `url`, or `None` when the URL needs nothing
    /// special
    fn create_special_css_code(&self, url: &str, config: &C) -> Option<String>;
}

/// Darkens a page by inverting it and flipping media back
pub const BUILTIN_DARK_CSS: &str = "html { filter: invert(90%) hue-rotate(180deg) !important; background: rgb(255, 255, 255) !important; } \
img, video, iframe, canvas, svg image, [style*=\"background-image\"] { filter: invert(100%) hue-rotate(180deg) !important; }";

#[derive(Debug, Clone)]
struct CompiledSiteSheet {
    pattern: Regex,
    css: String,
}

/// Generator backed by a fixed default sheet plus per-site overrides.
/// The first site pattern matching the URL wins.
#[derive(Debug, Clone)]
pub struct StaticCssGenerator {
    default_css: String,
    sites: Vec<CompiledSiteSheet>,
}

impl StaticCssGenerator {
    pub fn new(default_css: impl Into<String>) -> Self {
        Self {
            default_css: default_css.into(),
            sites: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_DARK_CSS)
    }

    /// Add a site-specific sheet for URLs matching `url_pattern`
    pub fn with_site(mut self, url_pattern: &str, css: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(url_pattern)
            .with_context(|| format!("Invalid site URL pattern: {}", url_pattern))?;
        self.sites.push(CompiledSiteSheet {
            pattern,
            css: css.into(),
        });
        Ok(self)
    }

    pub fn from_config(config: StylesheetConfig) -> Result<Self> {
        let default_css = config.default.unwrap_or_else(|| BUILTIN_DARK_CSS.to_string());
        config
            .sites
            .into_iter()
            .try_fold(Self::new(default_css), |generator, site| {
                generator.with_site(&site.url_pattern, site.css)
            })
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }
}

impl Default for StaticCssGenerator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CssGenerator for StaticCssGenerator {
    fn create_css_code(&self, _config: &()) -> String {
        self.default_css.clone()
    }

    fn create_special_css_code(&self, url: &str, _config: &()) -> Option<String> {
        self.sites
            .iter()
            .find(|site| site.pattern.is_match(url))
            .map(|site| site.css.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_no_special_sheets() {
        let generator = StaticCssGenerator::builtin();
        assert_eq!(generator.create_css_code(&()), BUILTIN_DARK_CSS);
        assert_eq!(generator.create_special_css_code("https://example.com", &()), None);
    }

    #[test]
    fn test_first_matching_site_wins() {
        let generator = StaticCssGenerator::new("body{}")
            .with_site(r"^https://(www\.)?example\.com", "a{}")
            .unwrap()
            .with_site(r"example", "b{}")
            .unwrap();

        assert_eq!(
            generator.create_special_css_code("https://www.example.com/page", &()),
            Some("a{}".to_string())
        );
        assert_eq!(
            generator.create_special_css_code("http://example.org", &()),
            Some("b{}".to_string())
        );
        assert_eq!(generator.create_special_css_code("https://x.test", &()), None);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = StaticCssGenerator::builtin().with_site("(", "a{}").unwrap_err();
        assert!(err.to_string().contains("Invalid site URL pattern"));
    }
}
