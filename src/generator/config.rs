//! Stylesheet configuration parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stylesheets for [`super::StaticCssGenerator`], written in JSON5
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylesheetConfig {
    /// Sheet for pages without a site entry; the builtin sheet when absent
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub sites: Vec<SiteSheet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSheet {
    /// Regular expression matched against the full page URL
    pub url_pattern: String,
    pub css: String,
}

/// Parse stylesheet configuration from bytes
pub fn parse_stylesheets(content: &[u8]) -> Result<StylesheetConfig> {
    let content_str = std::str::from_utf8(content)
        .context("Invalid UTF-8 in stylesheet configuration")?;

    json5::from_str(content_str).context("Failed to parse stylesheet configuration")
}

pub fn parse_stylesheets_from_str(content: &str) -> Result<StylesheetConfig> {
    parse_stylesheets(content.as_bytes())
}

pub fn parse_stylesheets_from_file(path: impl AsRef<Path>) -> Result<StylesheetConfig> {
    let path = path.as_ref();
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_stylesheets(&content)
}
