//! Tab handles and tab lifecycle notifications

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned tab identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TabId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A read-only view of a browser tab, valid for one handler invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabHandle {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
}

impl TabHandle {
    pub fn new(id: i64, url: impl Into<String>) -> Self {
        Self {
            id: TabId(id),
            url: Some(url.into()),
        }
    }

    /// A tab whose URL the host did not report
    pub fn without_url(id: i64) -> Self {
        Self {
            id: TabId(id),
            url: None,
        }
    }

    /// URL as a borrowed str, treating an empty string as absent
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Loading status reported with a tab update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabStatus {
    /// Navigation started; the previous document is gone
    Loading,
    Complete,
    Other(String),
}

impl TabStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "loading" => TabStatus::Loading,
            "complete" => TabStatus::Complete,
            other => TabStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TabStatus::Loading => "loading",
            TabStatus::Complete => "complete",
            TabStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for TabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `tabs.onUpdated` notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabChangeEvent {
    pub tab_id: TabId,
    pub status: Option<TabStatus>,
    pub tab: TabHandle,
}

impl TabChangeEvent {
    pub fn new(tab: TabHandle, status: TabStatus) -> Self {
        Self {
            tab_id: tab.id,
            status: Some(status),
            tab,
        }
    }

    pub fn is_navigation_start(&self) -> bool {
        matches!(self.status, Some(TabStatus::Loading))
    }
}

/// Filter passed to the host's tab query. The controller only ever asks for
/// every tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabQuery {
    pub active: Option<bool>,
    pub current_window: Option<bool>,
}

impl TabQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unfiltered(&self) -> bool {
        self.active.is_none() && self.current_window.is_none()
    }
}
