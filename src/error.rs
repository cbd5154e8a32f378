//! Reasons a tab was left untouched
//!
//! None of these are fatal. The dispatcher logs them and moves on; an
//! unstyled page is visible enough on its own.

use crate::models::TabId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("tab {tab_id} is a browser-internal page ({url})")]
    HostRestricted { tab_id: TabId, url: String },

    #[error("no current tab to style")]
    MissingContext,

    #[error("no site-specific stylesheet for {url}, using the default")]
    GeneratorMiss { url: String },
}
