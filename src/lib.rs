//! Dark Starter
//!
//! Runtime core of a page-darkening browser extension. Tracks whether the
//! extension is switched on, follows tab navigation while it is, and pushes
//! (or pulls) a generated stylesheet into every tab it is allowed to touch.

pub mod models;
pub mod generator;
pub mod host;
pub mod page;
pub mod controller;
pub mod scenario;
pub mod error;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use controller::{ExtensionController, StyleDispatcher};
pub use error::SkipReason;
pub use generator::{CssGenerator, StaticCssGenerator};
pub use host::{AppSwitch, BrowserHost, MemoryHost, SubscriptionHandle};
pub use models::{PageScript, RunAt, TabChangeEvent, TabHandle, TabId, TabStatus, STYLE_MARKER_ID};

use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Build a controller with the builtin stylesheet and follow `switch`
pub fn start(host: Rc<dyn BrowserHost>, switch: &AppSwitch) -> Rc<ExtensionController> {
    let controller = ExtensionController::new(
        Rc::new(StaticCssGenerator::builtin()),
        host,
        ControllerOptions::default(),
    );
    controller.attach(switch);
    controller
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// URL prefixes of pages the host will not let extensions script
    pub restricted_prefixes: Vec<String>,
    /// Element id marking an injected stylesheet
    pub marker_id: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            restricted_prefixes: vec!["chrome".to_string()],
            marker_id: STYLE_MARKER_ID.to_string(),
        }
    }
}
