//! Scripted replays against the in-memory host
//!
//! A scenario lists the open tabs and a sequence of switch flips and tab
//! lifecycle steps. Replaying it drives a real [`ExtensionController`]
//! through an [`AppSwitch`] and a [`MemoryHost`], then reports what the
//! host executed and which tabs ended up styled.

pub mod report;

pub use report::{ReplayReport, TabState};

use crate::controller::ExtensionController;
use crate::generator::CssGenerator;
use crate::host::{AppSwitch, MemoryHost};
use crate::models::{TabHandle, TabId};
use crate::ControllerOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub tabs: Vec<TabHandle>,
    /// Focused tab, if any
    #[serde(default)]
    pub current: Option<TabId>,
    /// Switch value when the controller attaches
    #[serde(default)]
    pub initial: bool,
    #[serde(default)]
    pub options: Option<ControllerOptions>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Switch(bool),
    /// Start loading `url` in `tab`
    Navigate { tab: TabId, url: String },
    /// Finish loading `tab`
    Complete(TabId),
    Open(TabHandle),
    Close(TabId),
    Focus(Option<TabId>),
}

pub fn parse_scenario(content: &[u8]) -> Result<Scenario> {
    let content_str = std::str::from_utf8(content).context("Invalid UTF-8 in scenario")?;
    json5::from_str(content_str).context("Failed to parse scenario")
}

pub fn parse_scenario_from_str(content: &str) -> Result<Scenario> {
    parse_scenario(content.as_bytes())
}

pub fn parse_scenario_from_file(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let content =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_scenario(&content)
}

/// Run `scenario` to completion and report the host's final state
pub fn replay(scenario: &Scenario, generator: Rc<dyn CssGenerator>) -> Result<ReplayReport> {
    let options = scenario.options.clone().unwrap_or_default();
    let marker_id = options.marker_id.clone();

    let host = Rc::new(MemoryHost::with_tabs(scenario.tabs.iter().cloned()));
    host.set_current(scenario.current);

    let switch = AppSwitch::new(scenario.initial);
    let controller = ExtensionController::new(generator, host.clone(), options);
    controller.attach(&switch);

    for (index, step) in scenario.steps.iter().enumerate() {
        debug!(index, ?step, "replaying step");
        match step {
            Step::Switch(enabled) => switch.set(*enabled),
            Step::Navigate { tab, url } => {
                if !host.navigate(*tab, url.clone()) {
                    anyhow::bail!("Step {}: no tab {} to navigate", index + 1, tab);
                }
            }
            Step::Complete(tab) => {
                if !host.complete(*tab) {
                    anyhow::bail!("Step {}: no tab {} to complete", index + 1, tab);
                }
            }
            Step::Open(tab) => host.open_tab(tab.clone()),
            Step::Close(tab) => host.close_tab(*tab),
            Step::Focus(tab) => host.set_current(*tab),
        }
    }

    let tabs = host
        .tabs()
        .into_iter()
        .map(|tab| {
            let markers = host.marker_count(tab.id, &marker_id);
            TabState {
                id: tab.id,
                url: tab.url,
                styled: markers > 0,
                markers,
            }
        })
        .collect();

    Ok(ReplayReport {
        executions: host.executions(),
        tabs,
        enabled: controller.is_enabled(),
        listeners: host.listener_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StaticCssGenerator;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_steps() {
        let scenario = parse_scenario_from_str(
            r#"{
                tabs: [ { id: 1, url: "https://example.com" }, { id: 2 } ],
                current: 1,
                steps: [
                    { switch: true },
                    { navigate: { tab: 1, url: "https://example.com/next" } },
                    { complete: 1 },
                    { open: { id: 3, url: "https://x.test" } },
                    { close: 3 },
                    { focus: null },
                ],
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.tabs.len(), 2);
        assert_eq!(scenario.tabs[1].url, None);
        assert_eq!(scenario.current, Some(TabId(1)));
        assert!(!scenario.initial);
        assert_eq!(
            scenario.steps,
            vec![
                Step::Switch(true),
                Step::Navigate {
                    tab: TabId(1),
                    url: "https://example.com/next".to_string()
                },
                Step::Complete(TabId(1)),
                Step::Open(TabHandle::new(3, "https://x.test")),
                Step::Close(TabId(3)),
                Step::Focus(None),
            ]
        );
    }

    #[test]
    fn test_replay_navigation_restyles() {
        let scenario = parse_scenario_from_str(
            r#"{
                tabs: [ { id: 1, url: "https://example.com" } ],
                steps: [
                    { switch: true },
                    { navigate: { tab: 1, url: "https://example.com/next" } },
                    { complete: 1 },
                ],
            }"#,
        )
        .unwrap();

        let report = replay(&scenario, Rc::new(StaticCssGenerator::builtin())).unwrap();
        assert!(report.enabled);
        assert_eq!(report.listeners, 1);
        assert_eq!(report.tabs[0].markers, 1);
        assert_eq!(report.injection_count(), 2);
    }

    #[test]
    fn test_replay_unknown_tab_fails() {
        let scenario = parse_scenario_from_str(r#"{ steps: [ { complete: 9 } ] }"#).unwrap();
        let err = replay(&scenario, Rc::new(StaticCssGenerator::builtin())).unwrap_err();
        assert!(err.to_string().contains("no tab 9"));
    }
}
