//! Per-tab style injection and removal
//!
//! Turns "style this tab" / "unstyle this tab" into a [`PageScript`] and hands
//! it to the host. Every dispatch is independent and fire-and-forget: nothing
//! here tracks completion or ordering across tabs.

use crate::error::SkipReason;
use crate::generator::CssGenerator;
use crate::host::BrowserHost;
use crate::models::{PageScript, TabHandle, TabQuery};
use crate::utils::is_restricted_url;
use crate::ControllerOptions;
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Clone)]
pub struct StyleDispatcher {
    generator: Rc<dyn CssGenerator>,
    host: Rc<dyn BrowserHost>,
    options: Rc<ControllerOptions>,
}

impl StyleDispatcher {
    pub fn new(
        generator: Rc<dyn CssGenerator>,
        host: Rc<dyn BrowserHost>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            generator,
            host,
            options: Rc::new(options),
        }
    }

    pub fn host(&self) -> &Rc<dyn BrowserHost> {
        &self.host
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Resolve the stylesheet for `url`: the site-specific sheet when the
    /// generator has one, the default sheet otherwise
    pub fn stylesheet_for(&self, url: Option<&str>) -> String {
        let special = url
            .and_then(|url| self.generator.create_special_css_code(url, &()))
            .filter(|css| !css.is_empty());

        match special {
            Some(css) => css,
            None => {
                if let Some(url) = url {
                    let reason = SkipReason::GeneratorMiss {
                        url: url.to_string(),
                    };
                    trace!(%reason, "default stylesheet");
                }
                self.generator.create_css_code(&())
            }
        }
    }

    pub fn build_injection_script(&self, url: Option<&str>) -> PageScript {
        PageScript::inject(self.options.marker_id.clone(), self.stylesheet_for(url))
    }

    pub fn build_removal_script(&self) -> PageScript {
        PageScript::remove(self.options.marker_id.clone())
    }

    /// Refuse tabs showing browser-internal pages
    pub fn check_tab(&self, tab: &TabHandle) -> Result<(), SkipReason> {
        if is_restricted_url(tab.url(), &self.options.restricted_prefixes) {
            return Err(SkipReason::HostRestricted {
                tab_id: tab.id,
                url: tab.url().unwrap_or_default().to_string(),
            });
        }
        Ok(())
    }

    /// Hand `script` to the host for `tab`, or for the current tab when
    /// `tab` is `None`
    pub fn dispatch(&self, tab: Option<&TabHandle>, script: PageScript) {
        if let Some(tab) = tab {
            if let Err(reason) = self.check_tab(tab) {
                debug!(tab_id = %tab.id, %reason, "skipping tab");
                return;
            }
        }

        self.execute(tab, script);
    }

    /// Send to the host without the URL guard; callers have already checked
    fn execute(&self, tab: Option<&TabHandle>, script: PageScript) {
        let target = tab.map(|t| t.id);
        trace!(
            tab_id = ?target,
            injection = script.is_injection(),
            run_at = %script.run_at,
            "dispatching page script"
        );
        self.host.execute_script(target, script);
    }

    /// Inject the stylesheet into `tab`. Without a tab there is nothing to
    /// style.
    pub fn add_css_to_tab(&self, tab: Option<&TabHandle>) {
        let Some(tab) = tab else {
            let reason = SkipReason::MissingContext;
            debug!(%reason, "skipping injection");
            return;
        };
        if let Err(reason) = self.check_tab(tab) {
            debug!(tab_id = %tab.id, %reason, "skipping tab");
            return;
        }
        let script = self.build_injection_script(tab.url());
        self.execute(Some(tab), script);
    }

    /// Remove the stylesheet from `tab`, or from the current tab when `tab`
    /// is `None`
    pub fn remove_css_from_tab(&self, tab: Option<&TabHandle>) {
        self.dispatch(tab, self.build_removal_script());
    }

    /// Best-effort injection into the tab the host considers current
    pub fn add_css_to_current_tab(&self) {
        let dispatcher = self.clone();
        self.host
            .current_tab(Box::new(move |tab| dispatcher.add_css_to_tab(tab.as_ref())));
    }

    pub fn add_css_to_all_tabs(&self) {
        let dispatcher = self.clone();
        self.host.query_tabs(
            TabQuery::all(),
            Box::new(move |tabs| {
                debug!(count = tabs.len(), "styling open tabs");
                for tab in &tabs {
                    dispatcher.add_css_to_tab(Some(tab));
                }
            }),
        );
    }

    pub fn remove_css_from_all_tabs(&self) {
        let dispatcher = self.clone();
        self.host.query_tabs(
            TabQuery::all(),
            Box::new(move |tabs| {
                debug!(count = tabs.len(), "unstyling open tabs");
                for tab in &tabs {
                    dispatcher.remove_css_from_tab(Some(tab));
                }
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StaticCssGenerator;
    use crate::host::MemoryHost;
    use crate::models::{RunAt, TabId, STYLE_MARKER_ID};

    fn dispatcher(generator: StaticCssGenerator) -> (Rc<MemoryHost>, StyleDispatcher) {
        let host = Rc::new(MemoryHost::with_tabs([
            TabHandle::new(1, "https://example.com"),
            TabHandle::new(2, "chrome://extensions"),
        ]));
        let dispatcher = StyleDispatcher::new(
            Rc::new(generator),
            host.clone(),
            ControllerOptions::default(),
        );
        (host, dispatcher)
    }

    #[test]
    fn test_injection_script_uses_special_sheet() {
        let generator = StaticCssGenerator::new("body{color:red}")
            .with_site("^https://example", "p{}")
            .unwrap();
        let (_, dispatcher) = dispatcher(generator);

        let script = dispatcher.build_injection_script(Some("https://example.com"));
        assert_eq!(script.css(), Some("p{}"));
        assert_eq!(script.marker_id, STYLE_MARKER_ID);
        assert_eq!(script.run_at, RunAt::DocumentStart);
    }

    #[test]
    fn test_injection_script_without_url_uses_default() {
        let (_, dispatcher) = dispatcher(StaticCssGenerator::new("body{color:red}"));
        let script = dispatcher.build_injection_script(None);
        assert_eq!(script.css(), Some("body{color:red}"));
    }

    #[test]
    fn test_removal_to_current_tab() {
        let (host, dispatcher) = dispatcher(StaticCssGenerator::builtin());
        dispatcher.remove_css_from_tab(None);

        let executions = host.executions();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].target, None);
        assert!(!executions[0].script.is_injection());
    }

    #[test]
    fn test_missing_tab_skips_injection() {
        let (host, dispatcher) = dispatcher(StaticCssGenerator::builtin());
        dispatcher.add_css_to_tab(None);
        assert!(host.executions().is_empty());
    }

    #[test]
    fn test_restricted_tab_is_skipped() {
        let (host, dispatcher) = dispatcher(StaticCssGenerator::builtin());
        let internal = host.tab(TabId(2)).unwrap();

        assert!(matches!(
            dispatcher.check_tab(&internal),
            Err(SkipReason::HostRestricted { .. })
        ));

        dispatcher.add_css_to_tab(Some(&internal));
        dispatcher.remove_css_from_tab(Some(&internal));
        assert!(host.executions().is_empty());
    }

    #[test]
    fn test_fan_out_skips_only_restricted() {
        let (host, dispatcher) = dispatcher(StaticCssGenerator::builtin());
        dispatcher.add_css_to_all_tabs();

        let targets: Vec<_> = host.executions().iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![Some(TabId(1))]);
    }
}
