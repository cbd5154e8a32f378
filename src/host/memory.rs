//! In-memory browser host
//!
//! Keeps tabs, a focused tab, a listener registry and a [`Document`] per
//! tab, and runs page scripts directly against those documents. Used by the
//! scenario replayer and the test suite.

use super::{
    BrowserHost, CurrentTabCallback, SubscriptionHandle, TabQueryCallback, TabUpdateListener,
};
use crate::models::{PageScript, TabChangeEvent, TabHandle, TabId, TabQuery, TabStatus};
use crate::page::Document;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Schemes the host refuses to run extension scripts in
pub const INTERNAL_SCHEMES: &[&str] = &["chrome://", "chrome-extension://", "chrome-search://"];

/// One `execute_script` call as the host saw it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Execution {
    /// Target requested by the caller; `None` means current tab
    pub target: Option<TabId>,
    /// Tab the script actually ran in
    pub resolved: Option<TabId>,
    pub script: PageScript,
    /// The host refused to run the script
    pub rejected: bool,
}

#[derive(Debug, Clone)]
struct MemoryTab {
    handle: TabHandle,
    document: Document,
}

type Pending = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct MemoryHost {
    tabs: RefCell<Vec<MemoryTab>>,
    current: Cell<Option<TabId>>,
    listeners: RefCell<Vec<(SubscriptionHandle, TabUpdateListener)>>,
    next_subscription: Cell<u64>,
    executions: RefCell<Vec<Execution>>,
    deferred: Cell<bool>,
    pending: RefCell<VecDeque<Pending>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tabs(tabs: impl IntoIterator<Item = TabHandle>) -> Self {
        let host = Self::new();
        for tab in tabs {
            host.open_tab(tab);
        }
        host
    }

    /// Hold tab-query and current-tab callbacks until [`Self::run_pending`]
    pub fn set_deferred(&self, deferred: bool) {
        self.deferred.set(deferred);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Deliver held callbacks in the order they were requested
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(callback) => {
                    callback();
                    count += 1;
                }
                None => break count,
            }
        }
    }

    /// Deliver held callbacks newest first
    pub fn run_pending_in_reverse(&self) -> usize {
        let mut count = 0;
        loop {
            let next = self.pending.borrow_mut().pop_back();
            match next {
                Some(callback) => {
                    callback();
                    count += 1;
                }
                None => break count,
            }
        }
    }

    fn deliver(&self, callback: Pending) {
        if self.deferred.get() {
            self.pending.borrow_mut().push_back(callback);
        } else {
            callback();
        }
    }

    pub fn open_tab(&self, tab: TabHandle) {
        let mut tabs = self.tabs.borrow_mut();
        tabs.retain(|t| t.handle.id != tab.id);
        tabs.push(MemoryTab {
            handle: tab,
            document: Document::loaded(),
        });
    }

    pub fn close_tab(&self, id: TabId) {
        self.tabs.borrow_mut().retain(|t| t.handle.id != id);
        if self.current.get() == Some(id) {
            self.current.set(None);
        }
    }

    pub fn set_current(&self, id: Option<TabId>) {
        self.current.set(id);
    }

    pub fn tabs(&self) -> Vec<TabHandle> {
        self.tabs.borrow().iter().map(|t| t.handle.clone()).collect()
    }

    pub fn tab(&self, id: TabId) -> Option<TabHandle> {
        self.tabs
            .borrow()
            .iter()
            .find(|t| t.handle.id == id)
            .map(|t| t.handle.clone())
    }

    pub fn document(&self, id: TabId) -> Option<Document> {
        self.tabs
            .borrow()
            .iter()
            .find(|t| t.handle.id == id)
            .map(|t| t.document.clone())
    }

    pub fn marker_count(&self, id: TabId, marker_id: &str) -> usize {
        self.document(id).map(|d| d.count_id(marker_id)).unwrap_or(0)
    }

    pub fn is_styled(&self, id: TabId, marker_id: &str) -> bool {
        self.marker_count(id, marker_id) > 0
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn executions(&self) -> Vec<Execution> {
        self.executions.borrow().clone()
    }

    pub fn take_executions(&self) -> Vec<Execution> {
        std::mem::take(&mut *self.executions.borrow_mut())
    }

    /// Start a navigation: the old document is discarded and listeners see
    /// a `loading` update
    pub fn navigate(&self, id: TabId, url: impl Into<String>) -> bool {
        let handle = {
            let mut tabs = self.tabs.borrow_mut();
            let Some(tab) = tabs.iter_mut().find(|t| t.handle.id == id) else {
                return false;
            };
            tab.handle.url = Some(url.into());
            tab.document = Document::loading();
            tab.handle.clone()
        };
        self.emit(&TabChangeEvent::new(handle, TabStatus::Loading));
        true
    }

    /// Finish loading: the document gets its head and listeners see a
    /// `complete` update
    pub fn complete(&self, id: TabId) -> bool {
        let handle = {
            let mut tabs = self.tabs.borrow_mut();
            let Some(tab) = tabs.iter_mut().find(|t| t.handle.id == id) else {
                return false;
            };
            if tab.document.head.is_none() {
                tab.document.head = Some(Vec::new());
            }
            tab.handle.clone()
        };
        self.emit(&TabChangeEvent::new(handle, TabStatus::Complete));
        true
    }

    /// Deliver `event` to every subscribed listener
    pub fn emit(&self, event: &TabChangeEvent) {
        let listeners: Vec<TabUpdateListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

fn is_internal(url: Option<&str>) -> bool {
    url.map(|u| INTERNAL_SCHEMES.iter().any(|s| u.starts_with(s)))
        .unwrap_or(false)
}

impl BrowserHost for MemoryHost {
    fn current_tab(&self, callback: CurrentTabCallback) {
        let current = self.current.get().and_then(|id| self.tab(id));
        self.deliver(Box::new(move || callback(current)));
    }

    fn query_tabs(&self, query: TabQuery, callback: TabQueryCallback) {
        let tabs = if query.active == Some(true) {
            self.current
                .get()
                .and_then(|id| self.tab(id))
                .into_iter()
                .collect()
        } else {
            self.tabs()
        };
        self.deliver(Box::new(move || callback(tabs)));
    }

    fn subscribe_tab_updates(&self, listener: TabUpdateListener) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_subscription.get() + 1);
        self.next_subscription.set(handle.0);
        self.listeners.borrow_mut().push((handle, listener));
        handle
    }

    fn unsubscribe_tab_updates(&self, handle: SubscriptionHandle) {
        self.listeners.borrow_mut().retain(|(h, _)| *h != handle);
    }

    fn execute_script(&self, target: Option<TabId>, script: PageScript) {
        let resolved = target.or(self.current.get());
        let mut rejected = false;

        if let Some(id) = resolved {
            let mut tabs = self.tabs.borrow_mut();
            if let Some(tab) = tabs.iter_mut().find(|t| t.handle.id == id) {
                if is_internal(tab.handle.url()) {
                    rejected = true;
                } else {
                    tab.document.run(&script);
                }
            }
        }

        self.executions.borrow_mut().push(Execution {
            target,
            resolved,
            script,
            rejected,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::STYLE_MARKER_ID;

    #[test]
    fn test_execute_on_current_tab() {
        let host = MemoryHost::with_tabs([TabHandle::new(1, "https://example.com")]);
        host.set_current(Some(TabId(1)));

        host.execute_script(None, PageScript::inject(STYLE_MARKER_ID, "a{}"));

        assert!(host.is_styled(TabId(1), STYLE_MARKER_ID));
        assert_eq!(host.executions()[0].resolved, Some(TabId(1)));
    }

    #[test]
    fn test_internal_pages_reject_scripts() {
        let host = MemoryHost::with_tabs([TabHandle::new(2, "chrome://settings")]);

        host.execute_script(Some(TabId(2)), PageScript::inject(STYLE_MARKER_ID, "a{}"));

        assert!(!host.is_styled(TabId(2), STYLE_MARKER_ID));
        assert!(host.executions()[0].rejected);
    }

    #[test]
    fn test_navigation_discards_document() {
        let host = MemoryHost::with_tabs([TabHandle::new(1, "https://example.com")]);
        host.execute_script(Some(TabId(1)), PageScript::inject(STYLE_MARKER_ID, "a{}"));

        assert!(host.navigate(TabId(1), "https://example.com/next"));
        assert!(!host.is_styled(TabId(1), STYLE_MARKER_ID));
        assert_eq!(
            host.tab(TabId(1)).unwrap().url.as_deref(),
            Some("https://example.com/next")
        );
        assert!(!host.navigate(TabId(9), "https://nowhere.test"));
    }

    #[test]
    fn test_deferred_callbacks() {
        let host = MemoryHost::with_tabs([TabHandle::new(1, "https://example.com")]);
        host.set_deferred(true);

        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        host.query_tabs(TabQuery::all(), Box::new(move |tabs| sink.set(tabs.len())));

        assert_eq!(seen.get(), 0);
        assert_eq!(host.pending_count(), 1);
        assert_eq!(host.run_pending(), 1);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_handle_is_ignored() {
        let host = MemoryHost::new();
        host.subscribe_tab_updates(Rc::new(|_| {}));
        host.unsubscribe_tab_updates(SubscriptionHandle(42));
        assert_eq!(host.listener_count(), 1);
    }
}
