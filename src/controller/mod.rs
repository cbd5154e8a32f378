//! Enablement state machine
//!
//! ```text
//! [Disabled] --on_switch(true)--> [Enabled]   subscribe, style current + all tabs
//! [Enabled]  --on_switch(false)-> [Disabled]  unsubscribe, unstyle current + all tabs
//! [Enabled]  --tab "loading"----> [Enabled]   style the navigating tab
//! ```

pub mod dispatch;

pub use dispatch::StyleDispatcher;

use crate::generator::CssGenerator;
use crate::host::{AppSwitch, BrowserHost, SubscriptionHandle, TabUpdateListener};
use crate::models::TabChangeEvent;
use crate::ControllerOptions;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace};

/// The subscription handle lives inside `Enabled`, so the listener is
/// registered exactly while the controller is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnablementState {
    Disabled,
    Enabled { subscription: SubscriptionHandle },
}

pub struct ExtensionController {
    state: RefCell<EnablementState>,
    dispatcher: StyleDispatcher,
}

impl ExtensionController {
    /// Create a disabled controller. Nothing touches tabs until the first
    /// switch notification.
    pub fn new(
        generator: Rc<dyn CssGenerator>,
        host: Rc<dyn BrowserHost>,
        options: ControllerOptions,
    ) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(EnablementState::Disabled),
            dispatcher: StyleDispatcher::new(generator, host, options),
        })
    }

    /// Follow `switch` from now on, starting from the value it currently
    /// reports
    pub fn attach(self: &Rc<Self>, switch: &AppSwitch) -> SubscriptionHandle {
        let controller: Weak<Self> = Rc::downgrade(self);
        let handle = switch.subscribe(Rc::new(move |enabled| {
            if let Some(controller) = controller.upgrade() {
                controller.on_switch(enabled);
            }
        }));
        self.on_switch(switch.is_enabled());
        handle
    }

    pub fn is_enabled(&self) -> bool {
        matches!(*self.state.borrow(), EnablementState::Enabled { .. })
    }

    /// Handle of the tab-update listener, present only while enabled
    pub fn subscription(&self) -> Option<SubscriptionHandle> {
        match *self.state.borrow() {
            EnablementState::Enabled { subscription } => Some(subscription),
            EnablementState::Disabled => None,
        }
    }

    pub fn dispatcher(&self) -> &StyleDispatcher {
        &self.dispatcher
    }

    pub fn on_switch(&self, enabled: bool) {
        if enabled {
            self.switch_on();
        } else {
            self.switch_off();
        }
    }

    /// React to a tab update as the registered listener would. Ignored
    /// while disabled.
    pub fn on_tab_updated(&self, event: &TabChangeEvent) {
        if !self.is_enabled() {
            trace!(tab_id = %event.tab_id, "disabled, ignoring tab update");
            return;
        }
        handle_tab_update(&self.dispatcher, event);
    }

    fn switch_on(&self) {
        if self.is_enabled() {
            debug!("already enabled");
            return;
        }

        let subscription = self
            .dispatcher
            .host()
            .subscribe_tab_updates(self.tab_listener());
        *self.state.borrow_mut() = EnablementState::Enabled { subscription };
        info!(%subscription, "switched on");

        self.dispatcher.add_css_to_current_tab();
        self.dispatcher.add_css_to_all_tabs();
    }

    fn switch_off(&self) {
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), EnablementState::Disabled);
        match previous {
            EnablementState::Enabled { subscription } => {
                self.dispatcher.host().unsubscribe_tab_updates(subscription);
                info!(%subscription, "switched off");
            }
            EnablementState::Disabled => debug!("already disabled"),
        }

        self.dispatcher.remove_css_from_tab(None);
        self.dispatcher.remove_css_from_all_tabs();
    }

    fn tab_listener(&self) -> TabUpdateListener {
        let dispatcher = self.dispatcher.clone();
        Rc::new(move |event: &TabChangeEvent| handle_tab_update(&dispatcher, event))
    }
}

impl Drop for ExtensionController {
    /// A discarded controller must not leave its tab listener behind
    fn drop(&mut self) {
        if let EnablementState::Enabled { subscription } = *self.state.get_mut() {
            self.dispatcher.host().unsubscribe_tab_updates(subscription);
            debug!(%subscription, "controller dropped, listener released");
        }
    }
}

fn handle_tab_update(dispatcher: &StyleDispatcher, event: &TabChangeEvent) {
    trace!(tab_id = %event.tab_id, status = ?event.status, "tab updated");
    if event.is_navigation_start() {
        dispatcher.add_css_to_tab(Some(&event.tab));
    }
}
