//! The external on/off signal

use super::SubscriptionHandle;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type SwitchHandler = Rc<dyn Fn(bool)>;

/// Source of enablement changes.
///
/// Every [`AppSwitch::set`] is delivered to every handler, including repeats
/// of the current value.
pub struct AppSwitch {
    enabled: Cell<bool>,
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionHandle, SwitchHandler)>>,
}

impl AppSwitch {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Cell::new(enabled),
            next_id: Cell::new(1),
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn subscribe(&self, handler: SwitchHandler) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);
        self.handlers.borrow_mut().push((handle, handler));
        handle
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.handlers.borrow_mut().retain(|(h, _)| *h != handle);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Record `enabled` and notify all handlers
    pub fn set(&self, enabled: bool) {
        self.enabled.set(enabled);
        // Handlers may subscribe or unsubscribe while running
        let handlers: Vec<SwitchHandler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(enabled);
        }
    }

    pub fn toggle(&self) {
        self.set(!self.is_enabled());
    }
}

impl Default for AppSwitch {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_delivered() {
        let switch = AppSwitch::new(false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        switch.subscribe(Rc::new(move |v| sink.borrow_mut().push(v)));

        switch.set(true);
        switch.set(true);
        switch.toggle();

        assert_eq!(*seen.borrow(), vec![true, true, false]);
        assert!(!switch.is_enabled());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let switch = AppSwitch::default();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let handle = switch.subscribe(Rc::new(move |_| counter.set(counter.get() + 1)));

        switch.set(true);
        switch.unsubscribe(handle);
        switch.set(false);

        assert_eq!(count.get(), 1);
        assert_eq!(switch.handler_count(), 0);
    }
}
