//! Host browser collaborators
//!
//! The controller talks to the browser only through [`BrowserHost`]. Every
//! call is fire-and-forget: results arrive later through callbacks, and the
//! controller never waits on them.

pub mod memory;
pub mod switch;

pub use memory::{Execution, MemoryHost};
pub use switch::AppSwitch;

use crate::models::{PageScript, TabChangeEvent, TabHandle, TabId, TabQuery};
use std::fmt;
use std::rc::Rc;

/// Receipt for a registered listener; pass it back to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub u64);

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type TabUpdateListener = Rc<dyn Fn(&TabChangeEvent)>;
pub type CurrentTabCallback = Box<dyn FnOnce(Option<TabHandle>)>;
pub type TabQueryCallback = Box<dyn FnOnce(Vec<TabHandle>)>;

pub trait BrowserHost {
    /// Resolve the tab the extension is running in, if any
    fn current_tab(&self, callback: CurrentTabCallback);

    /// List open tabs matching `query`, in host order
    fn query_tabs(&self, query: TabQuery, callback: TabQueryCallback);

    /// Start delivering tab update notifications to `listener`
    fn subscribe_tab_updates(&self, listener: TabUpdateListener) -> SubscriptionHandle;

    /// Stop delivering to the listener behind `handle`. Unknown handles are
    /// ignored.
    fn unsubscribe_tab_updates(&self, handle: SubscriptionHandle);

    /// Run `script` in the page of `target`, or in the current tab when
    /// `target` is `None`
    fn execute_script(&self, target: Option<TabId>, script: PageScript);
}
