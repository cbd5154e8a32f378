//! WebAssembly bindings: run the controller inside an extension background
//! page against the real `chrome.tabs` API

use crate::controller::ExtensionController;
use crate::generator::config::parse_stylesheets_from_str;
use crate::generator::{CssGenerator, StaticCssGenerator};
use crate::host::{
    AppSwitch, BrowserHost, CurrentTabCallback, SubscriptionHandle, TabQueryCallback,
    TabUpdateListener,
};
use crate::models::{PageScript, TabChangeEvent, TabHandle, TabId, TabQuery, TabStatus};
use crate::ControllerOptions;
use js_sys::{Array, Function, Object, Reflect};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

macro_rules! console_log {
    ($($t:tt)*) => (web_sys::console::log_1(&JsValue::from_str(&format_args!($($t)*).to_string())))
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

type UpdateClosure = Closure<dyn Fn(JsValue, JsValue, JsValue)>;

/// [`BrowserHost`] over a `chrome.tabs` namespace object
struct ChromeTabsHost {
    tabs: JsValue,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<SubscriptionHandle, UpdateClosure>>,
}

impl ChromeTabsHost {
    fn new(tabs: JsValue) -> Self {
        Self {
            tabs,
            next_id: Cell::new(1),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    fn call(&self, target: &JsValue, name: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
        let function: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
        match args {
            [] => function.call0(target),
            [a] => function.call1(target, a),
            [a, b] => function.call2(target, a, b),
            _ => Err(JsValue::from_str("too many arguments")),
        }
    }

    fn on_updated(&self) -> Result<JsValue, JsValue> {
        Reflect::get(&self.tabs, &JsValue::from_str("onUpdated"))
    }

    fn report(&self, what: &str, result: Result<JsValue, JsValue>) {
        if let Err(e) = result {
            console_log!("dark-starter: tabs.{} failed: {:?}", what, e);
        }
    }
}

fn tab_from_js(value: &JsValue) -> Option<TabHandle> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    let id = Reflect::get(value, &JsValue::from_str("id")).ok()?.as_f64()?;
    let url = Reflect::get(value, &JsValue::from_str("url"))
        .ok()
        .and_then(|u| u.as_string());
    Some(TabHandle {
        id: TabId(id as i64),
        url,
    })
}

fn query_to_js(query: &TabQuery) -> Result<JsValue, JsValue> {
    let object = Object::new();
    if let Some(active) = query.active {
        Reflect::set(&object, &JsValue::from_str("active"), &JsValue::from_bool(active))?;
    }
    if let Some(current_window) = query.current_window {
        Reflect::set(
            &object,
            &JsValue::from_str("currentWindow"),
            &JsValue::from_bool(current_window),
        )?;
    }
    Ok(object.into())
}

fn details_to_js(script: &PageScript) -> Result<JsValue, JsValue> {
    let object = Object::new();
    Reflect::set(&object, &JsValue::from_str("code"), &JsValue::from_str(&script.to_js()))?;
    if let Some(run_at) = script.run_at.as_host_str() {
        Reflect::set(&object, &JsValue::from_str("runAt"), &JsValue::from_str(run_at))?;
    }
    Ok(object.into())
}

impl BrowserHost for ChromeTabsHost {
    fn current_tab(&self, callback: CurrentTabCallback) {
        let callback = Closure::once_into_js(move |tab: JsValue| callback(tab_from_js(&tab)));
        let result = self.call(&self.tabs, "getCurrent", &[&callback]);
        self.report("getCurrent", result);
    }

    fn query_tabs(&self, query: TabQuery, callback: TabQueryCallback) {
        let callback = Closure::once_into_js(move |tabs: JsValue| {
            let tabs: Vec<TabHandle> = Array::from(&tabs)
                .iter()
                .filter_map(|t| tab_from_js(&t))
                .collect();
            callback(tabs)
        });
        let result = query_to_js(&query)
            .and_then(|query| self.call(&self.tabs, "query", &[&query, &callback]));
        self.report("query", result);
    }

    fn subscribe_tab_updates(&self, listener: TabUpdateListener) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);

        let closure: UpdateClosure = Closure::new(move |tab_id: JsValue, info: JsValue, tab: JsValue| {
            let Some(tab_id) = tab_id.as_f64() else {
                return;
            };
            let status = Reflect::get(&info, &JsValue::from_str("status"))
                .ok()
                .and_then(|s| s.as_string())
                .map(|s| TabStatus::parse(&s));
            let tab = tab_from_js(&tab).unwrap_or_else(|| TabHandle::without_url(tab_id as i64));
            listener(&TabChangeEvent {
                tab_id: TabId(tab_id as i64),
                status,
                tab,
            });
        });

        let result = self
            .on_updated()
            .and_then(|event| self.call(&event, "addListener", &[closure.as_ref()]));
        self.report("onUpdated.addListener", result);
        self.listeners.borrow_mut().insert(handle, closure);
        handle
    }

    fn unsubscribe_tab_updates(&self, handle: SubscriptionHandle) {
        let Some(closure) = self.listeners.borrow_mut().remove(&handle) else {
            return;
        };
        let result = self
            .on_updated()
            .and_then(|event| self.call(&event, "removeListener", &[closure.as_ref()]));
        self.report("onUpdated.removeListener", result);
    }

    fn execute_script(&self, target: Option<TabId>, script: PageScript) {
        let target = match target {
            Some(id) => JsValue::from_f64(id.0 as f64),
            None => JsValue::NULL,
        };
        let result = details_to_js(&script)
            .and_then(|details| self.call(&self.tabs, "executeScript", &[&target, &details]));
        self.report("executeScript", result);
    }
}

/// Extension background entry point.
///
/// ```js
/// const starter = new DarkStarter(chrome.tabs, true);
/// button.onclick = () => starter.toggle();
/// ```
#[wasm_bindgen]
pub struct DarkStarter {
    controller: Rc<ExtensionController>,
    switch: AppSwitch,
}

#[wasm_bindgen]
impl DarkStarter {
    /// Start with the builtin stylesheet
    #[wasm_bindgen(constructor)]
    pub fn new(tabs: JsValue, enabled: bool) -> DarkStarter {
        Self::build(tabs, enabled, Rc::new(StaticCssGenerator::builtin()))
    }

    /// Start with stylesheets from a JSON5 configuration
    #[wasm_bindgen(js_name = withStylesheets)]
    pub fn with_stylesheets(tabs: JsValue, enabled: bool, config: &str) -> Result<DarkStarter, JsValue> {
        let generator = parse_stylesheets_from_str(config)
            .and_then(StaticCssGenerator::from_config)
            .map_err(|e| JsValue::from_str(&format!("Invalid stylesheets: {:#}", e)))?;
        Ok(Self::build(tabs, enabled, Rc::new(generator)))
    }

    fn build(tabs: JsValue, enabled: bool, generator: Rc<dyn CssGenerator>) -> DarkStarter {
        let host = Rc::new(ChromeTabsHost::new(tabs));
        let switch = AppSwitch::new(enabled);
        let controller = ExtensionController::new(generator, host, ControllerOptions::default());
        controller.attach(&switch);
        console_log!("dark-starter: attached ({})", if enabled { "on" } else { "off" });
        DarkStarter { controller, switch }
    }

    #[wasm_bindgen(js_name = setEnabled)]
    pub fn set_enabled(&self, enabled: bool) {
        self.switch.set(enabled);
    }

    pub fn toggle(&self) {
        self.switch.toggle();
    }

    #[wasm_bindgen(getter, js_name = isEnabled)]
    pub fn is_enabled(&self) -> bool {
        self.controller.is_enabled()
    }
}
