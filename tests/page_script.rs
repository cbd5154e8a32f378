//! Page-side behaviour of injection and removal scripts

use dark_starter::page::{Document, Element};
use dark_starter::{ControllerOptions, MemoryHost, PageScript, StaticCssGenerator, StyleDispatcher, STYLE_MARKER_ID};
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn dispatcher() -> StyleDispatcher {
    StyleDispatcher::new(
        Rc::new(StaticCssGenerator::new("body{color:red}")),
        Rc::new(MemoryHost::new()),
        ControllerOptions::default(),
    )
}

#[test]
fn test_injecting_twice_leaves_one_marker() {
    let script = dispatcher().build_injection_script(Some("https://example.com"));
    let mut doc = Document::loaded();

    doc.run(&script);
    doc.run(&script);

    assert_eq!(doc.count_id(STYLE_MARKER_ID), 1);
    assert_eq!(
        doc.get_element_by_id(STYLE_MARKER_ID).map(|e| e.text.as_str()),
        Some("body{color:red}")
    );
}

#[test]
fn test_removal_on_unstyled_page_changes_nothing() {
    let mut doc = Document::loaded();
    doc.head
        .as_mut()
        .unwrap()
        .push(Element::new("style").with_id("site-theme").with_text("p{}"));
    let before = doc.clone();

    doc.run(&dispatcher().build_removal_script());

    assert_eq!(doc, before);
}

#[test]
fn test_remove_then_inject_restores_style() {
    let dispatcher = dispatcher();
    let mut doc = Document::loaded();

    doc.run(&dispatcher.build_injection_script(None));
    doc.run(&dispatcher.build_removal_script());
    assert!(!doc.is_styled(STYLE_MARKER_ID));

    doc.run(&dispatcher.build_injection_script(None));
    assert_eq!(doc.count_id(STYLE_MARKER_ID), 1);
}

#[test]
fn test_custom_marker_id() {
    let options = ControllerOptions {
        marker_id: "night-mode".to_string(),
        ..ControllerOptions::default()
    };
    let dispatcher = StyleDispatcher::new(
        Rc::new(StaticCssGenerator::builtin()),
        Rc::new(MemoryHost::new()),
        options,
    );

    let script = dispatcher.build_injection_script(None);
    assert_eq!(script.marker_id, "night-mode");
    assert!(script.to_js().contains(r#"getElementById("night-mode")"#));
}

#[test]
fn test_scripts_are_self_contained() {
    let inject = PageScript::inject(STYLE_MARKER_ID, "body{color:red}").to_js();
    let remove = PageScript::remove(STYLE_MARKER_ID).to_js();

    for js in [&inject, &remove] {
        assert!(js.starts_with("(function () {"));
        assert!(js.ends_with("})();"));
    }
}
