// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared styles and element builders.

use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement};

use waypost_backend_web::dom;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

pub(crate) const PAGE: &str = "min-height: 100vh; margin: 0; padding: 24px 16px; box-sizing: border-box; display: grid; place-items: center; font-family: system-ui, sans-serif; color: #f5f1e8; background: radial-gradient(circle at 30% 20%, #2b2f4a, #101222 70%);";

pub(crate) const CARD: &str = "width: min(680px, 100%); padding: 24px; border-radius: 18px; background: rgba(255,255,255,0.06); border: 1px solid rgba(255,255,255,0.12); box-shadow: 0 24px 60px rgba(0,0,0,0.35); display: grid; gap: 16px; justify-items: center; text-align: center;";

pub(crate) const TITLE: &str = "margin: 0; font-size: 28px; letter-spacing: 0.04em;";

pub(crate) const MUTED: &str = "margin: 0; font-size: 15px; color: #c9c3b6;";

pub(crate) const ERROR: &str = "margin: 0; font-size: 15px; color: #ff8a80;";

pub(crate) const BUTTON: &str = "padding: 10px 18px; border-radius: 10px; border: 0; font-size: 16px; font-weight: 600; background: #e0b85a; color: #1a1407; cursor: pointer;";

pub(crate) const BUTTON_QUIET: &str = "padding: 10px 18px; border-radius: 10px; border: 1px solid rgba(255,255,255,0.3); font-size: 16px; background: transparent; color: #f5f1e8; cursor: pointer;";

pub(crate) const OVERLAY: &str = "position: fixed; inset: 0; display: grid; place-items: center; background: rgba(8,9,20,0.75); z-index: 10;";

pub(crate) const DIALOG: &str = "width: min(420px, 90vw); padding: 24px; border-radius: 16px; background: #1d2036; display: grid; gap: 14px; text-align: center;";

/// Creates an element in the SVG namespace.
pub(crate) fn svg(doc: &Document, tag: &str) -> Result<Element, JsValue> {
    doc.create_element_ns(Some(SVG_NS), tag)
}

/// Sets several attributes at once.
pub(crate) fn attrs(el: &Element, pairs: &[(&str, &str)]) -> Result<(), JsValue> {
    for (name, value) in pairs {
        el.set_attribute(name, value)?;
    }
    Ok(())
}

/// Creates a styled button with a label.
pub(crate) fn button(doc: &Document, label: &str, css: &str) -> Result<HtmlButtonElement, JsValue> {
    let el: HtmlButtonElement = doc.create_element("button")?.unchecked_into();
    dom::style(&el, css)?;
    el.set_type("button");
    el.set_text_content(Some(label));
    Ok(el)
}

/// Creates a styled card section and appends it to `parent`.
pub(crate) fn card(doc: &Document, parent: &HtmlElement) -> Result<HtmlElement, JsValue> {
    let el = dom::element(doc, "section")?;
    dom::style(&el, CARD)?;
    parent.append_child(&el)?;
    Ok(el)
}
