// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small DOM helpers shared by the views.

use alloc::boxed::Box;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement};

use waypost_core::subscription::Cancel;

/// Returns the current document.
pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Creates an element with the given tag.
pub fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

/// Creates an element with inline style and text content.
pub fn text_element(
    doc: &Document,
    tag: &str,
    css: &str,
    text: &str,
) -> Result<HtmlElement, JsValue> {
    let el = element(doc, tag)?;
    style(&el, css)?;
    el.set_text_content(Some(text));
    Ok(el)
}

/// Replaces the inline style of `el`.
pub fn style(el: &Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}

/// Shows or hides `el` without touching the rest of its style.
pub fn set_visible(el: &HtmlElement, visible: bool) -> Result<(), JsValue> {
    el.style()
        .set_property("display", if visible { "" } else { "none" })
}

/// Removes every child of `el`.
pub fn clear(el: &Element) {
    while let Some(child) = el.first_child() {
        let _ = el.remove_child(&child);
    }
}

/// An event listener that is removed when cancelled or dropped.
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Option<Closure<dyn FnMut(Event)>>,
}

impl Listener {
    /// Registers `callback` for `kind` events on `target`.
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure: Some(closure),
        })
    }
}

impl Cancel for Listener {
    fn cancel(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for Listener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listener")
            .field("kind", &self.kind)
            .field("active", &self.closure.is_some())
            .finish_non_exhaustive()
    }
}
