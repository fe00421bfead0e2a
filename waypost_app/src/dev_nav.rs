// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Developer navigation overlay: jump links to every screen.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, Event, HtmlAnchorElement, HtmlElement};

use waypost_backend_web::dom;
use waypost_core::riddle::RiddleTable;
use waypost_core::route::Route;

use crate::shell::Shell;

const NAV: &str = "position: fixed; right: 12px; bottom: 12px; z-index: 20; display: flex; gap: 6px; flex-wrap: wrap; padding: 8px; border-radius: 10px; background: rgba(0,0,0,0.6); font: 13px system-ui, sans-serif;";

const LINK: &str = "color: #e0b85a; text-decoration: none; padding: 2px 6px;";

/// Attribute carrying the target path on each link.
const PATH_ATTR: &str = "data-path";

/// Labels and paths for every screen, in hunt order.
fn links(riddles: &RiddleTable) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(riddles.len() + 2);
    out.push((String::from("Início"), Route::Gate.path()));
    for entry in riddles.entries() {
        out.push((
            format!("Enigma {}", entry.path),
            Route::riddle(&entry.path).path(),
        ));
    }
    out.push((String::from("Mapa"), Route::Final.path()));
    out
}

/// Adds the overlay to `body`. It lives as long as the page.
pub(crate) fn mount(shell: &Rc<Shell>, body: &HtmlElement) -> Result<(), JsValue> {
    let doc = &shell.doc;
    let nav = dom::element(doc, "nav")?;
    dom::style(&nav, NAV)?;
    for (label, path) in links(&shell.config.riddles) {
        let link: HtmlAnchorElement = doc.create_element("a")?.unchecked_into();
        dom::style(&link, LINK)?;
        link.set_href(&path);
        link.set_attribute(PATH_ATTR, &path)?;
        link.set_text_content(Some(&label));
        nav.append_child(&link)?;
    }

    let shell = Rc::clone(shell);
    let on_click = Closure::wrap(Box::new(move |e: Event| {
        let path = e
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.get_attribute(PATH_ATTR));
        if let Some(path) = path {
            e.prevent_default();
            shell.navigate(path);
        }
    }) as Box<dyn FnMut(_)>);
    nav.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    body.append_child(&nav)?;
    Ok(())
}
