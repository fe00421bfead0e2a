// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser application for the waypost scavenger hunt.
//!
//! One page, three kinds of screen:
//!
//! - `/`: the countdown gate, or a redirect to the first riddle once the hunt
//!   is open (or the developer override is on);
//! - `/riddle/:step`: a password form that reveals a video, and a clue panel
//!   that unlocks once enough of the video has been watched;
//! - `/final`: the live map to the destination.
//!
//! The hunt is configured by an optional
//! `<script id="waypost-config" type="application/json">` block in the page.
//! Without it (or if it is invalid) the built-in hunt is used.
//!
//! Build with: `wasm-pack build --target web waypost_app`
//! Then serve the page that loads the generated module. The server must
//! answer every path with that page so deep links from QR codes work.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

mod config;
mod dev_nav;
mod gate;
mod map;
mod riddle;
mod shell;
mod ui;

use alloc::boxed::Box;
use alloc::rc::Rc;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::Event;

use waypost_backend_web::{ConsoleSink, dom, location};
use waypost_core::gate::DevOverride;
use waypost_core::route::Query;
use waypost_core::trace::HostOp;

use crate::shell::Shell;

/// Entry point.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let doc = dom::document()?;
    let body = doc
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let mut sink = ConsoleSink::new();
    let config = config::load(&doc, &mut sink);
    let query = Query::parse(&location::search()?);
    let gate = config.gate_config(&chrono::Local, cfg!(feature = "dev"));
    let dev_mode = DevOverride::resolve(&gate, &query).active;

    let root = dom::element(&doc, "main")?;
    dom::style(&root, ui::PAGE)?;
    body.append_child(&root)?;

    let shell = Rc::new(Shell::new(doc, root, config, gate, query, sink));

    if dev_mode {
        dev_nav::mount(&shell, &body)?;
    }

    {
        let shell = Rc::clone(&shell);
        let on_popstate = Closure::wrap(Box::new(move |_e: Event| {
            match location::pathname() {
                Ok(path) => shell.show(&path),
                Err(err) => shell.host_error(HostOp::History, &err),
            }
        }) as Box<dyn FnMut(_)>);
        web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))?
            .add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())?;
        on_popstate.forget();
    }

    shell.show(&location::pathname()?);
    Ok(())
}
