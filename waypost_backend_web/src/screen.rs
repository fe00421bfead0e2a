// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fullscreen and screen orientation.
//!
//! Both APIs are optional on many browsers. Failures come back as `Err` (or
//! through the rejection callback for the asynchronous orientation lock) and
//! the caller decides whether to log them; nothing here panics.

use alloc::boxed::Box;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, OrientationLockType};

use waypost_core::viewer::OrientationRequest;

/// Returns `true` while some element is fullscreen.
#[must_use]
pub fn is_fullscreen(doc: &Document) -> bool {
    doc.fullscreen_element().is_some()
}

/// Asks the browser to show `el` fullscreen.
pub fn request_fullscreen(el: &Element) -> Result<(), JsValue> {
    el.request_fullscreen()
}

/// Applies an orientation request.
///
/// Locking returns a promise; a rejection is reported to `on_reject` with a
/// printable reason. Unlocking is synchronous.
pub fn apply_orientation(
    request: OrientationRequest,
    on_reject: impl FnMut(JsValue) + 'static,
) -> Result<(), JsValue> {
    let orientation = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .screen()?
        .orientation();
    match request {
        OrientationRequest::LockLandscape => {
            let promise = orientation.lock(OrientationLockType::Landscape)?;
            let catch = Closure::wrap(Box::new(on_reject) as Box<dyn FnMut(JsValue)>);
            let _ = promise.catch(&catch);
            catch.forget();
            Ok(())
        }
        OrientationRequest::Unlock => orientation.unlock(),
    }
}
