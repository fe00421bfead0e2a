// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setInterval` and `setTimeout` handles.
//!
//! Both handles own the JS closure they registered. Cancelling (or dropping)
//! clears the host timer first and then releases the closure, so a cancelled
//! timer never calls back.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use waypost_core::subscription::Cancel;
use waypost_core::time::Duration;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setInterval")]
    fn set_interval(callback: &JsValue, ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearInterval")]
    fn clear_interval(id: i32);

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

fn delay_ms(d: Duration) -> i32 {
    i32::try_from(d.millis()).unwrap_or(i32::MAX)
}

/// Runs `f` from a fresh task after the current callback returns.
///
/// The callback frees itself once it has run, so there is no handle. Use it
/// to tear down the view whose listener is currently executing.
pub fn defer(f: impl FnOnce() + 'static) {
    let callback = Closure::once_into_js(f);
    set_timeout(&callback, 0);
}

/// A recurring timer.
pub struct Interval {
    id: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
}

impl Interval {
    /// Calls `callback` every `period` until cancelled.
    pub fn new(period: Duration, callback: impl FnMut() + 'static) -> Self {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        let id = set_interval(closure.as_ref().unchecked_ref(), delay_ms(period));
        Self {
            id: Some(id),
            closure: Some(closure),
        }
    }
}

impl Cancel for Interval {
    fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            clear_interval(id);
        }
        self.closure.take();
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Interval").field("id", &self.id).finish_non_exhaustive()
    }
}

/// A one-shot timer.
///
/// The closure stays alive until the handle is cancelled or dropped. Once the
/// callback has returned the handle reports itself
/// [spent](Cancel::is_spent), so a [`Subscriptions`] bag releases it on its
/// next push.
///
/// [`Subscriptions`]: waypost_core::subscription::Subscriptions
pub struct Timeout {
    id: Option<i32>,
    fired: Rc<Cell<bool>>,
    closure: Option<Closure<dyn FnMut()>>,
}

impl Timeout {
    /// Calls `callback` once after `delay` unless cancelled first.
    pub fn new(delay: Duration, callback: impl FnOnce() + 'static) -> Self {
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(f) = callback.take() {
                f();
                flag.set(true);
            }
        }) as Box<dyn FnMut()>);
        let id = set_timeout(closure.as_ref().unchecked_ref(), delay_ms(delay));
        Self {
            id: Some(id),
            fired,
            closure: Some(closure),
        }
    }
}

impl Cancel for Timeout {
    fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            clear_timeout(id);
        }
        self.closure.take();
    }

    fn is_spent(&self) -> bool {
        self.fired.get()
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for Timeout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Timeout")
            .field("id", &self.id)
            .field("fired", &self.fired.get())
            .finish_non_exhaustive()
    }
}
