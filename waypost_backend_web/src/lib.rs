// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for waypost.
//!
//! This crate wires `waypost_core` state machines to browser APIs:
//!
//! - [`now`] and [`WebClock`]: wall-clock time from `Date.now()`
//! - [`Interval`] and [`Timeout`]: `setInterval` / `setTimeout` handles,
//!   plus [`defer`] for fire-and-forget work
//! - [`RafLoop`]: `requestAnimationFrame` loop
//! - [`PositionWatch`] and [`locate_once`]: geolocation
//! - [`screen`]: fullscreen and orientation helpers
//! - [`location`]: path, query string and history
//! - [`dom`]: element helpers and removable event listeners
//! - [`ConsoleSink`]: a [`TraceSink`](waypost_core::trace::TraceSink) writing
//!   to the browser console
//!
//! Every handle that keeps a callback alive implements
//! [`Cancel`](waypost_core::subscription::Cancel), so views can park them in
//! a [`Subscriptions`](waypost_core::subscription::Subscriptions) bag.

#![no_std]

extern crate alloc;

mod console;
pub mod dom;
mod geolocation;
pub mod location;
mod raf;
pub mod screen;
mod timers;

pub use console::ConsoleSink;
pub use geolocation::{CurrentPosition, PositionWatch, locate_once};
pub use raf::RafLoop;
pub use timers::{Interval, Timeout, defer};

use waypost_core::clock::Clock;
use waypost_core::time::Timestamp;

/// Returns the current wall-clock time from `Date.now()`.
#[must_use]
pub fn now() -> Timestamp {
    Timestamp::from_js_millis(js_sys::Date::now())
}

/// [`Clock`] backed by [`now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct WebClock;

impl Clock for WebClock {
    fn now(&self) -> Timestamp {
        now()
    }
}
