// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace sink that writes to the browser console.

use alloc::format;
use alloc::string::String;

use wasm_bindgen::JsValue;

use waypost_core::password::SubmitOutcome;
use waypost_core::trace::{
    ArrivalEvent, CountdownCompleteEvent, CountdownTickEvent, GeoErrorEvent, GeoFixEvent,
    HostErrorEvent, NavTarget, NavigateEvent, PasswordAttemptEvent, TraceSink, UnlockEvent,
};

/// A [`TraceSink`] that logs one console line per event.
///
/// Failures (rejected passwords, location errors, host errors) go to
/// `console.warn`, everything else to `console.log`. Countdown ticks are
/// skipped unless [`with_ticks`](Self::with_ticks) is set, since they arrive
/// every second.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    ticks: bool,
}

impl ConsoleSink {
    /// Creates a sink that skips countdown ticks.
    #[must_use]
    pub const fn new() -> Self {
        Self { ticks: false }
    }

    /// Also logs every countdown tick.
    #[must_use]
    pub const fn with_ticks(mut self) -> Self {
        self.ticks = true;
        self
    }
}

fn log(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

fn warn(line: &str) {
    web_sys::console::warn_1(&JsValue::from_str(line));
}

fn target_label(target: NavTarget) -> String {
    match target {
        NavTarget::Gate => String::from("/"),
        NavTarget::Riddle(step) => format!("/riddle/{step}"),
        NavTarget::Final => String::from("/final"),
    }
}

impl TraceSink for ConsoleSink {
    fn on_countdown_tick(&mut self, e: &CountdownTickEvent) {
        if self.ticks {
            log(&format!(
                "[waypost] countdown remaining={}ms progress={:.1}%",
                e.remaining.millis(),
                e.progress_percent
            ));
        }
    }

    fn on_countdown_complete(&mut self, e: &CountdownCompleteEvent) {
        log(&format!(
            "[waypost] countdown complete, entering in {}ms",
            e.notify_after.millis()
        ));
    }

    fn on_password_attempt(&mut self, e: &PasswordAttemptEvent) {
        match e.outcome {
            SubmitOutcome::Accepted => log(&format!("[waypost] riddle {} unlocked", e.step)),
            SubmitOutcome::Rejected => warn(&format!("[waypost] riddle {} wrong password", e.step)),
            SubmitOutcome::Empty => {}
        }
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        log(&format!(
            "[waypost] riddle {} clue unlocked ({})",
            e.step,
            e.reason.as_str()
        ));
    }

    fn on_geo_fix(&mut self, e: &GeoFixEvent) {
        log(&format!(
            "[waypost] fix lat={:.6} lon={:.6} acc={:.0}m dist={:.0}m near={}",
            e.latitude, e.longitude, e.accuracy_m, e.distance_m, e.near
        ));
    }

    fn on_geo_error(&mut self, e: &GeoErrorEvent) {
        let phase = if e.initial { "initial" } else { "watch" };
        warn(&format!("[waypost] location error ({phase}): {}", e.error));
    }

    fn on_arrival(&mut self, e: &ArrivalEvent) {
        log(&format!("[waypost] arrived, {:.0}m from destination", e.distance_m));
    }

    fn on_navigate(&mut self, e: &NavigateEvent) {
        let verb = if e.redirect { "redirect" } else { "navigate" };
        log(&format!("[waypost] {verb} -> {}", target_label(e.to)));
    }

    fn on_host_error(&mut self, e: &HostErrorEvent<'_>) {
        warn(&format!("[waypost] {} failed: {}", e.op.as_str(), e.detail));
    }
}
