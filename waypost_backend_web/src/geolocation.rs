// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Location requests through `navigator.geolocation`.
//!
//! Positions are converted to [`GeoFix`] and errors to [`GeoError`] before
//! they reach caller code. A browser without the Geolocation API yields
//! [`GeoError::Unsupported`] up front instead of registering anything.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Geolocation, Position, PositionError, PositionOptions};

use waypost_core::geo::{GeoFix, GeoPoint};
use waypost_core::navigator::{GeoError, LocateOptions};
use waypost_core::subscription::Cancel;
use waypost_core::time::{Duration, Timestamp};

type FixClosure = Closure<dyn FnMut(Position)>;
type ErrorClosure = Closure<dyn FnMut(PositionError)>;

fn geolocation() -> Result<Geolocation, GeoError> {
    let navigator = web_sys::window()
        .ok_or(GeoError::Unsupported)?
        .navigator();
    let present = js_sys::Reflect::has(&navigator, &JsValue::from_str("geolocation"))
        .unwrap_or(false);
    if !present {
        return Err(GeoError::Unsupported);
    }
    navigator.geolocation().map_err(|_| GeoError::Unsupported)
}

fn clamp_ms(d: Duration) -> u32 {
    u32::try_from(d.millis()).unwrap_or(u32::MAX)
}

fn position_options(options: &LocateOptions) -> PositionOptions {
    let opts = PositionOptions::new();
    opts.set_enable_high_accuracy(options.high_accuracy);
    opts.set_timeout(clamp_ms(options.timeout));
    opts.set_maximum_age(clamp_ms(options.maximum_age));
    opts
}

fn to_fix(position: &Position) -> GeoFix {
    let coords = position.coords();
    GeoFix {
        point: GeoPoint::new(coords.latitude(), coords.longitude()),
        accuracy_m: coords.accuracy(),
        timestamp: Timestamp::from_js_millis(position.timestamp()),
    }
}

fn to_error(error: &PositionError) -> GeoError {
    GeoError::from_code(error.code())
}

/// A single position request.
///
/// The browser calls back exactly once, with a fix or with an error. After
/// [`cancel`](Cancel::cancel) the result is discarded.
#[derive(Debug)]
pub struct CurrentPosition {
    cancelled: Rc<Cell<bool>>,
}

impl Cancel for CurrentPosition {
    fn cancel(&mut self) {
        self.cancelled.set(true);
    }
}

/// Requests one position fix.
///
/// The callbacks are released by the browser once it answers, so the
/// returned handle only needs to be kept to be able to cancel.
pub fn locate_once(
    options: &LocateOptions,
    on_fix: impl FnOnce(GeoFix) + 'static,
    on_error: impl FnOnce(GeoError) + 'static,
) -> Result<CurrentPosition, GeoError> {
    let geo = geolocation()?;
    let cancelled = Rc::new(Cell::new(false));

    let fix_flag = Rc::clone(&cancelled);
    let success = Closure::once_into_js(move |position: Position| {
        if !fix_flag.get() {
            on_fix(to_fix(&position));
        }
    });
    let err_flag = Rc::clone(&cancelled);
    let failure = Closure::once_into_js(move |error: PositionError| {
        if !err_flag.get() {
            on_error(to_error(&error));
        }
    });

    geo.get_current_position_with_error_callback_and_options(
        success.unchecked_ref(),
        Some(failure.unchecked_ref()),
        &position_options(options),
    )
    .map_err(|_| GeoError::Unavailable)?;

    Ok(CurrentPosition { cancelled })
}

/// A continuous `watchPosition` subscription.
///
/// Cancelling (or dropping) calls `clearWatch` and releases both callbacks.
pub struct PositionWatch {
    geo: Geolocation,
    id: Option<i32>,
    closures: Option<(FixClosure, ErrorClosure)>,
}

impl PositionWatch {
    /// Starts watching. `on_fix` is called for every new position and
    /// `on_error` for every failure; the watch stays active after errors.
    pub fn start(
        options: &LocateOptions,
        on_fix: impl FnMut(GeoFix) + 'static,
        on_error: impl FnMut(GeoError) + 'static,
    ) -> Result<Self, GeoError> {
        let geo = geolocation()?;

        let mut on_fix = on_fix;
        let success = Closure::wrap(Box::new(move |position: Position| {
            on_fix(to_fix(&position));
        }) as Box<dyn FnMut(Position)>);

        let mut on_error = on_error;
        let failure = Closure::wrap(Box::new(move |error: PositionError| {
            on_error(to_error(&error));
        }) as Box<dyn FnMut(PositionError)>);

        let id = geo
            .watch_position_with_error_callback_and_options(
                success.as_ref().unchecked_ref(),
                Some(failure.as_ref().unchecked_ref()),
                &position_options(options),
            )
            .map_err(|_| GeoError::Unavailable)?;

        Ok(Self {
            geo,
            id: Some(id),
            closures: Some((success, failure)),
        })
    }

}

impl Cancel for PositionWatch {
    fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.geo.clear_watch(id);
        }
        self.closures.take();
    }
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for PositionWatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PositionWatch")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_durations_saturate_at_u32() {
        assert_eq!(clamp_ms(Duration::from_secs(10)), 10_000);
        assert_eq!(clamp_ms(Duration::from_millis(u64::MAX)), u32::MAX);
    }
}
