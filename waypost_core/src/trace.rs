// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks for the hunt.
//!
//! Views report what happened (a countdown tick, a password attempt, a
//! location fix, a navigation) through a [`Tracer`], which forwards to a
//! [`TraceSink`]. Every sink method defaults to a no-op, so a sink only
//! implements the events it cares about.
//!
//! With the `trace` feature **off**, every [`Tracer`] method compiles to
//! nothing. With it **on**, each method is one `Option` branch before the
//! dispatch.
//!
//! Sinks live elsewhere: the browser console sink in `waypost_backend_web`,
//! and the pretty-printer, recorder and Chrome-trace exporter in
//! `waypost_debug`.

use crate::navigator::GeoError;
use crate::password::SubmitOutcome;
use crate::route::Route;
use crate::time::{Duration, Timestamp};
use crate::viewer::UnlockReason;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Navigation target, without the riddle step's string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavTarget {
    /// `/`
    Gate,
    /// `/riddle/:step`. Zero for a non-numeric step.
    Riddle(usize),
    /// `/final`
    Final,
}

impl From<&Route> for NavTarget {
    fn from(route: &Route) -> Self {
        match route {
            Route::Gate => Self::Gate,
            Route::Riddle(step) => Self::Riddle(step.parse().unwrap_or(0)),
            Route::Final => Self::Final,
        }
    }
}

/// Which host capability failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostOp {
    /// Entering or leaving fullscreen.
    Fullscreen,
    /// Locking or unlocking the screen orientation.
    Orientation,
    /// Starting or stopping a location request.
    Geolocation,
    /// Scheduling a timer or animation frame.
    Timer,
    /// Updating the location bar.
    History,
    /// Reading the embedded configuration.
    Config,
    /// Building or updating the page.
    Dom,
}

impl HostOp {
    /// Short lower-case name, for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fullscreen => "fullscreen",
            Self::Orientation => "orientation",
            Self::Geolocation => "geolocation",
            Self::Timer => "timer",
            Self::History => "history",
            Self::Config => "config",
            Self::Dom => "dom",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted on every countdown tick that is still running.
#[derive(Clone, Copy, Debug)]
pub struct CountdownTickEvent {
    /// When the tick ran.
    pub at: Timestamp,
    /// Time left to the target.
    pub remaining: Duration,
    /// Progress in `[0, 100]`.
    pub progress_percent: f64,
}

/// Emitted once when the countdown reaches its target.
#[derive(Clone, Copy, Debug)]
pub struct CountdownCompleteEvent {
    /// When completion was observed.
    pub at: Timestamp,
    /// Delay before the completion callback.
    pub notify_after: Duration,
}

/// Emitted for every non-empty password submission.
#[derive(Clone, Copy, Debug)]
pub struct PasswordAttemptEvent {
    /// When the attempt was made.
    pub at: Timestamp,
    /// Riddle step, 1-based.
    pub step: usize,
    /// What happened.
    pub outcome: SubmitOutcome,
}

/// Emitted once when a clue panel unlocks.
#[derive(Clone, Copy, Debug)]
pub struct UnlockEvent {
    /// When it unlocked.
    pub at: Timestamp,
    /// Riddle step, 1-based.
    pub step: usize,
    /// What triggered it.
    pub reason: UnlockReason,
}

/// Emitted for every location fix.
#[derive(Clone, Copy, Debug)]
pub struct GeoFixEvent {
    /// When the fix was taken.
    pub at: Timestamp,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Reported accuracy in meters.
    pub accuracy_m: f64,
    /// Distance to the destination in meters.
    pub distance_m: f64,
    /// Whether this fix is inside the arrival radius.
    pub near: bool,
}

/// Emitted for every location error.
#[derive(Clone, Copy, Debug)]
pub struct GeoErrorEvent {
    /// When the error arrived.
    pub at: Timestamp,
    /// What went wrong.
    pub error: GeoError,
    /// `true` for the initial request (terminal), `false` for the watch.
    pub initial: bool,
}

/// Emitted once when the participant first reaches the destination.
#[derive(Clone, Copy, Debug)]
pub struct ArrivalEvent {
    /// When arrival was detected.
    pub at: Timestamp,
    /// Distance at that fix, in meters.
    pub distance_m: f64,
}

/// Emitted when the app changes screen.
#[derive(Clone, Copy, Debug)]
pub struct NavigateEvent {
    /// When the navigation happened.
    pub at: Timestamp,
    /// Where to.
    pub to: NavTarget,
    /// `true` when replacing an invalid location rather than following a
    /// transition.
    pub redirect: bool,
}

/// Emitted when a best-effort host call fails.
#[derive(Clone, Copy, Debug)]
pub struct HostErrorEvent<'a> {
    /// When the failure happened.
    pub at: Timestamp,
    /// Which capability failed.
    pub op: HostOp,
    /// Host-provided description.
    pub detail: &'a str,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called on a running countdown tick.
    fn on_countdown_tick(&mut self, e: &CountdownTickEvent) {
        _ = e;
    }

    /// Called when the countdown completes.
    fn on_countdown_complete(&mut self, e: &CountdownCompleteEvent) {
        _ = e;
    }

    /// Called for a password submission.
    fn on_password_attempt(&mut self, e: &PasswordAttemptEvent) {
        _ = e;
    }

    /// Called when a clue panel unlocks.
    fn on_unlock(&mut self, e: &UnlockEvent) {
        _ = e;
    }

    /// Called for a location fix.
    fn on_geo_fix(&mut self, e: &GeoFixEvent) {
        _ = e;
    }

    /// Called for a location error.
    fn on_geo_error(&mut self, e: &GeoErrorEvent) {
        _ = e;
    }

    /// Called on first arrival.
    fn on_arrival(&mut self, e: &ArrivalEvent) {
        _ = e;
    }

    /// Called on navigation.
    fn on_navigate(&mut self, e: &NavigateEvent) {
        _ = e;
    }

    /// Called when a host call fails.
    fn on_host_error(&mut self, e: &HostErrorEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($self:ident, $method:ident, $e:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $e;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`CountdownTickEvent`].
    #[inline]
    pub fn countdown_tick(&mut self, e: &CountdownTickEvent) {
        emit!(self, on_countdown_tick, e);
    }

    /// Emits a [`CountdownCompleteEvent`].
    #[inline]
    pub fn countdown_complete(&mut self, e: &CountdownCompleteEvent) {
        emit!(self, on_countdown_complete, e);
    }

    /// Emits a [`PasswordAttemptEvent`].
    #[inline]
    pub fn password_attempt(&mut self, e: &PasswordAttemptEvent) {
        emit!(self, on_password_attempt, e);
    }

    /// Emits an [`UnlockEvent`].
    #[inline]
    pub fn unlock(&mut self, e: &UnlockEvent) {
        emit!(self, on_unlock, e);
    }

    /// Emits a [`GeoFixEvent`].
    #[inline]
    pub fn geo_fix(&mut self, e: &GeoFixEvent) {
        emit!(self, on_geo_fix, e);
    }

    /// Emits a [`GeoErrorEvent`].
    #[inline]
    pub fn geo_error(&mut self, e: &GeoErrorEvent) {
        emit!(self, on_geo_error, e);
    }

    /// Emits an [`ArrivalEvent`].
    #[inline]
    pub fn arrival(&mut self, e: &ArrivalEvent) {
        emit!(self, on_arrival, e);
    }

    /// Emits a [`NavigateEvent`].
    #[inline]
    pub fn navigate(&mut self, e: &NavigateEvent) {
        emit!(self, on_navigate, e);
    }

    /// Emits a [`HostErrorEvent`].
    #[inline]
    pub fn host_error(&mut self, e: &HostErrorEvent<'_>) {
        emit!(self, on_host_error, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        navigations: u32,
        host_errors: u32,
    }

    impl TraceSink for Counter {
        fn on_navigate(&mut self, e: &NavigateEvent) {
            assert_eq!(e.to, NavTarget::Riddle(1));
            self.navigations += 1;
        }

        fn on_host_error(&mut self, e: &HostErrorEvent<'_>) {
            assert_eq!(e.op, HostOp::Fullscreen);
            self.host_errors += 1;
        }
    }

    #[test]
    fn tracer_dispatch_follows_feature() {
        let mut sink = Counter::default();
        {
            let mut tracer = Tracer::new(&mut sink);
            tracer.navigate(&NavigateEvent {
                at: Timestamp(0),
                to: NavTarget::from(&Route::riddle("1")),
                redirect: false,
            });
            tracer.host_error(&HostErrorEvent {
                at: Timestamp(0),
                op: HostOp::Fullscreen,
                detail: "denied",
            });
            // Unhandled events fall through to the defaults.
            tracer.arrival(&ArrivalEvent {
                at: Timestamp(0),
                distance_m: 3.0,
            });
        }
        let expected = u32::from(cfg!(feature = "trace"));
        assert_eq!(sink.navigations, expected);
        assert_eq!(sink.host_errors, expected);
    }

    #[test]
    fn none_tracer_is_silent() {
        let mut tracer = Tracer::none();
        tracer.countdown_complete(&CountdownCompleteEvent {
            at: Timestamp(0),
            notify_after: Duration::ZERO,
        });
    }

    #[test]
    fn nav_target_from_route() {
        assert_eq!(NavTarget::from(&Route::Gate), NavTarget::Gate);
        assert_eq!(NavTarget::from(&Route::Final), NavTarget::Final);
        assert_eq!(NavTarget::from(&Route::riddle("4")), NavTarget::Riddle(4));
        assert_eq!(NavTarget::from(&Route::riddle("x")), NavTarget::Riddle(0));
    }
}
