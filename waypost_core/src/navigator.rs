// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geo-proximity navigator for the final screen.
//!
//! The navigator is fed location samples and errors by the host and keeps
//! everything the map needs: the latest fix, distance and ETA, the route
//! geometry with its looping marker, and the arrival state.
//!
//! ```text
//!             initial fix               watch fixes / watch errors (ignored)
//!  Locating ─────────────► Tracking ◄──────────────────────────────┐
//!      │                      └────────────────────────────────────┘
//!      │ initial error
//!      ▼
//!  Failed(GeoError)   terminal; recovery is a page reload
//! ```
//!
//! Arrival is latched: once a fix lands inside the threshold the navigator
//! stays arrived for the rest of the session, and the arrival modal opens
//! once.

use core::fmt;

use kurbo::Point;

use crate::geo::{self, GeoFix, GeoPoint};
use crate::projection::{Canvas, RouteAnimation, RouteGeometry};
use crate::time::Duration;

/// Why a location could not be obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeoError {
    /// The participant or the browser refused access.
    PermissionDenied,
    /// No fix within the request timeout.
    Timeout,
    /// The position could not be determined.
    Unavailable,
    /// The host has no geolocation API.
    Unsupported,
}

impl GeoError {
    /// Maps a `GeolocationPositionError.code`.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::Unavailable,
        }
    }

    /// Message shown on the error screen.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Permissão negada. Habilite o acesso à localização no navegador."
            }
            Self::Timeout => "Timeout ao obter localização. Tente novamente.",
            Self::Unavailable => {
                "Não foi possível obter sua localização. Verifique as permissões do navegador."
            }
            Self::Unsupported => "Geolocalização não é suportada neste navegador.",
        }
    }
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PermissionDenied => "geolocation permission denied",
            Self::Timeout => "geolocation timed out",
            Self::Unavailable => "position unavailable",
            Self::Unsupported => "geolocation not supported",
        })
    }
}

impl core::error::Error for GeoError {}

/// Where the hunt ends.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DestinationConfig {
    /// The destination.
    pub point: GeoPoint,
    /// Distance, in meters, at or under which the participant has arrived.
    pub arrival_threshold_m: f64,
}

impl DestinationConfig {
    /// The shipped destination with a 120 m arrival radius.
    pub const DEFAULT: Self = Self {
        point: GeoPoint::new(-7.257106781268056, -35.944510491423486),
        arrival_threshold_m: 120.0,
    };

    /// Pure per-fix arrival test, without latching.
    #[must_use]
    pub fn is_near_for_fix(&self, fix: &GeoFix) -> bool {
        geo::is_near(geo::distance_m(fix.point, self.point), self.arrival_threshold_m)
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Options for location requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocateOptions {
    /// Ask for GPS-grade accuracy.
    pub high_accuracy: bool,
    /// Give up on a single request after this long.
    pub timeout: Duration,
    /// Accept a cached position up to this old.
    pub maximum_age: Duration,
}

impl LocateOptions {
    /// High accuracy, 8 s timeout, 5 s maximum age.
    pub const DEFAULT: Self = Self {
        high_accuracy: true,
        timeout: Duration::from_millis(8_000),
        maximum_age: Duration::from_millis(5_000),
    };
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Navigator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavStatus {
    /// Waiting for the first fix.
    Locating,
    /// At least one fix received.
    Tracking,
    /// The first fix failed. Terminal.
    Failed(GeoError),
}

/// Values derived from one fix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// The fix itself.
    pub fix: GeoFix,
    /// Great-circle distance to the destination.
    pub distance_km: f64,
    /// Estimated travel time.
    pub eta_minutes: u32,
    /// Whether this particular fix is inside the arrival radius.
    pub near: bool,
}

impl Reading {
    /// Distance in meters.
    #[must_use]
    pub fn distance_m(&self) -> f64 {
        self.distance_km * 1000.0
    }
}

/// Result of [`Navigator::on_fix`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixUpdate {
    /// The new reading.
    pub reading: Reading,
    /// `true` only for the fix that first reached the destination.
    pub arrived_now: bool,
}

/// Location tracking and arrival detection.
#[derive(Clone, Debug)]
pub struct Navigator {
    destination: DestinationConfig,
    canvas: Canvas,
    status: NavStatus,
    reading: Option<Reading>,
    animation: Option<RouteAnimation>,
    arrived: bool,
    modal_open: bool,
    watch_errors: u32,
}

impl Navigator {
    /// Creates a navigator waiting for its first fix.
    #[must_use]
    pub fn new(destination: DestinationConfig, canvas: Canvas) -> Self {
        Self {
            destination,
            canvas,
            status: NavStatus::Locating,
            reading: None,
            animation: None,
            arrived: false,
            modal_open: false,
            watch_errors: 0,
        }
    }

    /// Records a location sample, from either the initial request or the
    /// watch.
    ///
    /// Returns `None` once the navigator has failed.
    pub fn on_fix(&mut self, fix: GeoFix) -> Option<FixUpdate> {
        if matches!(self.status, NavStatus::Failed(_)) {
            return None;
        }
        self.status = NavStatus::Tracking;

        let distance_km = geo::haversine_km(fix.point, self.destination.point);
        let near = geo::is_near(distance_km * 1000.0, self.destination.arrival_threshold_m);
        let reading = Reading {
            fix,
            distance_km,
            eta_minutes: geo::eta_minutes(distance_km),
            near,
        };
        self.reading = Some(reading);

        let arrived_now = near && !self.arrived;
        if arrived_now {
            self.arrived = true;
            self.modal_open = true;
        }

        let geometry = self.geometry_for(&reading);
        self.animation = Some(RouteAnimation::new(
            geometry.curve,
            RouteAnimation::cycle_for_distance(distance_km),
        ));
        Some(FixUpdate {
            reading,
            arrived_now,
        })
    }

    /// Records a failure of the initial request.
    ///
    /// Returns `true` if the navigator moved to [`NavStatus::Failed`]. An
    /// error arriving after a successful fix is treated as a watch error.
    pub fn on_initial_error(&mut self, error: GeoError) -> bool {
        match self.status {
            NavStatus::Locating => {
                self.status = NavStatus::Failed(error);
                true
            }
            NavStatus::Tracking | NavStatus::Failed(_) => false,
        }
    }

    /// Records a failure of the continuous watch. Only counted; the last
    /// good reading stays on screen.
    pub fn on_watch_error(&mut self, _error: GeoError) {
        self.watch_errors = self.watch_errors.saturating_add(1);
    }

    /// Number of watch errors seen so far.
    #[must_use]
    pub fn watch_error_count(&self) -> u32 {
        self.watch_errors
    }

    /// Closes the arrival modal. It will not reopen this session.
    pub fn dismiss_modal(&mut self) {
        self.modal_open = false;
    }

    /// Whether the arrival modal is showing.
    #[must_use]
    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    /// Whether the participant has arrived at any point this session.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> NavStatus {
        self.status
    }

    /// Latest reading.
    #[must_use]
    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    /// Route geometry for the latest reading.
    #[must_use]
    pub fn geometry(&self) -> Option<RouteGeometry> {
        self.reading.as_ref().map(|r| self.geometry_for(r))
    }

    /// Position of the moving marker at frame time `frame_ms`.
    pub fn marker_at(&mut self, frame_ms: f64) -> Option<Point> {
        self.animation.as_mut().map(|a| a.marker_at(frame_ms))
    }

    /// The destination being navigated to.
    #[must_use]
    pub fn destination(&self) -> &DestinationConfig {
        &self.destination
    }

    fn geometry_for(&self, reading: &Reading) -> RouteGeometry {
        RouteGeometry::compute(
            reading.fix.point,
            self.destination.point,
            reading.distance_m(),
            self.destination.arrival_threshold_m,
            self.arrived,
            self.canvas,
        )
    }
}
