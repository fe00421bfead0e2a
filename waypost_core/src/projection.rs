// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Map projection, route curve and the marker animation.
//!
//! The map is a fixed-size canvas with the y axis pointing down. Both the
//! participant and the destination are projected with a local
//! equirectangular projection centered on their midpoint and scaled so the
//! pair fills the padded canvas with some margin:
//!
//! ```text
//!   ┌──────────────── 600 ────────────────┐
//!   │  60                                 │
//!   │     ● user                          │
//!   │       ╲__                           │ 400
//!   │          ‾‾╲__         ● dest       │
//!   │                ‾‾‾‾‾‾‾              │
//!   └─────────────────────────────────────┘
//! ```
//!
//! The route between them is a [`CubicBez`] bowed to one side. When the
//! participant is inside the arrival radius, both endpoints slide toward
//! their midpoint so the two markers visually meet.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{CubicBez, ParamCurve, Point, Size, Vec2};

use crate::geo::GeoPoint;
use crate::time::Duration;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Smallest scale the projection will use, in pixels per meter.
pub const MIN_PX_PER_METER: f64 = 0.02;

/// Margin factor applied to the span between the two points.
const SPAN_MARGIN: f64 = 1.5;

/// Drawing surface dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    /// Full size in pixels.
    pub size: Size,
    /// Padding kept clear on every side.
    pub padding: f64,
}

impl Canvas {
    /// The shipped 600×400 map with 60 px padding.
    pub const MAP: Self = Self {
        size: Size::new(600.0, 400.0),
        padding: 60.0,
    };

    /// Size left once padding is removed.
    #[must_use]
    pub fn usable(&self) -> Size {
        Size::new(
            self.size.width - 2.0 * self.padding,
            self.size.height - 2.0 * self.padding,
        )
    }

    /// Center of the canvas.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::MAP
    }
}

/// Local equirectangular projection fitted to a pair of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    center: GeoPoint,
    meters_per_deg_lng: f64,
    px_per_meter: f64,
    origin: Point,
}

impl Projection {
    /// Fits a projection so that `a` and `b` both land inside `canvas`.
    #[must_use]
    pub fn fit(a: GeoPoint, b: GeoPoint, canvas: Canvas) -> Self {
        let center = a.midpoint(b);
        let meters_per_deg_lng = METERS_PER_DEGREE * center.latitude.to_radians().cos();
        let lat_span = nonzero_span((b.latitude - a.latitude).abs() * METERS_PER_DEGREE);
        let lng_span = nonzero_span((b.longitude - a.longitude).abs() * meters_per_deg_lng);
        let usable = canvas.usable();
        let fit = (usable.width / (lng_span * SPAN_MARGIN))
            .min(usable.height / (lat_span * SPAN_MARGIN));
        Self {
            center,
            meters_per_deg_lng,
            px_per_meter: fit.max(MIN_PX_PER_METER),
            origin: canvas.center(),
        }
    }

    /// Projects a coordinate onto the canvas.
    #[must_use]
    pub fn project(&self, p: GeoPoint) -> Point {
        let dx = (p.longitude - self.center.longitude) * self.meters_per_deg_lng;
        let dy = (p.latitude - self.center.latitude) * METERS_PER_DEGREE;
        Point::new(
            self.origin.x + dx * self.px_per_meter,
            self.origin.y - dy * self.px_per_meter,
        )
    }

    /// Scale in pixels per meter.
    #[must_use]
    pub fn px_per_meter(&self) -> f64 {
        self.px_per_meter
    }
}

fn nonzero_span(meters: f64) -> f64 {
    if meters == 0.0 || meters.is_nan() {
        1.0
    } else {
        meters
    }
}

/// A cubic from `p0` to `p3` bowed to the left of the direction of travel.
#[must_use]
pub fn route_curve(p0: Point, p3: Point) -> CubicBez {
    let d = p3 - p0;
    let offset = (0.35 * d.hypot()).min(120.0);
    let angle = d.atan2();
    let normal = Vec2::new(-angle.sin(), angle.cos()) * (offset * 0.6);
    CubicBez::new(p0, p0 + d * 0.3 + normal, p0 + d * 0.7 - normal, p3)
}

/// How far the endpoints should slide toward each other, in `[0, 1]`.
///
/// Zero outside the arrival radius, one at the destination.
#[must_use]
pub fn convergence_factor(distance_m: f64, threshold_m: f64) -> f64 {
    if threshold_m.is_nan() || threshold_m <= 0.0 {
        return 0.0;
    }
    (1.0 - distance_m / threshold_m).clamp(0.0, 1.0)
}

/// Moves both endpoints toward their midpoint by `factor`.
#[must_use]
pub fn converge(p0: Point, p3: Point, factor: f64) -> (Point, Point) {
    let mid = p0.midpoint(p3);
    (p0.lerp(mid, factor), p3.lerp(mid, factor))
}

/// Everything needed to draw the route for one fix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteGeometry {
    /// Participant marker.
    pub user: Point,
    /// Destination marker.
    pub destination: Point,
    /// Path between the (converged) markers.
    pub curve: CubicBez,
}

impl RouteGeometry {
    /// Projects both points, applies proximity convergence and builds the
    /// curve from the converged endpoints.
    ///
    /// Once `arrived` is set the markers stay fully converged regardless of
    /// `distance_m`.
    #[must_use]
    pub fn compute(
        user: GeoPoint,
        destination: GeoPoint,
        distance_m: f64,
        threshold_m: f64,
        arrived: bool,
        canvas: Canvas,
    ) -> Self {
        let projection = Projection::fit(user, destination, canvas);
        let factor = if arrived {
            1.0
        } else {
            convergence_factor(distance_m, threshold_m)
        };
        let (p0, p3) = converge(
            projection.project(user),
            projection.project(destination),
            factor,
        );
        Self {
            user: p0,
            destination: p3,
            curve: route_curve(p0, p3),
        }
    }
}

/// Loops a marker along a route curve.
///
/// The phase is derived from frame timestamps (milliseconds, as delivered by
/// the animation-frame callback), starting at zero on the first frame.
#[derive(Clone, Copy, Debug)]
pub struct RouteAnimation {
    curve: CubicBez,
    cycle_ms: f64,
    start_ms: Option<f64>,
}

impl RouteAnimation {
    /// Bounds of the cycle length.
    pub const MIN_CYCLE: Duration = Duration::from_millis(2_000);
    /// See [`MIN_CYCLE`](Self::MIN_CYCLE).
    pub const MAX_CYCLE: Duration = Duration::from_millis(6_000);

    /// Creates an animation that has not seen a frame yet.
    #[must_use]
    pub fn new(curve: CubicBez, cycle: Duration) -> Self {
        Self {
            curve,
            cycle_ms: cycle.millis().max(1) as f64,
            start_ms: None,
        }
    }

    /// Cycle length for a trip of `km`: one second per kilometer, clamped to
    /// [`MIN_CYCLE`](Self::MIN_CYCLE)..=[`MAX_CYCLE`](Self::MAX_CYCLE). A
    /// zero distance counts as 100 m.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the value is clamped to a few thousand before the cast"
    )]
    pub fn cycle_for_distance(km: f64) -> Duration {
        let km = if km > 0.0 { km } else { 0.1 };
        let ms = (km * 1000.0).ceil().clamp(
            Self::MIN_CYCLE.millis() as f64,
            Self::MAX_CYCLE.millis() as f64,
        );
        Duration::from_millis(ms as u64)
    }

    /// Phase in `[0, 1)` at frame time `frame_ms`.
    pub fn phase_at(&mut self, frame_ms: f64) -> f64 {
        let start = *self.start_ms.get_or_insert(frame_ms);
        let elapsed = (frame_ms - start).max(0.0);
        elapsed.rem_euclid(self.cycle_ms) / self.cycle_ms
    }

    /// Marker position at frame time `frame_ms`.
    pub fn marker_at(&mut self, frame_ms: f64) -> Point {
        let t = self.phase_at(frame_ms);
        self.curve.eval(t)
    }

    /// The curve being followed.
    #[must_use]
    pub fn curve(&self) -> CubicBez {
        self.curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEST: GeoPoint = GeoPoint::new(-7.257106781268056, -35.944510491423486);

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-6
    }

    #[test]
    fn fitted_points_are_symmetric_about_center() {
        let user = GeoPoint::new(-7.25, -35.93);
        let proj = Projection::fit(user, DEST, Canvas::MAP);
        let a = proj.project(user);
        let b = proj.project(DEST);
        assert!(close(a.midpoint(b), Canvas::MAP.center()));
        // User is north-east of the destination: up and to the right.
        assert!(a.y < b.y);
        assert!(a.x > b.x);
        for p in [a, b] {
            assert!(p.x >= 60.0 && p.x <= 540.0, "x = {}", p.x);
            assert!(p.y >= 60.0 && p.y <= 340.0, "y = {}", p.y);
        }
    }

    #[test]
    fn coincident_points_use_unit_span() {
        let proj = Projection::fit(DEST, DEST, Canvas::MAP);
        // min(480 / 1.5, 280 / 1.5)
        assert!((proj.px_per_meter() - 280.0 / 1.5).abs() < 1e-9);
        assert!(close(proj.project(DEST), Canvas::MAP.center()));
    }

    #[test]
    fn far_points_hit_the_scale_floor() {
        let far = GeoPoint::new(40.0, 10.0);
        let proj = Projection::fit(far, DEST, Canvas::MAP);
        assert_eq!(proj.px_per_meter(), MIN_PX_PER_METER);
    }

    #[test]
    fn curve_control_points() {
        let p0 = Point::new(0.0, 0.0);
        let p3 = Point::new(100.0, 0.0);
        let c = route_curve(p0, p3);
        // offset = min(120, 35) = 35; normal = (0, 1) * 21.
        assert!(close(c.p1, Point::new(30.0, 21.0)));
        assert!(close(c.p2, Point::new(70.0, -21.0)));
        assert_eq!(c.p0, p0);
        assert_eq!(c.p3, p3);

        let long = route_curve(Point::ZERO, Point::new(0.0, 1000.0));
        // offset capped at 120; normal = (-1, 0) * 72.
        assert!(close(long.p1, Point::new(-72.0, 300.0)));
        assert!(close(long.p2, Point::new(72.0, 700.0)));
    }

    #[test]
    fn degenerate_curve_is_a_point() {
        let p = Point::new(5.0, 5.0);
        let c = route_curve(p, p);
        assert!(close(c.p1, p));
        assert!(close(c.p2, p));
    }

    #[test]
    fn convergence() {
        assert_eq!(convergence_factor(500.0, 120.0), 0.0);
        assert_eq!(convergence_factor(120.0, 120.0), 0.0);
        assert!((convergence_factor(60.0, 120.0) - 0.5).abs() < 1e-12);
        assert_eq!(convergence_factor(0.0, 120.0), 1.0);
        assert_eq!(convergence_factor(10.0, 0.0), 0.0);

        let (a, b) = converge(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 0.5);
        assert!(close(a, Point::new(2.5, 0.0)));
        assert!(close(b, Point::new(7.5, 0.0)));
        let (a, b) = converge(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
        assert!(close(a, b));
    }

    #[test]
    fn geometry_meets_at_destination() {
        let g = RouteGeometry::compute(DEST, DEST, 0.0, 120.0, false, Canvas::MAP);
        assert!(close(g.user, g.destination));
        assert!(close(g.curve.eval(0.5), g.user));
    }

    #[test]
    fn arrival_pins_convergence() {
        let drifted = GeoPoint::new(DEST.latitude + 0.0012, DEST.longitude);
        let apart = RouteGeometry::compute(drifted, DEST, 133.0, 120.0, false, Canvas::MAP);
        assert!(
            !close(apart.user, apart.destination),
            "outside the radius the markers separate"
        );
        let pinned = RouteGeometry::compute(drifted, DEST, 133.0, 120.0, true, Canvas::MAP);
        assert!(
            close(pinned.user, pinned.destination),
            "after arrival the markers stay together"
        );
    }

    #[test]
    fn cycle_is_clamped() {
        assert_eq!(RouteAnimation::cycle_for_distance(0.0), Duration(2_000));
        assert_eq!(RouteAnimation::cycle_for_distance(0.5), Duration(2_000));
        assert_eq!(RouteAnimation::cycle_for_distance(3.5), Duration(3_500));
        assert_eq!(RouteAnimation::cycle_for_distance(50.0), Duration(6_000));
        assert_eq!(RouteAnimation::cycle_for_distance(f64::NAN), Duration(2_000));
    }

    #[test]
    fn phase_wraps() {
        let curve = route_curve(Point::ZERO, Point::new(100.0, 0.0));
        let mut anim = RouteAnimation::new(curve, Duration(2_000));
        assert_eq!(anim.phase_at(5_000.0), 0.0);
        assert!((anim.phase_at(5_500.0) - 0.25).abs() < 1e-12);
        assert_eq!(anim.phase_at(7_000.0), 0.0);
        assert!((anim.phase_at(8_000.0) - 0.5).abs() < 1e-12);
        assert_eq!(anim.phase_at(4_000.0), 0.0, "frames before start clamp");
        assert!(close(anim.marker_at(5_000.0), Point::ZERO));
    }
}
