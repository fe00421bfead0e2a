// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Great-circle distance, travel-time estimates and their display text.

use alloc::format;
use alloc::string::String;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::time::Timestamp;

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS-84 coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Midpoint in degree space. Adequate for the short spans drawn on the map.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new(
            (self.latitude + other.latitude) / 2.0,
            (self.longitude + other.longitude) / 2.0,
        )
    }
}

/// A device location sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoFix {
    /// Reported position.
    pub point: GeoPoint,
    /// Radius of the 68% confidence circle, in meters.
    pub accuracy_m: f64,
    /// When the sample was taken.
    pub timestamp: Timestamp,
}

/// Great-circle distance between two points, in kilometers.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let s_lat = (d_lat / 2.0).sin();
    let s_lon = (d_lon / 2.0).sin();
    let h = s_lat * s_lat + lat1.cos() * lat2.cos() * s_lon * s_lon;
    // Rounding can push `h` a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance between two points, in meters.
#[must_use]
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_km(a, b) * 1000.0
}

/// Whether a distance in meters is within the arrival threshold.
#[must_use]
pub fn is_near(distance_m: f64, threshold_m: f64) -> bool {
    distance_m <= threshold_m
}

/// Assumed average speed, in km/h, for a trip of `km`.
#[must_use]
pub fn average_speed_kmh(km: f64) -> f64 {
    if km > 2.0 { 40.0 } else { 25.0 }
}

/// Estimated travel time in whole minutes.
///
/// Zero for a zero (or negative, or NaN) distance, otherwise at least one
/// minute.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "travel minutes on Earth fit comfortably in u32"
)]
pub fn eta_minutes(km: f64) -> u32 {
    if km.is_nan() || km <= 0.0 {
        return 0;
    }
    let minutes = (km / average_speed_kmh(km) * 60.0).ceil();
    (minutes as u32).max(1)
}

/// Distance text: whole meters below 1 km, otherwise kilometers with two
/// decimals.
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round())
    } else {
        format!("{km:.2} km")
    }
}

/// Travel-time text: `"N min"` below an hour, otherwise `"H h M min"`.
#[must_use]
pub fn format_eta(minutes: u32) -> String {
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{} h {} min", minutes / 60, minutes % 60)
    }
}

/// Accuracy text, `"±N m"`.
#[must_use]
pub fn format_accuracy(meters: f64) -> String {
    format!("±{} m", meters.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEST: GeoPoint = GeoPoint::new(-7.257106781268056, -35.944510491423486);

    #[test]
    fn identical_points_are_zero() {
        assert_eq!(haversine_km(DEST, DEST), 0.0);
        assert!(is_near(distance_m(DEST, DEST), 120.0));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(-7.23, -35.88);
        let d1 = haversine_km(a, DEST);
        let d2 = haversine_km(DEST, a);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn thousandth_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.001, 0.0);
        let m = distance_m(a, b);
        assert!((m - 111.2).abs() < 111.2 * 0.05, "got {m}");
    }

    #[test]
    fn thousandth_degree_near_destination() {
        let a = GeoPoint::new(-7.2571, -35.9445);
        let b = GeoPoint::new(-7.2581, -35.9445);
        let m = distance_m(a, b);
        assert!((m - 111.2).abs() < 111.2 * 0.05, "got {m}");
        assert!(is_near(m, 120.0), "inside the default arrival radius");
    }

    #[test]
    fn antipodes_do_not_nan() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let d = haversine_km(a, b);
        assert!((d - core::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn near_threshold_is_inclusive() {
        assert!(is_near(120.0, 120.0));
        assert!(!is_near(120.001, 120.0));
    }

    #[test]
    fn eta_boundaries() {
        assert_eq!(eta_minutes(0.0), 0);
        assert_eq!(eta_minutes(-1.0), 0);
        assert_eq!(eta_minutes(f64::NAN), 0);
        assert_eq!(eta_minutes(0.001), 1);
        // 2 km at 25 km/h is 4.8 min.
        assert_eq!(eta_minutes(2.0), 5);
        // 2.5 km at 40 km/h is 3.75 min.
        assert_eq!(eta_minutes(2.5), 4);
        assert_eq!(eta_minutes(100.0), 150);
    }

    #[test]
    fn distance_text() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(0.4567), "457 m");
        assert_eq!(format_distance(1.0), "1.00 km");
        assert_eq!(format_distance(12.346), "12.35 km");
    }

    #[test]
    fn eta_text() {
        assert_eq!(format_eta(0), "0 min");
        assert_eq!(format_eta(59), "59 min");
        assert_eq!(format_eta(60), "1 h 0 min");
        assert_eq!(format_eta(135), "2 h 15 min");
    }

    #[test]
    fn accuracy_text() {
        assert_eq!(format_accuracy(14.6), "±15 m");
    }
}
