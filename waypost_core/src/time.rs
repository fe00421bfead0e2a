// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wall-clock timestamps, millisecond durations, and target-date parsing.
//!
//! [`Timestamp`] is a point in wall-clock time expressed as milliseconds since
//! the Unix epoch, the unit browsers use for `Date.now()` and geolocation
//! fixes. [`Duration`] is a span in the same unit.
//!
//! [`parse_datetime`] turns the configured countdown target (an ISO-8601
//! string such as `"2025-08-12T00:00:00"`) into a [`Timestamp`]. Strings
//! without an explicit zone are read as wall-clock time in a caller-supplied
//! [`TimeZone`], so the offset in effect on the target date applies.

use core::fmt;
use core::ops::{Add, Sub};

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// A point in wall-clock time, in milliseconds since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Converts a browser `DOMTimeStamp`/`Date.now()` value.
    ///
    /// Negative, NaN, and infinite inputs map to the epoch.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is checked finite and non-negative; ms since epoch fits in u64"
    )]
    pub fn from_js_millis(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Self(ms as u64)
        } else {
            Self(0)
        }
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Returns the time remaining until `later`, or zero if it has passed.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_until(self, later: Self) -> Duration {
        Duration(later.0.saturating_sub(self.0))
    }

    /// Checked addition of a duration.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, duration: Duration) -> Option<Self> {
        match self.0.checked_add(duration.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms)", self.0)
    }
}

/// A span of wall-clock time in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Creates a duration from whole seconds.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(MS_PER_SECOND))
    }

    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Returns the number of whole seconds, rounding partial seconds up.
    ///
    /// Used for visible countdowns, where "0.4 s left" should still read "1".
    #[inline]
    #[must_use]
    pub const fn ceil_secs(self) -> u64 {
        self.0.div_ceil(MS_PER_SECOND)
    }

    /// Returns `true` for a zero-length duration.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Splits the duration into whole days, hours, minutes, and seconds.
    ///
    /// Pure millisecond arithmetic: there is no calendar awareness, and any
    /// sub-second remainder is dropped.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "hours, minutes, and seconds are bounded by their modulus"
    )]
    pub const fn breakdown(self) -> Breakdown {
        let ms = self.0;
        Breakdown {
            days: ms / MS_PER_DAY,
            hours: ((ms % MS_PER_DAY) / MS_PER_HOUR) as u8,
            minutes: ((ms % MS_PER_HOUR) / MS_PER_MINUTE) as u8,
            seconds: ((ms % MS_PER_MINUTE) / MS_PER_SECOND) as u8,
        }
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Duration {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({}ms)", self.0)
    }
}

/// A duration decomposed into whole days, hours, minutes, and seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Breakdown {
    /// Whole days.
    pub days: u64,
    /// Hours within the day (0–23).
    pub hours: u8,
    /// Minutes within the hour (0–59).
    pub minutes: u8,
    /// Seconds within the minute (0–59).
    pub seconds: u8,
}

impl Breakdown {
    /// All fields zero.
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Reassembles the breakdown into milliseconds.
    #[must_use]
    pub const fn total_millis(self) -> u64 {
        ((self.days * 24 + self.hours as u64) * 60 + self.minutes as u64) * MS_PER_MINUTE
            + self.seconds as u64 * MS_PER_SECOND
    }

    /// Returns `true` when every field is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// Local date-time layouts accepted for the countdown target.
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 date-time into a [`Timestamp`].
///
/// Accepted shapes:
///
/// - RFC 3339 with a `Z` or `±HH:MM` designator: an absolute instant
/// - `YYYY-MM-DD` (read as UTC midnight, matching browser `Date` parsing)
/// - `YYYY-MM-DDTHH:MM[:SS[.fff]]`: wall-clock time in `local`, using the
///   offset `local` has on that date
///
/// A local time skipped by a daylight-saving jump resolves to the first
/// valid instant after the gap.
///
/// Returns `None` for anything malformed or before the Unix epoch. Callers
/// treat `None` as "already elapsed".
#[must_use]
pub fn parse_datetime<Tz: TimeZone>(input: &str, local: &Tz) -> Option<Timestamp> {
    let s = input.trim();
    let millis = if let Ok(absolute) = DateTime::parse_from_rfc3339(s) {
        absolute.timestamp_millis()
    } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis()
    } else {
        let naive = LOCAL_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())?;
        resolve_local(local, naive)?.timestamp_millis()
    };
    u64::try_from(millis).ok().map(Timestamp)
}

fn resolve_local<Tz: TimeZone>(local: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match local.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => local
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    #[test]
    fn breakdown_matches_total() {
        let d = Duration(3 * MS_PER_DAY + 4 * MS_PER_HOUR + 5 * MS_PER_MINUTE + 6_789);
        let b = d.breakdown();
        assert_eq!(
            b,
            Breakdown {
                days: 3,
                hours: 4,
                minutes: 5,
                seconds: 6,
            }
        );
        // Sub-second remainder is dropped.
        assert_eq!(d.millis() - b.total_millis(), 789);
    }

    #[test]
    fn ceil_secs_rounds_up() {
        assert_eq!(Duration(0).ceil_secs(), 0);
        assert_eq!(Duration(1).ceil_secs(), 1);
        assert_eq!(Duration(15_000).ceil_secs(), 15);
        assert_eq!(Duration(14_001).ceil_secs(), 15);
    }

    #[test]
    fn timestamp_ops_saturate() {
        let t = Timestamp(1_000);
        assert_eq!(t.saturating_duration_since(Timestamp(1_500)), Duration::ZERO);
        assert_eq!(t.saturating_duration_until(Timestamp(1_500)), Duration(500));
        assert_eq!(Timestamp(1_500) - t, Duration(500));
        assert_eq!(t - Timestamp(1_500), Duration::ZERO);
        assert_eq!((t + Duration(250)).millis(), 1_250);
    }

    #[test]
    fn from_js_millis_rejects_garbage() {
        assert_eq!(Timestamp::from_js_millis(f64::NAN), Timestamp(0));
        assert_eq!(Timestamp::from_js_millis(-5.0), Timestamp(0));
        assert_eq!(Timestamp::from_js_millis(1_234.9), Timestamp(1_234));
    }

    #[test]
    fn parse_utc_designator() {
        // 2025-08-12T00:00:00Z
        assert_eq!(
            parse_datetime("2025-08-12T00:00:00Z", &Utc),
            Some(Timestamp(1_754_956_800_000))
        );
        assert_eq!(parse_datetime("1970-01-02", &Utc), Some(Timestamp(MS_PER_DAY)));
    }

    #[test]
    fn parse_local_time_uses_zone() {
        // Local midnight in UTC−3 is 03:00 UTC.
        let utc = parse_datetime("2025-08-12T00:00:00Z", &Utc).unwrap();
        let brt = FixedOffset::west_opt(3 * 3_600).unwrap();
        let local = parse_datetime("2025-08-12T00:00:00", &brt).unwrap();
        assert_eq!(local - utc, Duration(3 * MS_PER_HOUR));
    }

    #[test]
    fn explicit_offset_wins_over_local() {
        let elsewhere = FixedOffset::east_opt(2 * 3_600).unwrap();
        let a = parse_datetime("2025-08-12T00:00:00-03:00", &elsewhere).unwrap();
        let b = parse_datetime("2025-08-12T03:00:00Z", &Utc).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_fractional_seconds_and_minutes_only() {
        let base = parse_datetime("2025-01-01T10:20", &Utc).unwrap();
        let frac = parse_datetime("2025-01-01T10:20:00.5", &Utc).unwrap();
        assert_eq!(frac - base, Duration(500));
        let zoned = parse_datetime("2025-01-01T10:20:00.250Z", &Utc).unwrap();
        assert_eq!(zoned - base, Duration(250));
    }

    /// A zone that is UTC−3 before 2025-06-01 and UTC−2 from then on.
    #[derive(Clone, Copy, Debug)]
    struct Shifting;

    const SHIFT_AT: i64 = 1_748_736_000; // 2025-06-01T00:00:00Z

    impl TimeZone for Shifting {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Self
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            LocalResult::Single(self.offset_from_utc_datetime(local))
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let hours = if utc.and_utc().timestamp() < SHIFT_AT { 3 } else { 2 };
            FixedOffset::west_opt(hours * 3_600).unwrap()
        }
    }

    #[test]
    fn local_offset_is_taken_at_the_target_date() {
        let winter = parse_datetime("2025-03-01T00:00:00", &Shifting).unwrap();
        let summer = parse_datetime("2025-08-12T00:00:00", &Shifting).unwrap();
        assert_eq!(
            winter,
            parse_datetime("2025-03-01T03:00:00Z", &Utc).unwrap(),
            "before the switch the zone is UTC-3"
        );
        assert_eq!(
            summer,
            parse_datetime("2025-08-12T02:00:00Z", &Utc).unwrap(),
            "after the switch the zone is UTC-2"
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in [
            "",
            "tomorrow",
            "2025-13-01",
            "2025-02-30",
            "2025-08-12T25:00:00",
            "2025-08-12X00:00",
            "1969-12-31",
        ] {
            assert_eq!(parse_datetime(bad, &Utc), None, "{bad:?} should not parse");
        }
    }

    #[test]
    fn leap_day_is_valid() {
        assert!(parse_datetime("2024-02-29", &Utc).is_some());
        assert!(parse_datetime("2023-02-29", &Utc).is_none());
    }
}
