// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wall-clock sources.
//!
//! State machines in this crate never read the clock themselves; callers
//! pass a [`Timestamp`] into every operation. [`Clock`] is the seam the
//! browser backend and the simulation harness use to produce those
//! timestamps, and [`ManualClock`] is the fake used in tests.

use core::cell::Cell;

use crate::time::{Duration, Timestamp};

/// A source of wall-clock time.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// A clock that only moves when told to.
///
/// Interior mutability lets one clock be shared by reference between the
/// code under test and the test driving it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub const fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start.0),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by.millis()));
    }

    /// Sets the clock to an absolute time, which may be in the past.
    pub fn set(&self, to: Timestamp) {
        self.now.set(to.millis());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(Timestamp(1_000));
        assert_eq!(clock.now(), Timestamp(1_000));
        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now(), Timestamp(3_000));
        clock.set(Timestamp(10));
        assert_eq!(clock.now(), Timestamp(10));
    }
}
