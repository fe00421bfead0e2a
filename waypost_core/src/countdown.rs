// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Countdown to a fixed target instant.
//!
//! A [`Countdown`] is created when the gate screen mounts. The host then
//! drives it with one [`tick`](Countdown::tick) per second. Each tick
//! recomputes the remaining [`Breakdown`] and a progress percentage. The first
//! tick at or after the target reports [`TickOutcome::Completed`], which
//! carries the delay after which the completion callback should run.
//!
//! ```text
//!   mount ──► start() ──┬─► Tick { every: 1s } ──► tick(now) … ──► Completed { notify_after }
//!                       └─► NotifyAfter(delay)   (target already past)
//!                                                         │
//!   host timer fires after the delay ──► notify() == true exactly once
//! ```
//!
//! A target of `None` (the configured date did not parse) behaves exactly
//! like a target in the past.

use crate::time::{Breakdown, Duration, Timestamp};

/// How progress is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub enum ProgressBasis {
    /// Span from the moment the countdown was mounted to the target.
    #[default]
    SinceMount,
    /// Span from a fixed start instant to the target.
    FixedStart(Timestamp),
}

/// Tunables for a [`Countdown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CountdownConfig {
    /// Period of the recurring tick.
    pub tick_interval: Duration,
    /// Delay between completion and the completion callback, leaving room
    /// for the celebration transition.
    pub completion_delay: Duration,
    /// Basis for the progress percentage.
    pub basis: ProgressBasis,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            completion_delay: Duration::from_millis(1_500),
            basis: ProgressBasis::SinceMount,
        }
    }
}

/// Snapshot of a countdown, suitable for rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CountdownState {
    /// Time left, decomposed.
    pub remaining: Breakdown,
    /// Progress in `[0, 100]`.
    pub progress_percent: f64,
    /// Whether the target has been reached. Never reverts to `false`.
    pub is_complete: bool,
}

impl CountdownState {
    const COMPLETE: Self = Self {
        remaining: Breakdown::ZERO,
        progress_percent: 100.0,
        is_complete: true,
    };
}

/// What the host should schedule when the countdown starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartAction {
    /// Start a recurring timer with this period and call
    /// [`Countdown::tick`] from it.
    Tick {
        /// Timer period.
        every: Duration,
    },
    /// The target is already past: schedule [`Countdown::notify`] after this
    /// delay and start no recurring timer.
    NotifyAfter(Duration),
}

/// Result of a single [`Countdown::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Still counting down.
    Running(CountdownState),
    /// The target was reached on this tick. Cancel the recurring timer and
    /// schedule [`Countdown::notify`] after `notify_after`.
    Completed {
        /// Final (all-zero, 100%) state.
        state: CountdownState,
        /// Delay before the completion callback.
        notify_after: Duration,
    },
    /// The countdown had already completed; nothing changed.
    Idle,
}

/// Fires at most once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletionLatch {
    fired: bool,
}

impl CompletionLatch {
    /// Returns `true` the first time it is called and `false` afterwards.
    pub fn fire(&mut self) -> bool {
        !core::mem::replace(&mut self.fired, true)
    }

    /// Whether [`fire`](Self::fire) has returned `true`.
    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }
}

/// The largest non-zero unit of a [`Breakdown`], for the big numeral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainUnit {
    /// Days remain.
    Days(u64),
    /// Less than a day remains.
    Hours(u8),
    /// Less than an hour remains.
    Minutes(u8),
    /// Less than a minute remains.
    Seconds(u8),
}

impl MainUnit {
    /// Picks the largest non-zero unit, falling back to seconds.
    #[must_use]
    pub const fn of(b: Breakdown) -> Self {
        if b.days > 0 {
            Self::Days(b.days)
        } else if b.hours > 0 {
            Self::Hours(b.hours)
        } else if b.minutes > 0 {
            Self::Minutes(b.minutes)
        } else {
            Self::Seconds(b.seconds)
        }
    }

    /// Numeric value of the unit.
    #[must_use]
    pub const fn value(self) -> u64 {
        match self {
            Self::Days(v) => v,
            Self::Hours(v) | Self::Minutes(v) | Self::Seconds(v) => v as u64,
        }
    }

    /// Upper-case display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Days(_) => "DIAS",
            Self::Hours(_) => "HORAS",
            Self::Minutes(_) => "MINUTOS",
            Self::Seconds(_) => "SEGUNDOS",
        }
    }
}

/// Radius of the progress ring, in SVG user units.
pub const RING_RADIUS: f64 = 85.0;

/// Stroke dash offset that draws `progress_percent` of a ring of radius
/// [`RING_RADIUS`].
#[must_use]
pub fn ring_dash_offset(progress_percent: f64) -> f64 {
    let circumference = core::f64::consts::TAU * RING_RADIUS;
    circumference - circumference * progress_percent.clamp(0.0, 100.0) / 100.0
}

/// A countdown to a fixed target.
#[derive(Clone, Debug)]
pub struct Countdown {
    target: Timestamp,
    span_start: Timestamp,
    config: CountdownConfig,
    state: CountdownState,
    latch: CompletionLatch,
}

impl Countdown {
    /// Creates a countdown mounted at `now`.
    ///
    /// A `None` target is treated as `now`, so the countdown starts complete.
    #[must_use]
    pub fn new(target: Option<Timestamp>, now: Timestamp, config: CountdownConfig) -> Self {
        let target = target.unwrap_or(now);
        let span_start = match config.basis {
            ProgressBasis::SinceMount => now,
            ProgressBasis::FixedStart(start) => start,
        };
        let mut countdown = Self {
            target,
            span_start,
            config,
            state: CountdownState {
                remaining: Breakdown::ZERO,
                progress_percent: 0.0,
                is_complete: false,
            },
            latch: CompletionLatch::default(),
        };
        if now >= target {
            countdown.state = CountdownState::COMPLETE;
        } else {
            countdown.state = countdown.measure(now);
        }
        countdown
    }

    /// Returns what the host should schedule now that the view is mounted.
    #[must_use]
    pub fn start(&self) -> StartAction {
        if self.state.is_complete {
            StartAction::NotifyAfter(self.config.completion_delay)
        } else {
            StartAction::Tick {
                every: self.config.tick_interval,
            }
        }
    }

    /// Recomputes the state at `now`.
    pub fn tick(&mut self, now: Timestamp) -> TickOutcome {
        if self.state.is_complete {
            return TickOutcome::Idle;
        }
        if now >= self.target {
            self.state = CountdownState::COMPLETE;
            return TickOutcome::Completed {
                state: self.state,
                notify_after: self.config.completion_delay,
            };
        }
        let next = self.measure(now);
        // A wall clock stepping backwards must not rewind the ring.
        self.state = CountdownState {
            progress_percent: next.progress_percent.max(self.state.progress_percent),
            ..next
        };
        TickOutcome::Running(self.state)
    }

    /// Returns `true` exactly once, after completion, when the completion
    /// callback should run.
    ///
    /// Calling this before completion returns `false` and does not consume
    /// the latch.
    pub fn notify(&mut self) -> bool {
        self.state.is_complete && self.latch.fire()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CountdownState {
        self.state
    }

    /// The target instant (the mount time if the configured target was
    /// invalid).
    #[must_use]
    pub const fn target(&self) -> Timestamp {
        self.target
    }

    fn measure(&self, now: Timestamp) -> CountdownState {
        let remaining = now.saturating_duration_until(self.target);
        let total = self.span_start.saturating_duration_until(self.target);
        let progress_percent = if total.is_zero() {
            100.0
        } else {
            let elapsed = total.saturating_sub(remaining);
            (elapsed.millis() as f64 / total.millis() as f64 * 100.0).clamp(0.0, 100.0)
        };
        CountdownState {
            remaining: remaining.breakdown(),
            progress_percent,
            is_complete: false,
        }
    }
}
