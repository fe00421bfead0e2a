// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-independent state machines for a countdown-gated scavenger hunt.
//!
//! `waypost_core` holds everything about the hunt that does not touch the
//! browser: time arithmetic, the countdown, password checking, the
//! progress-gated media viewer, geodesy and map geometry, the navigator,
//! routing and configuration. It is `no_std` compatible (with `alloc`).
//!
//! Nothing here reads a clock or registers a callback. Each operation takes
//! the current [`Timestamp`](time::Timestamp) as an argument and returns what
//! the host should schedule next, which keeps every state machine
//! deterministic under test.
//!
//! # Architecture
//!
//! ```text
//!   Host (timers, geolocation, media events, animation frames)
//!       │  now: Timestamp, events
//!       ▼
//!   gate::decide ──► Countdown::tick ──► TickOutcome ──► notify after delay
//!       │
//!       ▼
//!   Route::resolve ──► PasswordGate::submit ──► MediaViewer ──► ConfirmPrompt
//!       │                                                            │
//!       ▼                                                            ▼
//!   Navigator::on_fix ──► Reading + RouteGeometry ◄──────────── /final
//!       │
//!       ▼
//!   Tracer ──► TraceSink (console, pretty-print, recorder, Chrome trace)
//! ```
//!
//! **[`time`]**: Millisecond timestamps and durations, countdown breakdown,
//! and a small ISO-8601 parser with explicit UTC offset.
//!
//! **[`clock`]**: The [`Clock`](clock::Clock) seam and a manual clock for
//! tests and simulation.
//!
//! **[`subscription`]**: Cancellation handles for host callbacks, owned per
//! view and torn down together.
//!
//! **[`countdown`]**: Countdown to the opening instant with a once-only
//! completion callback.
//!
//! **[`password`]**: Trimmed, case-insensitive password gate with an
//! expiring error message.
//!
//! **[`riddle`]**: The validated, ordered riddle table.
//!
//! **[`viewer`]**: Progress-gated clue panel and the confirmation prompt.
//!
//! **[`geo`]**, **[`projection`]**, **[`navigator`]**: Haversine distance,
//! ETA, map projection and route curve (via `kurbo`), and the arrival
//! state machine.
//!
//! **[`route`]** and **[`gate`]**: Paths, query strings, the developer
//! override and the gate decision.
//!
//! **[`config`]**: [`HuntConfig`](config::HuntConfig) and its validation.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) and the zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies.
//! - `serde` (disabled by default): Derives `Deserialize` for configuration
//!   types.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod countdown;
pub mod gate;
pub mod geo;
pub mod navigator;
pub mod password;
pub mod projection;
pub mod riddle;
pub mod route;
pub mod subscription;
pub mod time;
pub mod trace;
pub mod viewer;
