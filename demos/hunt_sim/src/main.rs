// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted walk through a whole hunt that exercises the tracing pipeline.
//!
//! Drives the gate countdown, every riddle (one wrong password each, one
//! broken video), the confirmation prompt and a walk to the destination on a
//! [`ManualClock`]. Events go to both a
//! [`PrettyPrintSink`](waypost_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](waypost_debug::recorder::RecorderSink); the recording is
//! exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use waypost_core::clock::{Clock, ManualClock};
use waypost_core::config::HuntConfig;
use waypost_core::countdown::{Countdown, StartAction, TickOutcome};
use waypost_core::geo::{GeoFix, GeoPoint};
use waypost_core::navigator::{GeoError, Navigator};
use waypost_core::password::PasswordGate;
use waypost_core::projection::Canvas;
use waypost_core::route::Route;
use waypost_core::time::{Duration, Timestamp};
use waypost_core::trace::{
    ArrivalEvent, CountdownCompleteEvent, CountdownTickEvent, GeoErrorEvent, GeoFixEvent,
    NavTarget, NavigateEvent, PasswordAttemptEvent, TraceSink, Tracer, UnlockEvent,
};
use waypost_core::viewer::{ConfirmPrompt, MediaViewer, PromptEvent};

use waypost_debug::pretty::PrettyPrintSink;
use waypost_debug::recorder::RecorderSink;

/// Simulated length of every riddle video, in seconds.
const VIDEO_SECS: f64 = 40.0;
/// Riddle whose video fails to load.
const BROKEN_VIDEO: &str = "2";
/// Number of location samples on the walk to the destination.
const WALK_FIXES: u32 = 12;

/// Forwards every event to the pretty printer and the recorder.
struct Fanout {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Fanout {
    fn on_countdown_tick(&mut self, e: &CountdownTickEvent) {
        self.pretty.on_countdown_tick(e);
        self.recorder.on_countdown_tick(e);
    }

    fn on_countdown_complete(&mut self, e: &CountdownCompleteEvent) {
        self.pretty.on_countdown_complete(e);
        self.recorder.on_countdown_complete(e);
    }

    fn on_password_attempt(&mut self, e: &PasswordAttemptEvent) {
        self.pretty.on_password_attempt(e);
        self.recorder.on_password_attempt(e);
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        self.pretty.on_unlock(e);
        self.recorder.on_unlock(e);
    }

    fn on_geo_fix(&mut self, e: &GeoFixEvent) {
        self.pretty.on_geo_fix(e);
        self.recorder.on_geo_fix(e);
    }

    fn on_geo_error(&mut self, e: &GeoErrorEvent) {
        self.pretty.on_geo_error(e);
        self.recorder.on_geo_error(e);
    }

    fn on_arrival(&mut self, e: &ArrivalEvent) {
        self.pretty.on_arrival(e);
        self.recorder.on_arrival(e);
    }

    fn on_navigate(&mut self, e: &NavigateEvent) {
        self.pretty.on_navigate(e);
        self.recorder.on_navigate(e);
    }
}

fn main() {
    let config = HuntConfig::default();
    let clock = ManualClock::new(Timestamp(1_000_000));
    let mut sink = Fanout {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder: RecorderSink::new(),
    };
    let mut tracer = Tracer::new(&mut sink);

    // -- gate ----------------------------------------------------------------
    let target = clock.now() + Duration::from_secs(5);
    let mut countdown = Countdown::new(Some(target), clock.now(), config.countdown);
    navigate(&mut tracer, &clock, &Route::Gate);
    let StartAction::Tick { every } = countdown.start() else {
        unreachable!("target is in the future");
    };
    loop {
        clock.advance(every);
        match countdown.tick(clock.now()) {
            TickOutcome::Running(state) => tracer.countdown_tick(&CountdownTickEvent {
                at: clock.now(),
                remaining: Duration::from_millis(state.remaining.total_millis()),
                progress_percent: state.progress_percent,
            }),
            TickOutcome::Completed { notify_after, .. } => {
                tracer.countdown_complete(&CountdownCompleteEvent {
                    at: clock.now(),
                    notify_after,
                });
                clock.advance(notify_after);
                break;
            }
            TickOutcome::Idle => break,
        }
    }
    if countdown.notify() {
        navigate(&mut tracer, &clock, &Route::riddle(&config.riddles.first().path));
    }

    // -- riddles -------------------------------------------------------------
    for (index, entry) in config.riddles.entries().iter().enumerate() {
        let step = index + 1;
        if index > 0 {
            // Walk to the next QR code.
            clock.advance(Duration::from_secs(90));
            navigate(&mut tracer, &clock, &Route::riddle(&entry.path));
        }

        let mut gate = PasswordGate::new(entry.password.clone());
        for attempt in ["palpite", entry.password.as_str()] {
            clock.advance(Duration::from_secs(4));
            gate.edit(attempt);
            let outcome = gate.submit(clock.now());
            tracer.password_attempt(&PasswordAttemptEvent {
                at: clock.now(),
                step,
                outcome,
            });
        }

        let mut viewer = MediaViewer::new(config.unlock, clock.now());
        let reason = if entry.path == BROKEN_VIDEO {
            let early = viewer.error(clock.now());
            debug_assert!(early.is_none(), "media errors unlock after a grace period");
            let deadline = viewer.next_deadline().unwrap_or(clock.now());
            clock.set(deadline);
            viewer.poll(clock.now())
        } else {
            let mut current = 0.0;
            loop {
                clock.advance(Duration::from_secs(1));
                current += 1.0;
                if let Some(reason) = viewer.time_update(current, VIDEO_SECS) {
                    break Some(reason);
                }
                if current >= VIDEO_SECS {
                    break viewer.ended();
                }
            }
        };
        if let Some(reason) = reason {
            tracer.unlock(&UnlockEvent {
                at: clock.now(),
                step,
                reason,
            });
        }

        if config.is_prompt_step(&entry.path) {
            let mut prompt = ConfirmPrompt::new(config.prompt, clock.now());
            // Nobody presses the button: let it confirm on its own.
            while let Some(deadline) = prompt.next_deadline() {
                clock.set(deadline);
                if prompt.poll(clock.now()) == Some(PromptEvent::AutoConfirmed) {
                    navigate(&mut tracer, &clock, &Route::Final);
                }
            }
            break;
        }
    }

    // -- map -----------------------------------------------------------------
    let destination = config.destination;
    let mut navigator = Navigator::new(destination, Canvas::MAP);
    clock.advance(Duration::from_secs(2));
    // The first request times out and the participant presses retry.
    if navigator.on_initial_error(GeoError::Timeout) {
        tracer.geo_error(&GeoErrorEvent {
            at: clock.now(),
            error: GeoError::Timeout,
            initial: true,
        });
        clock.advance(Duration::from_secs(5));
        navigate(&mut tracer, &clock, &Route::Final);
        navigator = Navigator::new(destination, Canvas::MAP);
    }
    let start = GeoPoint::new(
        destination.point.latitude + 0.012,
        destination.point.longitude - 0.009,
    );
    for i in 0..=WALK_FIXES {
        clock.advance(Duration::from_secs(45));
        let t = f64::from(i) / f64::from(WALK_FIXES);
        let fix = GeoFix {
            point: GeoPoint::new(
                start.latitude + (destination.point.latitude - start.latitude) * t,
                start.longitude + (destination.point.longitude - start.longitude) * t,
            ),
            accuracy_m: 25.0 - 15.0 * t,
            timestamp: clock.now(),
        };
        let Some(update) = navigator.on_fix(fix) else {
            continue;
        };
        let distance_m = update.reading.distance_m();
        tracer.geo_fix(&GeoFixEvent {
            at: clock.now(),
            latitude: fix.point.latitude,
            longitude: fix.point.longitude,
            accuracy_m: fix.accuracy_m,
            distance_m,
            near: update.reading.near,
        });
        if update.arrived_now {
            tracer.arrival(&ArrivalEvent {
                at: clock.now(),
                distance_m,
            });
            navigator.dismiss_modal();
        }
    }
    drop(tracer);

    // -- export Chrome trace -------------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    waypost_debug::chrome::export(sink.recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path}");
}

fn navigate(tracer: &mut Tracer<'_>, clock: &ManualClock, route: &Route) {
    tracer.navigate(&NavigateEvent {
        at: clock.now(),
        to: NavTarget::from(route),
        redirect: false,
    });
}
