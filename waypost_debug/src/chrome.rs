// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Countdown ticks become counter tracks (`"ph": "C"`) so remaining time and
//! progress plot as graphs. Everything else is an instant event, grouped by
//! category: `Countdown`, `Riddle`, `Location`, `Navigation`, `Host`.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use waypost_core::time::Timestamp;
use waypost_core::trace::NavTarget;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are in microseconds since the first recorded event.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut origin: Option<Timestamp> = None;

    for recorded in decode(bytes) {
        let at = recorded.at();
        let ts = to_us(at, *origin.get_or_insert(at));
        match recorded {
            RecordedEvent::CountdownTick(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Countdown",
                    "cat": "Countdown",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "remaining_s": e.remaining.millis() / 1000,
                        "progress": e.progress_percent,
                    }
                }));
            }
            RecordedEvent::CountdownComplete(e) => {
                events.push(instant("CountdownComplete", "Countdown", ts, json!({
                    "notify_after_ms": e.notify_after.millis(),
                })));
            }
            RecordedEvent::PasswordAttempt(e) => {
                events.push(instant("PasswordAttempt", "Riddle", ts, json!({
                    "step": e.step,
                    "outcome": format!("{:?}", e.outcome),
                })));
            }
            RecordedEvent::Unlock(e) => {
                events.push(instant("Unlock", "Riddle", ts, json!({
                    "step": e.step,
                    "reason": e.reason.as_str(),
                })));
            }
            RecordedEvent::GeoFix(e) => {
                events.push(instant("GeoFix", "Location", ts, json!({
                    "latitude": e.latitude,
                    "longitude": e.longitude,
                    "accuracy_m": e.accuracy_m,
                    "distance_m": e.distance_m,
                    "near": e.near,
                })));
            }
            RecordedEvent::GeoError(e) => {
                events.push(instant("GeoError", "Location", ts, json!({
                    "error": format!("{:?}", e.error),
                    "initial": e.initial,
                })));
            }
            RecordedEvent::Arrival(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Arrival",
                    "cat": "Location",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "distance_m": e.distance_m,
                    }
                }));
            }
            RecordedEvent::Navigate(e) => {
                events.push(instant("Navigate", "Navigation", ts, json!({
                    "to": target_path(e.to),
                    "redirect": e.redirect,
                })));
            }
            RecordedEvent::HostError { op, detail, .. } => {
                events.push(instant("HostError", "Host", ts, json!({
                    "op": op.as_str(),
                    "detail": detail,
                })));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn target_path(target: NavTarget) -> String {
    match target {
        NavTarget::Gate => "/".to_owned(),
        NavTarget::Riddle(step) => format!("/riddle/{step}"),
        NavTarget::Final => "/final".to_owned(),
    }
}

fn to_us(at: Timestamp, origin: Timestamp) -> f64 {
    at.saturating_duration_since(origin).millis() as f64 * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use waypost_core::password::SubmitOutcome;
    use waypost_core::time::Duration;
    use waypost_core::trace::{
        ArrivalEvent, CountdownTickEvent, NavigateEvent, PasswordAttemptEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_countdown_tick(&CountdownTickEvent {
            at: Timestamp(1_000),
            remaining: Duration::from_secs(90),
            progress_percent: 10.0,
        });
        rec.on_navigate(&NavigateEvent {
            at: Timestamp(2_000),
            to: NavTarget::Riddle(1),
            redirect: false,
        });
        rec.on_password_attempt(&PasswordAttemptEvent {
            at: Timestamp(2_500),
            step: 1,
            outcome: SubmitOutcome::Accepted,
        });
        rec.on_arrival(&ArrivalEvent {
            at: Timestamp(3_000),
            distance_m: 55.0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "C");
        assert_eq!(parsed[0]["ts"], 0.0);
        assert_eq!(parsed[0]["args"]["remaining_s"], 90);

        assert_eq!(parsed[1]["name"], "Navigate");
        assert_eq!(parsed[1]["ts"], 1_000_000.0);
        assert_eq!(parsed[1]["args"]["to"], "/riddle/1");

        assert_eq!(parsed[2]["args"]["outcome"], "Accepted");

        assert_eq!(parsed[3]["name"], "Arrival");
        assert_eq!(parsed[3]["s"], "g");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
