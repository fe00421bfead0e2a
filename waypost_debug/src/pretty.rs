// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in seconds relative to the first event the sink sees.

use std::io::Write;

use waypost_core::password::SubmitOutcome;
use waypost_core::time::Timestamp;
use waypost_core::trace::{
    ArrivalEvent, CountdownCompleteEvent, CountdownTickEvent, GeoErrorEvent, GeoFixEvent,
    HostErrorEvent, NavTarget, NavigateEvent, PasswordAttemptEvent, TraceSink, UnlockEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    origin: Option<Timestamp>,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            origin: None,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            origin: None,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            origin: None,
        }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Seconds since the first event, latching the origin on first use.
    fn rel_secs(&mut self, at: Timestamp) -> f64 {
        let origin = *self.origin.get_or_insert(at);
        at.saturating_duration_since(origin).millis() as f64 / 1000.0
    }
}

fn outcome_name(outcome: SubmitOutcome) -> &'static str {
    match outcome {
        SubmitOutcome::Accepted => "accepted",
        SubmitOutcome::Rejected => "rejected",
        SubmitOutcome::Empty => "empty",
    }
}

fn target_path(target: NavTarget) -> String {
    match target {
        NavTarget::Gate => "/".to_owned(),
        NavTarget::Riddle(step) => format!("/riddle/{step}"),
        NavTarget::Final => "/final".to_owned(),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_countdown_tick(&mut self, e: &CountdownTickEvent) {
        let t = self.rel_secs(e.at);
        let b = e.remaining.breakdown();
        let _ = writeln!(
            self.writer,
            "[countdown] t={t:.3}s remaining={}d {:02}:{:02}:{:02} progress={:.1}%",
            b.days, b.hours, b.minutes, b.seconds, e.progress_percent,
        );
    }

    fn on_countdown_complete(&mut self, e: &CountdownCompleteEvent) {
        let t = self.rel_secs(e.at);
        let _ = writeln!(
            self.writer,
            "[countdown:done] t={t:.3}s notify_after={}ms",
            e.notify_after.millis(),
        );
    }

    fn on_password_attempt(&mut self, e: &PasswordAttemptEvent) {
        let t = self.rel_secs(e.at);
        let _ = writeln!(
            self.writer,
            "[password] t={t:.3}s step={} {}",
            e.step,
            outcome_name(e.outcome),
        );
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        let t = self.rel_secs(e.at);
        let _ = writeln!(
            self.writer,
            "[unlock] t={t:.3}s step={} reason={}",
            e.step,
            e.reason.as_str(),
        );
    }

    fn on_geo_fix(&mut self, e: &GeoFixEvent) {
        let t = self.rel_secs(e.at);
        let _ = writeln!(
            self.writer,
            "[fix] t={t:.3}s lat={:.6} lon={:.6} acc={:.0}m dist={:.0}m near={}",
            e.latitude, e.longitude, e.accuracy_m, e.distance_m, e.near,
        );
    }

    fn on_geo_error(&mut self, e: &GeoErrorEvent) {
        let t = self.rel_secs(e.at);
        let phase = if e.initial { "initial" } else { "watch" };
        let _ = writeln!(
            self.writer,
            "[fix:error] t={t:.3}s {phase} {:?}",
            e.error,
        );
    }

    fn on_arrival(&mut self, e: &ArrivalEvent) {
        let t = self.rel_secs(e.at);
        let _ = writeln!(
            self.writer,
            "[arrival] t={t:.3}s dist={:.0}m",
            e.distance_m,
        );
    }

    fn on_navigate(&mut self, e: &NavigateEvent) {
        let t = self.rel_secs(e.at);
        let kind = if e.redirect { "redirect" } else { "push" };
        let _ = writeln!(
            self.writer,
            "[nav] t={t:.3}s {kind} {}",
            target_path(e.to),
        );
    }

    fn on_host_error(&mut self, e: &HostErrorEvent<'_>) {
        let t = self.rel_secs(e.at);
        let _ = writeln!(
            self.writer,
            "[host:error] t={t:.3}s op={} {}",
            e.op.as_str(),
            e.detail,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypost_core::navigator::GeoError;
    use waypost_core::time::Duration;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn times_are_relative_to_first_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_navigate(&NavigateEvent {
            at: Timestamp(10_000),
            to: NavTarget::Riddle(1),
            redirect: false,
        });
        sink.on_password_attempt(&PasswordAttemptEvent {
            at: Timestamp(12_500),
            step: 1,
            outcome: SubmitOutcome::Rejected,
        });
        let out = output(sink);
        assert!(out.contains("[nav] t=0.000s push /riddle/1"), "got: {out}");
        assert!(out.contains("[password] t=2.500s step=1 rejected"), "got: {out}");
    }

    #[test]
    fn countdown_tick_shows_breakdown() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_countdown_tick(&CountdownTickEvent {
            at: Timestamp(0),
            remaining: Duration::from_secs(86_400 + 3_600 + 61),
            progress_percent: 42.0,
        });
        let out = output(sink);
        assert!(out.contains("remaining=1d 01:01:01"), "got: {out}");
        assert!(out.contains("progress=42.0%"), "got: {out}");
    }

    #[test]
    fn errors_name_their_source() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_geo_error(&GeoErrorEvent {
            at: Timestamp(0),
            error: GeoError::Timeout,
            initial: true,
        });
        sink.on_host_error(&HostErrorEvent {
            at: Timestamp(0),
            op: waypost_core::trace::HostOp::Orientation,
            detail: "NotSupportedError",
        });
        let out = output(sink);
        assert!(out.contains("[fix:error] t=0.000s initial Timeout"), "got: {out}");
        assert!(out.contains("op=orientation NotSupportedError"), "got: {out}");
    }
}
