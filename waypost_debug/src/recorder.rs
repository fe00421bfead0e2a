// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each starting with a one-byte tag.
//! [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Host error details are stored as length-prefixed UTF-8, truncated to
//! [`MAX_DETAIL_BYTES`].

use waypost_core::navigator::GeoError;
use waypost_core::password::SubmitOutcome;
use waypost_core::time::{Duration, Timestamp};
use waypost_core::trace::{
    ArrivalEvent, CountdownCompleteEvent, CountdownTickEvent, GeoErrorEvent, GeoFixEvent,
    HostErrorEvent, HostOp, NavTarget, NavigateEvent, PasswordAttemptEvent, TraceSink,
    UnlockEvent,
};
use waypost_core::viewer::UnlockReason;

/// Longest host error detail kept by the recorder, in bytes.
pub const MAX_DETAIL_BYTES: usize = 1024;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_COUNTDOWN_TICK: u8 = 1;
const TAG_COUNTDOWN_COMPLETE: u8 = 2;
const TAG_PASSWORD_ATTEMPT: u8 = 3;
const TAG_UNLOCK: u8 = 4;
const TAG_GEO_FIX: u8 = 5;
const TAG_GEO_ERROR: u8 = 6;
const TAG_ARRIVAL: u8 = 7;
const TAG_NAVIGATE: u8 = 8;
const TAG_HOST_ERROR: u8 = 9;

const OPS: [HostOp; 7] = [
    HostOp::Fullscreen,
    HostOp::Orientation,
    HostOp::Geolocation,
    HostOp::Timer,
    HostOp::History,
    HostOp::Config,
    HostOp::Dom,
];

const REASONS: [UnlockReason; 5] = [
    UnlockReason::Watched,
    UnlockReason::Ended,
    UnlockReason::MediaError,
    UnlockReason::ManualOverride,
    UnlockReason::Fallback,
];

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_step(&mut self, step: usize) {
        self.write_u64(u64::try_from(step).unwrap_or(u64::MAX));
    }

    fn write_header(&mut self, tag: u8, at: Timestamp) {
        self.write_u8(tag);
        self.write_u64(at.millis());
    }

    fn write_outcome(&mut self, o: SubmitOutcome) {
        self.write_u8(match o {
            SubmitOutcome::Accepted => 0,
            SubmitOutcome::Rejected => 1,
            SubmitOutcome::Empty => 2,
        });
    }

    fn write_geo_error(&mut self, e: GeoError) {
        self.write_u8(match e {
            GeoError::PermissionDenied => 0,
            GeoError::Timeout => 1,
            GeoError::Unavailable => 2,
            GeoError::Unsupported => 3,
        });
    }

    fn write_target(&mut self, t: NavTarget) {
        match t {
            NavTarget::Gate => self.write_u8(0),
            NavTarget::Riddle(step) => {
                self.write_u8(1);
                self.write_step(step);
            }
            NavTarget::Final => self.write_u8(2),
        }
    }

    fn write_index<T: PartialEq>(&mut self, table: &[T], value: &T) {
        let idx = table.iter().position(|v| v == value).unwrap_or(0);
        self.write_u8(u8::try_from(idx).unwrap_or(0));
    }

    fn write_detail(&mut self, detail: &str) {
        let mut end = detail.len().min(MAX_DETAIL_BYTES);
        while !detail.is_char_boundary(end) {
            end -= 1;
        }
        let bytes = &detail.as_bytes()[..end];
        self.write_u16(u16::try_from(bytes.len()).unwrap_or(0));
        self.buf.extend_from_slice(bytes);
    }
}

impl TraceSink for RecorderSink {
    fn on_countdown_tick(&mut self, e: &CountdownTickEvent) {
        self.write_header(TAG_COUNTDOWN_TICK, e.at);
        self.write_u64(e.remaining.millis());
        self.write_f64(e.progress_percent);
    }

    fn on_countdown_complete(&mut self, e: &CountdownCompleteEvent) {
        self.write_header(TAG_COUNTDOWN_COMPLETE, e.at);
        self.write_u64(e.notify_after.millis());
    }

    fn on_password_attempt(&mut self, e: &PasswordAttemptEvent) {
        self.write_header(TAG_PASSWORD_ATTEMPT, e.at);
        self.write_step(e.step);
        self.write_outcome(e.outcome);
    }

    fn on_unlock(&mut self, e: &UnlockEvent) {
        self.write_header(TAG_UNLOCK, e.at);
        self.write_step(e.step);
        self.write_index(&REASONS, &e.reason);
    }

    fn on_geo_fix(&mut self, e: &GeoFixEvent) {
        self.write_header(TAG_GEO_FIX, e.at);
        self.write_f64(e.latitude);
        self.write_f64(e.longitude);
        self.write_f64(e.accuracy_m);
        self.write_f64(e.distance_m);
        self.write_bool(e.near);
    }

    fn on_geo_error(&mut self, e: &GeoErrorEvent) {
        self.write_header(TAG_GEO_ERROR, e.at);
        self.write_geo_error(e.error);
        self.write_bool(e.initial);
    }

    fn on_arrival(&mut self, e: &ArrivalEvent) {
        self.write_header(TAG_ARRIVAL, e.at);
        self.write_f64(e.distance_m);
    }

    fn on_navigate(&mut self, e: &NavigateEvent) {
        self.write_header(TAG_NAVIGATE, e.at);
        self.write_target(e.to);
        self.write_bool(e.redirect);
    }

    fn on_host_error(&mut self, e: &HostErrorEvent<'_>) {
        self.write_header(TAG_HOST_ERROR, e.at);
        self.write_index(&OPS, &e.op);
        self.write_detail(e.detail);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`CountdownTickEvent`].
    CountdownTick(CountdownTickEvent),
    /// A [`CountdownCompleteEvent`].
    CountdownComplete(CountdownCompleteEvent),
    /// A [`PasswordAttemptEvent`].
    PasswordAttempt(PasswordAttemptEvent),
    /// An [`UnlockEvent`].
    Unlock(UnlockEvent),
    /// A [`GeoFixEvent`].
    GeoFix(GeoFixEvent),
    /// A [`GeoErrorEvent`].
    GeoError(GeoErrorEvent),
    /// An [`ArrivalEvent`].
    Arrival(ArrivalEvent),
    /// A [`NavigateEvent`].
    Navigate(NavigateEvent),
    /// A [`HostErrorEvent`] with an owned detail.
    HostError {
        /// When the call failed.
        at: Timestamp,
        /// Which capability failed.
        op: HostOp,
        /// Host-provided reason, possibly truncated.
        detail: String,
    },
}

impl RecordedEvent {
    /// When the event happened.
    #[must_use]
    pub fn at(&self) -> Timestamp {
        match self {
            Self::CountdownTick(e) => e.at,
            Self::CountdownComplete(e) => e.at,
            Self::PasswordAttempt(e) => e.at,
            Self::Unlock(e) => e.at,
            Self::GeoFix(e) => e.at,
            Self::GeoError(e) => e.at,
            Self::Arrival(e) => e.at,
            Self::Navigate(e) => e.at,
            Self::HostError { at, .. } => *at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_bytes(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    fn read_u16(&mut self) -> Option<u16> {
        Some(u16::from_le_bytes(self.read_bytes(2)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_step(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_at(&mut self) -> Option<Timestamp> {
        self.read_u64().map(Timestamp)
    }

    fn read_outcome(&mut self) -> Option<SubmitOutcome> {
        Some(match self.read_u8()? {
            0 => SubmitOutcome::Accepted,
            1 => SubmitOutcome::Rejected,
            _ => SubmitOutcome::Empty,
        })
    }

    fn read_geo_error(&mut self) -> Option<GeoError> {
        Some(match self.read_u8()? {
            0 => GeoError::PermissionDenied,
            1 => GeoError::Timeout,
            2 => GeoError::Unavailable,
            _ => GeoError::Unsupported,
        })
    }

    fn read_target(&mut self) -> Option<NavTarget> {
        Some(match self.read_u8()? {
            0 => NavTarget::Gate,
            1 => NavTarget::Riddle(self.read_step()?),
            _ => NavTarget::Final,
        })
    }

    fn read_index<T: Copy>(&mut self, table: &[T]) -> Option<T> {
        table.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_detail(&mut self) -> Option<String> {
        let len = usize::from(self.read_u16()?);
        let bytes = self.read_bytes(len)?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        let at = self.read_at()?;
        Some(match tag {
            TAG_COUNTDOWN_TICK => RecordedEvent::CountdownTick(CountdownTickEvent {
                at,
                remaining: Duration::from_millis(self.read_u64()?),
                progress_percent: self.read_f64()?,
            }),
            TAG_COUNTDOWN_COMPLETE => RecordedEvent::CountdownComplete(CountdownCompleteEvent {
                at,
                notify_after: Duration::from_millis(self.read_u64()?),
            }),
            TAG_PASSWORD_ATTEMPT => RecordedEvent::PasswordAttempt(PasswordAttemptEvent {
                at,
                step: self.read_step()?,
                outcome: self.read_outcome()?,
            }),
            TAG_UNLOCK => RecordedEvent::Unlock(UnlockEvent {
                at,
                step: self.read_step()?,
                reason: self.read_index(&REASONS)?,
            }),
            TAG_GEO_FIX => RecordedEvent::GeoFix(GeoFixEvent {
                at,
                latitude: self.read_f64()?,
                longitude: self.read_f64()?,
                accuracy_m: self.read_f64()?,
                distance_m: self.read_f64()?,
                near: self.read_bool()?,
            }),
            TAG_GEO_ERROR => RecordedEvent::GeoError(GeoErrorEvent {
                at,
                error: self.read_geo_error()?,
                initial: self.read_bool()?,
            }),
            TAG_ARRIVAL => RecordedEvent::Arrival(ArrivalEvent {
                at,
                distance_m: self.read_f64()?,
            }),
            TAG_NAVIGATE => RecordedEvent::Navigate(NavigateEvent {
                at,
                to: self.read_target()?,
                redirect: self.read_bool()?,
            }),
            TAG_HOST_ERROR => RecordedEvent::HostError {
                at,
                op: self.read_index(&OPS)?,
                detail: self.read_detail()?,
            },
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_COUNTDOWN_TICK..=TAG_HOST_ERROR => self.decode_event(tag),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_session_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_navigate(&NavigateEvent {
            at: Timestamp(1_000),
            to: NavTarget::Riddle(2),
            redirect: false,
        });
        rec.on_password_attempt(&PasswordAttemptEvent {
            at: Timestamp(2_000),
            step: 2,
            outcome: SubmitOutcome::Rejected,
        });
        rec.on_unlock(&UnlockEvent {
            at: Timestamp(3_000),
            step: 2,
            reason: UnlockReason::MediaError,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3);
        match &events[0] {
            RecordedEvent::Navigate(e) => {
                assert_eq!(e.to, NavTarget::Riddle(2));
                assert!(!e.redirect);
            }
            other => panic!("expected Navigate, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::PasswordAttempt(e) => {
                assert_eq!(e.step, 2);
                assert_eq!(e.outcome, SubmitOutcome::Rejected);
            }
            other => panic!("expected PasswordAttempt, got {other:?}"),
        }
        match &events[2] {
            RecordedEvent::Unlock(e) => assert_eq!(e.reason, UnlockReason::MediaError),
            other => panic!("expected Unlock, got {other:?}"),
        }
        let times: Vec<u64> = events.iter().map(|e| e.at().millis()).collect();
        assert_eq!(times, [1_000, 2_000, 3_000]);
    }

    #[test]
    fn geo_fix_keeps_full_precision() {
        let mut rec = RecorderSink::new();
        rec.on_geo_fix(&GeoFixEvent {
            at: Timestamp(5),
            latitude: -7.257_106_781_268_056,
            longitude: -35.944_510_491_423_486,
            accuracy_m: 12.5,
            distance_m: 87.0,
            near: true,
        });
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::GeoFix(e)] => {
                assert_eq!(e.latitude, -7.257_106_781_268_056);
                assert_eq!(e.longitude, -35.944_510_491_423_486);
                assert!(e.near);
            }
            other => panic!("expected one GeoFix, got {other:?}"),
        }
    }

    #[test]
    fn host_error_detail_is_truncated_on_a_char_boundary() {
        let long = "é".repeat(MAX_DETAIL_BYTES);
        let mut rec = RecorderSink::new();
        rec.on_host_error(&HostErrorEvent {
            at: Timestamp(0),
            op: HostOp::Geolocation,
            detail: &long,
        });
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::HostError { op, detail, .. }] => {
                assert_eq!(*op, HostOp::Geolocation);
                assert_eq!(detail.len(), MAX_DETAIL_BYTES);
                assert!(detail.chars().all(|c| c == 'é'));
            }
            other => panic!("expected one HostError, got {other:?}"),
        }
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_arrival(&ArrivalEvent {
            at: Timestamp(9),
            distance_m: 40.0,
        });
        rec.on_geo_error(&GeoErrorEvent {
            at: Timestamp(10),
            error: GeoError::PermissionDenied,
            initial: false,
        });
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 1];
        let events: Vec<_> = decode(cut).collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RecordedEvent::Arrival(_)));
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        let events: Vec<_> = decode(&[0xFF, 0, 0]).collect();
        assert!(events.is_empty());
    }
}
