// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Progress-gated media viewer and the follow-up confirmation prompt.
//!
//! ## Unlocking
//!
//! A [`MediaViewer`] starts [`ViewerState::Locked`] and moves to
//! [`ViewerState::Unlocked`] on the first of:
//!
//! - a playback position at or past [`UnlockPolicy::watched_fraction`],
//! - the end-of-media event,
//! - a media error followed by [`UnlockPolicy::error_grace`] (or an explicit
//!   [`MediaViewer::unlock_now`] in the meantime),
//! - [`UnlockPolicy::fallback_after`] from mount, when configured.
//!
//! `Unlocked` is terminal. Every method that can unlock returns
//! `Some(reason)` only on the call that performed the transition, so callers
//! can reveal the panel and emit a trace event exactly once.
//!
//! Time-based triggers are evaluated in [`MediaViewer::poll`]; the host
//! schedules a one-shot timer for [`MediaViewer::next_deadline`].
//!
//! ## Confirmation prompt
//!
//! On the designated step, a [`ConfirmPrompt`] is armed at unlock. It becomes
//! visible after [`PromptTiming::delay`], counts down
//! [`PromptTiming::auto_confirm_after`] in whole seconds, and confirms on its
//! own at zero unless the participant returns to the clue first.

use crate::time::{Duration, Timestamp};

/// Thresholds that unlock a [`MediaViewer`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnlockPolicy {
    /// Fraction of the media, in `(0, 1]`, that counts as watched.
    pub watched_fraction: f64,
    /// Delay between a media error and the automatic unlock.
    pub error_grace: Duration,
    /// Unconditional unlock this long after mount, if set.
    pub fallback_after: Option<Duration>,
}

impl UnlockPolicy {
    /// The shipped policy: 90% watched, 3 s grace on error, no fallback.
    pub const DEFAULT: Self = Self {
        watched_fraction: 0.9,
        error_grace: Duration::from_millis(3_000),
        fallback_after: None,
    };
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Why a viewer unlocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnlockReason {
    /// Playback crossed the watched fraction.
    Watched,
    /// Playback reached the end.
    Ended,
    /// The media failed and the grace period ran out.
    MediaError,
    /// The participant used the manual unlock after a media failure.
    ManualOverride,
    /// The mount-relative fallback fired.
    Fallback,
}

impl UnlockReason {
    /// Short lower-case name, for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watched => "watched",
            Self::Ended => "ended",
            Self::MediaError => "media-error",
            Self::ManualOverride => "manual",
            Self::Fallback => "fallback",
        }
    }
}

/// Lock state of the clue panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerState {
    /// The panel is hidden.
    Locked,
    /// The panel is shown. Terminal.
    Unlocked(UnlockReason),
}

/// What the host should do with the media element after [`MediaViewer::restart`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEffect {
    /// Seek to the start and play.
    SeekToStart,
}

/// What the host should do with the screen orientation after a fullscreen
/// transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrientationRequest {
    /// Lock to landscape.
    LockLandscape,
    /// Release any lock.
    Unlock,
}

/// Warning shown when the media could not be loaded.
pub const MEDIA_ERROR_MESSAGE: &str =
    "Problema ao carregar o vídeo. O conteúdo será liberado em instantes.";

/// Playback tracking and unlock logic for one video.
#[derive(Clone, Debug)]
pub struct MediaViewer {
    policy: UnlockPolicy,
    mounted_at: Timestamp,
    fraction_watched: f64,
    failed_at: Option<Timestamp>,
    state: ViewerState,
}

impl MediaViewer {
    /// Creates a locked viewer mounted at `now`.
    #[must_use]
    pub fn new(policy: UnlockPolicy, now: Timestamp) -> Self {
        Self {
            policy,
            mounted_at: now,
            fraction_watched: 0.0,
            failed_at: None,
            state: ViewerState::Locked,
        }
    }

    /// Records a playback position. Unlocks once the watched fraction is
    /// reached.
    ///
    /// Non-finite or non-positive durations (metadata not loaded yet) are
    /// ignored.
    pub fn time_update(&mut self, current_secs: f64, duration_secs: f64) -> Option<UnlockReason> {
        if !(duration_secs.is_finite() && duration_secs > 0.0 && current_secs.is_finite()) {
            return None;
        }
        self.fraction_watched = (current_secs / duration_secs).clamp(0.0, 1.0);
        if self.fraction_watched >= self.policy.watched_fraction {
            self.unlock(UnlockReason::Watched)
        } else {
            None
        }
    }

    /// Records the end-of-media event.
    pub fn ended(&mut self) -> Option<UnlockReason> {
        self.fraction_watched = 1.0;
        self.unlock(UnlockReason::Ended)
    }

    /// Records a media error at `now`.
    ///
    /// Arms the grace timer and enables [`unlock_now`](Self::unlock_now). A
    /// zero grace unlocks immediately.
    pub fn error(&mut self, now: Timestamp) -> Option<UnlockReason> {
        if self.failed_at.is_none() {
            self.failed_at = Some(now);
        }
        self.poll(now)
    }

    /// Manual unlock. Only available after a media error.
    pub fn unlock_now(&mut self) -> Option<UnlockReason> {
        if self.failed_at.is_some() {
            self.unlock(UnlockReason::ManualOverride)
        } else {
            None
        }
    }

    /// Evaluates the time-based triggers.
    pub fn poll(&mut self, now: Timestamp) -> Option<UnlockReason> {
        if let Some(failed_at) = self.failed_at
            && now >= failed_at + self.policy.error_grace
        {
            return self.unlock(UnlockReason::MediaError);
        }
        if let Some(after) = self.policy.fallback_after
            && now >= self.mounted_at + after
        {
            return self.unlock(UnlockReason::Fallback);
        }
        None
    }

    /// The earliest instant at which [`poll`](Self::poll) could unlock, if
    /// the viewer is still locked.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Timestamp> {
        if self.is_unlocked() {
            return None;
        }
        let grace = self.failed_at.map(|t| t + self.policy.error_grace);
        let fallback = self.policy.fallback_after.map(|d| self.mounted_at + d);
        match (grace, fallback) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Rewinds playback. Never re-locks.
    pub fn restart(&mut self) -> PlaybackEffect {
        self.fraction_watched = 0.0;
        PlaybackEffect::SeekToStart
    }

    /// Maps a fullscreen change to an orientation request.
    ///
    /// Entering fullscreen asks for landscape; leaving releases the lock.
    #[must_use]
    pub const fn fullscreen_changed(is_fullscreen: bool) -> OrientationRequest {
        if is_fullscreen {
            OrientationRequest::LockLandscape
        } else {
            OrientationRequest::Unlock
        }
    }

    /// Latest playback fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction_watched(&self) -> f64 {
        self.fraction_watched
    }

    /// Whether a media error was reported.
    #[must_use]
    pub fn media_failed(&self) -> bool {
        self.failed_at.is_some()
    }

    /// Whether the clue panel is shown.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, ViewerState::Unlocked(_))
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ViewerState {
        self.state
    }

    fn unlock(&mut self, reason: UnlockReason) -> Option<UnlockReason> {
        match self.state {
            ViewerState::Locked => {
                self.state = ViewerState::Unlocked(reason);
                Some(reason)
            }
            ViewerState::Unlocked(_) => None,
        }
    }
}

/// Timing of a [`ConfirmPrompt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PromptTiming {
    /// Time between unlock and the prompt appearing.
    pub delay: Duration,
    /// Time the prompt stays up before confirming on its own.
    pub auto_confirm_after: Duration,
}

impl Default for PromptTiming {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(15),
            auto_confirm_after: Duration::from_secs(15),
        }
    }
}

/// Where a [`ConfirmPrompt`] is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptPhase {
    /// Not shown yet.
    Pending {
        /// When it will appear.
        show_at: Timestamp,
    },
    /// On screen, counting down.
    Visible {
        /// When it confirms on its own.
        confirm_at: Timestamp,
    },
    /// The participant confirmed, or the countdown ran out.
    Confirmed,
    /// The participant went back to the clue.
    Dismissed,
}

/// Transitions reported by [`ConfirmPrompt::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptEvent {
    /// The prompt just appeared.
    Shown,
    /// The countdown ran out; navigate to the final screen.
    AutoConfirmed,
}

/// "Have you read the clue?" prompt shown after unlock on the designated step.
#[derive(Clone, Copy, Debug)]
pub struct ConfirmPrompt {
    timing: PromptTiming,
    phase: PromptPhase,
}

impl ConfirmPrompt {
    /// Arms a prompt for a viewer that unlocked at `unlocked_at`.
    #[must_use]
    pub fn new(timing: PromptTiming, unlocked_at: Timestamp) -> Self {
        Self {
            timing,
            phase: PromptPhase::Pending {
                show_at: unlocked_at + timing.delay,
            },
        }
    }

    /// Advances the prompt to `now`.
    pub fn poll(&mut self, now: Timestamp) -> Option<PromptEvent> {
        match self.phase {
            PromptPhase::Pending { show_at } if now >= show_at => {
                let confirm_at = show_at + self.timing.auto_confirm_after;
                if now >= confirm_at {
                    self.phase = PromptPhase::Confirmed;
                    return Some(PromptEvent::AutoConfirmed);
                }
                self.phase = PromptPhase::Visible { confirm_at };
                Some(PromptEvent::Shown)
            }
            PromptPhase::Visible { confirm_at } if now >= confirm_at => {
                self.phase = PromptPhase::Confirmed;
                Some(PromptEvent::AutoConfirmed)
            }
            _ => None,
        }
    }

    /// Whole seconds left before auto-confirmation, while visible.
    #[must_use]
    pub fn seconds_left(&self, now: Timestamp) -> Option<u64> {
        match self.phase {
            PromptPhase::Visible { confirm_at } => {
                Some(now.saturating_duration_until(confirm_at).ceil_secs())
            }
            _ => None,
        }
    }

    /// The participant confirmed. Returns `true` if the caller should
    /// navigate to the final screen.
    pub fn confirm_read(&mut self) -> bool {
        match self.phase {
            PromptPhase::Visible { .. } => {
                self.phase = PromptPhase::Confirmed;
                true
            }
            _ => false,
        }
    }

    /// The participant went back to the clue. The prompt will not reappear.
    pub fn return_to_clue(&mut self) {
        if !matches!(self.phase, PromptPhase::Confirmed) {
            self.phase = PromptPhase::Dismissed;
        }
    }

    /// Whether the prompt is on screen.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self.phase, PromptPhase::Visible { .. })
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PromptPhase {
        self.phase
    }

    /// Next instant at which [`poll`](Self::poll) has something to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Timestamp> {
        match self.phase {
            PromptPhase::Pending { show_at } => Some(show_at),
            PromptPhase::Visible { confirm_at } => Some(confirm_at),
            PromptPhase::Confirmed | PromptPhase::Dismissed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> MediaViewer {
        MediaViewer::new(UnlockPolicy::default(), Timestamp(0))
    }

    #[test]
    fn below_threshold_stays_locked() {
        let mut v = viewer();
        assert_eq!(v.time_update(8.9, 10.0), None);
        assert_eq!(v.state(), ViewerState::Locked);
        assert_eq!(v.poll(Timestamp(1_000_000)), None, "no fallback by default");
        assert_eq!(v.next_deadline(), None);
    }

    #[test]
    fn watched_fraction_unlocks_once() {
        let mut v = viewer();
        assert_eq!(v.time_update(9.0, 10.0), Some(UnlockReason::Watched));
        assert!(v.is_unlocked());
        assert_eq!(v.time_update(10.0, 10.0), None);
        assert_eq!(v.ended(), None);
        assert_eq!(v.state(), ViewerState::Unlocked(UnlockReason::Watched));
    }

    #[test]
    fn unknown_duration_is_ignored() {
        let mut v = viewer();
        assert_eq!(v.time_update(5.0, 0.0), None);
        assert_eq!(v.time_update(5.0, f64::NAN), None);
        assert_eq!(v.time_update(5.0, f64::INFINITY), None);
        assert_eq!(v.fraction_watched(), 0.0);
    }

    #[test]
    fn end_event_unlocks() {
        let mut v = viewer();
        v.time_update(1.0, 10.0);
        assert_eq!(v.ended(), Some(UnlockReason::Ended));
        assert_eq!(v.fraction_watched(), 1.0);
    }

    #[test]
    fn media_error_unlocks_after_grace() {
        let mut v = viewer();
        assert_eq!(v.error(Timestamp(500)), None);
        assert!(v.media_failed());
        assert_eq!(v.next_deadline(), Some(Timestamp(3_500)));
        assert_eq!(v.poll(Timestamp(3_499)), None);
        assert_eq!(v.poll(Timestamp(3_500)), Some(UnlockReason::MediaError));
        assert_eq!(v.poll(Timestamp(9_000)), None);
        assert_eq!(v.next_deadline(), None);
    }

    #[test]
    fn repeated_errors_do_not_push_the_deadline() {
        let mut v = viewer();
        v.error(Timestamp(0));
        v.error(Timestamp(2_000));
        assert_eq!(v.next_deadline(), Some(Timestamp(3_000)));
    }

    #[test]
    fn manual_unlock_requires_failure() {
        let mut v = viewer();
        assert_eq!(v.unlock_now(), None);
        v.error(Timestamp(0));
        assert_eq!(v.unlock_now(), Some(UnlockReason::ManualOverride));
        assert_eq!(v.poll(Timestamp(10_000)), None);
    }

    #[test]
    fn fallback_when_configured() {
        let policy = UnlockPolicy {
            fallback_after: Some(Duration::from_secs(3)),
            ..UnlockPolicy::default()
        };
        let mut v = MediaViewer::new(policy, Timestamp(1_000));
        assert_eq!(v.next_deadline(), Some(Timestamp(4_000)));
        v.error(Timestamp(2_000));
        // The fallback comes due before the error grace does.
        assert_eq!(v.next_deadline(), Some(Timestamp(4_000)));
        assert_eq!(v.poll(Timestamp(4_000)), Some(UnlockReason::Fallback));
    }

    #[test]
    fn restart_never_relocks() {
        let mut v = viewer();
        v.ended();
        assert_eq!(v.restart(), PlaybackEffect::SeekToStart);
        assert_eq!(v.fraction_watched(), 0.0);
        assert!(v.is_unlocked());
    }

    #[test]
    fn fullscreen_orientation() {
        assert_eq!(
            MediaViewer::fullscreen_changed(true),
            OrientationRequest::LockLandscape
        );
        assert_eq!(
            MediaViewer::fullscreen_changed(false),
            OrientationRequest::Unlock
        );
    }

    #[test]
    fn prompt_shows_then_auto_confirms() {
        let mut p = ConfirmPrompt::new(PromptTiming::default(), Timestamp(10_000));
        assert_eq!(p.next_deadline(), Some(Timestamp(25_000)));
        assert_eq!(p.poll(Timestamp(24_999)), None);
        assert!(!p.is_visible());

        assert_eq!(p.poll(Timestamp(25_000)), Some(PromptEvent::Shown));
        assert!(p.is_visible());
        assert_eq!(p.seconds_left(Timestamp(25_000)), Some(15));
        assert_eq!(p.seconds_left(Timestamp(25_001)), Some(15));
        assert_eq!(p.seconds_left(Timestamp(39_000)), Some(1));

        assert_eq!(p.poll(Timestamp(40_000)), Some(PromptEvent::AutoConfirmed));
        assert_eq!(p.phase(), PromptPhase::Confirmed);
        assert_eq!(p.poll(Timestamp(50_000)), None);
        assert_eq!(p.next_deadline(), None);
    }

    #[test]
    fn prompt_confirm_navigates_once() {
        let mut p = ConfirmPrompt::new(PromptTiming::default(), Timestamp(0));
        assert!(!p.confirm_read(), "not visible yet");
        p.poll(Timestamp(15_000));
        assert!(p.confirm_read());
        assert!(!p.confirm_read());
    }

    #[test]
    fn prompt_return_cancels() {
        let mut p = ConfirmPrompt::new(PromptTiming::default(), Timestamp(0));
        p.poll(Timestamp(15_000));
        p.return_to_clue();
        assert_eq!(p.phase(), PromptPhase::Dismissed);
        assert_eq!(p.next_deadline(), None);
        assert_eq!(p.poll(Timestamp(60_000)), None);
        assert_eq!(p.seconds_left(Timestamp(20_000)), None);

        // Returning before it shows also cancels it.
        let mut early = ConfirmPrompt::new(PromptTiming::default(), Timestamp(0));
        early.return_to_clue();
        assert_eq!(early.poll(Timestamp(15_000)), None);
    }

    #[test]
    fn late_poll_skips_straight_to_confirmation() {
        let mut p = ConfirmPrompt::new(PromptTiming::default(), Timestamp(0));
        assert_eq!(p.poll(Timestamp(31_000)), Some(PromptEvent::AutoConfirmed));
    }
}
