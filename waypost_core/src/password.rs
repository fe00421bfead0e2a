// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-riddle password gate.
//!
//! Matching trims the input and compares case-insensitively. A rejected
//! attempt clears the input and shows an error that expires on its own; there
//! is no lockout and no attempt counting.

use alloc::string::String;

use crate::time::{Duration, Timestamp};

/// Text shown after a rejected attempt.
pub const REJECTED_MESSAGE: &str = "Senha incorreta! Verifique a pista novamente.";

/// How long the rejection message stays visible.
pub const ERROR_DISPLAY: Duration = Duration::from_millis(3_000);

/// Returns `true` if `input`, trimmed, equals `expected` ignoring case.
#[must_use]
pub fn matches(input: &str, expected: &str) -> bool {
    input
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .eq(expected.chars().flat_map(char::to_lowercase))
}

/// Result of [`PasswordGate::submit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The password matched; the gate is now unlocked.
    Accepted,
    /// The password did not match; the input was cleared.
    Rejected,
    /// The input was blank; nothing happened.
    Empty,
}

/// Password entry state for one riddle screen.
#[derive(Clone, Debug)]
pub struct PasswordGate {
    expected: String,
    input: String,
    error_until: Option<Timestamp>,
    unlocked: bool,
}

impl PasswordGate {
    /// Creates a locked gate for `expected`.
    #[must_use]
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            input: String::new(),
            error_until: None,
            unlocked: false,
        }
    }

    /// Replaces the input text. Clears any visible error.
    pub fn edit(&mut self, text: &str) {
        self.input.clear();
        self.input.push_str(text);
        self.error_until = None;
    }

    /// Current input text.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether the submit control should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.unlocked && !self.input.trim().is_empty()
    }

    /// Checks the current input.
    ///
    /// Once unlocked, further submissions keep returning
    /// [`SubmitOutcome::Accepted`] without changing anything.
    pub fn submit(&mut self, now: Timestamp) -> SubmitOutcome {
        if self.unlocked {
            return SubmitOutcome::Accepted;
        }
        if self.input.trim().is_empty() {
            return SubmitOutcome::Empty;
        }
        if matches(&self.input, &self.expected) {
            self.unlocked = true;
            self.error_until = None;
            SubmitOutcome::Accepted
        } else {
            self.input.clear();
            self.error_until = Some(now + ERROR_DISPLAY);
            SubmitOutcome::Rejected
        }
    }

    /// Hides the error if its display time has passed. Returns `true` if
    /// this call hid it.
    pub fn expire_error(&mut self, now: Timestamp) -> bool {
        match self.error_until {
            Some(until) if now >= until => {
                self.error_until = None;
                true
            }
            _ => false,
        }
    }

    /// The error to display, if any.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.error_until.map(|_| REJECTED_MESSAGE)
    }

    /// When the visible error should be hidden.
    #[must_use]
    pub fn error_deadline(&self) -> Option<Timestamp> {
        self.error_until
    }

    /// Whether the correct password has been entered.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_case_insensitive_match() {
        assert!(matches(" Rosa2025 ", "rosa2025"));
        assert!(matches("FAMILIA2025", "Familia2025"));
        assert!(!matches("rosa2026", "rosa2025"));
        assert!(!matches("", "rosa2025"));
        assert!(matches("12/08/2025\n", "12/08/2025"));
    }

    #[test]
    fn accepted_is_terminal() {
        let mut gate = PasswordGate::new("rosa2025");
        gate.edit(" Rosa2025 ");
        assert!(gate.can_submit());
        assert_eq!(gate.submit(Timestamp(0)), SubmitOutcome::Accepted);
        assert!(gate.is_unlocked());
        assert!(!gate.can_submit());

        gate.edit("wrong");
        assert_eq!(gate.submit(Timestamp(1)), SubmitOutcome::Accepted);
        assert!(gate.is_unlocked());
    }

    #[test]
    fn rejection_clears_input_and_error_expires() {
        let mut gate = PasswordGate::new("rosa2025");
        gate.edit("rosa2026");
        assert_eq!(gate.submit(Timestamp(10_000)), SubmitOutcome::Rejected);
        assert!(!gate.is_unlocked());
        assert_eq!(gate.input(), "");
        assert_eq!(gate.error(), Some(REJECTED_MESSAGE));
        assert_eq!(gate.error_deadline(), Some(Timestamp(13_000)));

        assert!(!gate.expire_error(Timestamp(12_999)));
        assert!(gate.error().is_some());
        assert!(gate.expire_error(Timestamp(13_000)));
        assert_eq!(gate.error(), None);
        assert!(!gate.expire_error(Timestamp(20_000)), "already hidden");
    }

    #[test]
    fn editing_clears_error() {
        let mut gate = PasswordGate::new("x");
        gate.edit("y");
        gate.submit(Timestamp(0));
        assert!(gate.error().is_some());
        gate.edit("x");
        assert_eq!(gate.error(), None);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut gate = PasswordGate::new("x");
        gate.edit("   ");
        assert!(!gate.can_submit());
        assert_eq!(gate.submit(Timestamp(0)), SubmitOutcome::Empty);
        assert_eq!(gate.error(), None);
        assert_eq!(gate.input(), "   ");
    }

    #[test]
    fn retry_after_rejection_succeeds() {
        let mut gate = PasswordGate::new("24/07/2025");
        gate.edit("24/07/2024");
        assert_eq!(gate.submit(Timestamp(0)), SubmitOutcome::Rejected);
        gate.edit("24/07/2025");
        assert_eq!(gate.submit(Timestamp(1)), SubmitOutcome::Accepted);
        assert_eq!(gate.error(), None);
    }
}
