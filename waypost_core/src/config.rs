// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static hunt configuration.
//!
//! [`HuntConfig::default`] carries the shipped hunt. With the `serde`
//! feature, a config can also be deserialized; every field is optional and
//! missing fields keep their defaults. Run [`HuntConfig::validate`] on
//! anything that did not come from `default()`.

use alloc::string::String;
use core::fmt;

use chrono::TimeZone;

use crate::countdown::CountdownConfig;
use crate::gate::GateConfig;
use crate::navigator::DestinationConfig;
use crate::riddle::RiddleTable;
use crate::time::{self, Timestamp};
use crate::viewer::{PromptTiming, UnlockPolicy};

/// A configuration the hunt cannot run with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The riddle table has no entries.
    EmptyTable,
    /// The entry at 1-based `position` does not have path `position`.
    NonDensePaths {
        /// Where the mismatch is.
        position: usize,
        /// The path found there.
        found: String,
    },
    /// The confirmation prompt names a step missing from the table.
    UnknownPromptStep(String),
    /// The arrival threshold is not a positive number of meters.
    InvalidThreshold,
    /// The watched fraction is outside `(0, 1]`.
    InvalidUnlockFraction,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable => f.write_str("riddle table is empty"),
            Self::NonDensePaths { position, found } => {
                write!(f, "riddle #{position} has path {found:?}, expected \"{position}\"")
            }
            Self::UnknownPromptStep(step) => {
                write!(f, "prompt step {step:?} is not in the riddle table")
            }
            Self::InvalidThreshold => f.write_str("arrival threshold must be a positive number"),
            Self::InvalidUnlockFraction => {
                f.write_str("watched fraction must be greater than 0 and at most 1")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Everything that defines one hunt.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HuntConfig {
    /// Opening instant, `YYYY-MM-DDTHH:MM[:SS]`, read in the participant's
    /// local time unless it carries a zone designator.
    pub target_date: String,
    /// Riddles in hunt order.
    pub riddles: RiddleTable,
    /// The final destination.
    pub destination: DestinationConfig,
    /// What unlocks a riddle's clue panel.
    pub unlock: UnlockPolicy,
    /// Step that asks for confirmation and then sends the participant to the
    /// map. `None` disables the prompt.
    pub prompt_step: Option<String>,
    /// Confirmation prompt timing.
    pub prompt: PromptTiming,
    /// Countdown timing.
    pub countdown: CountdownConfig,
    /// Token accepted in the `devToken` query parameter.
    pub dev_token: Option<String>,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            target_date: String::from("2025-08-12T00:00:00"),
            riddles: RiddleTable::default(),
            destination: DestinationConfig::DEFAULT,
            unlock: UnlockPolicy::DEFAULT,
            prompt_step: Some(String::from("3")),
            prompt: PromptTiming::default(),
            countdown: CountdownConfig::default(),
            dev_token: None,
        }
    }
}

impl HuntConfig {
    /// Checks cross-field constraints.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if let Some(step) = &self.prompt_step
            && self.riddles.get_by_path(step).is_none()
        {
            return Err(ConfigError::UnknownPromptStep(step.clone()));
        }
        let threshold = self.destination.arrival_threshold_m;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold);
        }
        let fraction = self.unlock.watched_fraction;
        if fraction.is_nan() || fraction <= 0.0 || fraction > 1.0 {
            return Err(ConfigError::InvalidUnlockFraction);
        }
        Ok(self)
    }

    /// The opening instant for a participant whose wall clock follows
    /// `local`. `None` if `target_date` does not parse.
    #[must_use]
    pub fn target<Tz: TimeZone>(&self, local: &Tz) -> Option<Timestamp> {
        time::parse_datetime(&self.target_date, local)
    }

    /// Builds the gate inputs.
    #[must_use]
    pub fn gate_config<Tz: TimeZone>(&self, local: &Tz, build_dev: bool) -> GateConfig {
        GateConfig {
            target: self.target(local),
            build_dev,
            dev_token: self.dev_token.clone(),
        }
    }

    /// Whether `step` shows the confirmation prompt after unlock.
    #[must_use]
    pub fn is_prompt_step(&self, step: &str) -> bool {
        self.prompt_step.as_deref() == Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn defaults_are_valid() {
        let cfg = HuntConfig::default().validate().expect("valid");
        assert!(cfg.is_prompt_step("3"));
        assert!(!cfg.is_prompt_step("4"));
        assert_eq!(cfg.destination.arrival_threshold_m, 120.0);
        assert_eq!(cfg.unlock.watched_fraction, 0.9);
    }

    #[test]
    fn target_follows_local_offset() {
        let cfg = HuntConfig::default();
        // 2025-08-12T00:00:00Z
        let utc = 1_754_956_800_000;
        assert_eq!(cfg.target(&Utc), Some(Timestamp(utc)));
        // UTC-3: local midnight is 03:00 UTC.
        let brt = FixedOffset::west_opt(3 * 3_600).unwrap();
        assert_eq!(cfg.target(&brt), Some(Timestamp(utc + 3 * 3_600_000)));
    }

    #[test]
    fn bad_date_yields_open_gate() {
        let cfg = HuntConfig {
            target_date: "someday".into(),
            ..HuntConfig::default()
        };
        let gate = cfg.gate_config(&Utc, false);
        assert_eq!(gate.target, None);
        assert!(!gate.build_dev);
    }

    #[test]
    fn rejects_bad_cross_fields() {
        let cfg = HuntConfig {
            prompt_step: Some("7".into()),
            ..HuntConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::UnknownPromptStep("7".into())));

        let mut cfg = HuntConfig::default();
        cfg.destination.arrival_threshold_m = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidThreshold));

        let mut cfg = HuntConfig::default();
        cfg.unlock.watched_fraction = 1.5;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidUnlockFraction));

        let cfg = HuntConfig {
            prompt_step: None,
            ..HuntConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn error_messages() {
        let e = ConfigError::NonDensePaths {
            position: 2,
            found: "5".into(),
        };
        assert_eq!(e.to_string(), "riddle #2 has path \"5\", expected \"2\"");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: HuntConfig = serde_json::from_str(
            r#"{
                "target_date": "2030-01-01T09:00:00",
                "destination": { "arrival_threshold_m": 50.0 },
                "unlock": { "fallback_after": 20000 },
                "dev_token": "s3cret"
            }"#,
        )
        .expect("parses");
        let cfg = cfg.validate().expect("valid");
        assert_eq!(cfg.target_date, "2030-01-01T09:00:00");
        assert_eq!(cfg.destination.arrival_threshold_m, 50.0);
        assert_eq!(cfg.destination.point, DestinationConfig::DEFAULT.point);
        assert_eq!(cfg.unlock.watched_fraction, 0.9);
        assert_eq!(cfg.unlock.fallback_after, Some(crate::time::Duration(20_000)));
        assert_eq!(cfg.riddles, RiddleTable::default());
        assert_eq!(cfg.dev_token.as_deref(), Some("s3cret"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_table_is_validated() {
        let err = serde_json::from_str::<HuntConfig>(
            r#"{ "riddles": [
                { "path": "1", "password": "a", "video_source": "/a.mp4", "message": "m" },
                { "path": "3", "password": "b", "video_source": "/b.mp4", "message": "m" }
            ] }"#,
        )
        .expect_err("gap in paths");
        assert!(err.to_string().contains("riddle #2"), "{err}");
    }
}
