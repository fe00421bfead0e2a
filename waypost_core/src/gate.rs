// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entry gate: countdown or straight to the first riddle.

use alloc::string::String;

use crate::route::{Query, Route};
use crate::time::Timestamp;

/// Inputs to the gate decision, passed explicitly by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GateConfig {
    /// When the hunt opens. `None` if the configured date did not parse,
    /// which opens the hunt immediately.
    pub target: Option<Timestamp>,
    /// Development build: always bypass the countdown.
    pub build_dev: bool,
    /// Secret accepted in the `devToken` query parameter. Empty or `None`
    /// disables token bypass.
    pub dev_token: Option<String>,
}

/// Developer override of the countdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DevOverride {
    /// Whether the override is active.
    pub active: bool,
}

impl DevOverride {
    /// Query parameter that enables the override with value `1`.
    pub const DEV_PARAM: &'static str = "dev";
    /// Query parameter carrying the token.
    pub const TOKEN_PARAM: &'static str = "devToken";

    /// Active when the build is a development build, the query has `dev=1`,
    /// or the query's `devToken` equals a configured non-empty token.
    #[must_use]
    pub fn resolve(config: &GateConfig, query: &Query) -> Self {
        let flag = query.get(Self::DEV_PARAM) == Some("1");
        let token = match (config.dev_token.as_deref(), query.get(Self::TOKEN_PARAM)) {
            (Some(expected), Some(given)) => !expected.is_empty() && expected == given,
            _ => false,
        };
        Self {
            active: config.build_dev || flag || token,
        }
    }
}

/// What the gate screen should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the countdown.
    ShowCountdown,
    /// Navigate away immediately.
    Enter(Route),
}

/// Decides between the countdown and the first riddle at `now`.
#[must_use]
pub fn decide(config: &GateConfig, query: &Query, now: Timestamp, first_step: &str) -> GateDecision {
    let open = match config.target {
        Some(target) => now >= target,
        None => true,
    };
    if DevOverride::resolve(config, query).active || open {
        GateDecision::Enter(Route::riddle(first_step))
    } else {
        GateDecision::ShowCountdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(build_dev: bool, token: Option<&str>) -> GateConfig {
        GateConfig {
            target: Some(Timestamp(10_000)),
            build_dev,
            dev_token: token.map(String::from),
        }
    }

    #[test]
    fn override_truth_table() {
        let none = Query::default();
        let dev1 = Query::parse("dev=1");
        let dev0 = Query::parse("dev=0");
        let tok = Query::parse("devToken=s3cret");
        let bad_tok = Query::parse("devToken=nope");
        let empty_tok = Query::parse("devToken=");

        assert!(!DevOverride::resolve(&config(false, None), &none).active);
        assert!(DevOverride::resolve(&config(true, None), &none).active);
        assert!(DevOverride::resolve(&config(false, None), &dev1).active);
        assert!(!DevOverride::resolve(&config(false, None), &dev0).active);
        assert!(DevOverride::resolve(&config(false, Some("s3cret")), &tok).active);
        assert!(!DevOverride::resolve(&config(false, Some("s3cret")), &bad_tok).active);
        assert!(!DevOverride::resolve(&config(false, None), &tok).active);
        // An empty configured token never matches, not even an empty value.
        assert!(!DevOverride::resolve(&config(false, Some("")), &empty_tok).active);
    }

    #[test]
    fn gate_waits_for_target() {
        let cfg = config(false, None);
        let q = Query::default();
        assert_eq!(decide(&cfg, &q, Timestamp(9_999), "1"), GateDecision::ShowCountdown);
        assert_eq!(
            decide(&cfg, &q, Timestamp(10_000), "1"),
            GateDecision::Enter(Route::riddle("1"))
        );
    }

    #[test]
    fn override_and_bad_target_enter() {
        let q = Query::parse("dev=1");
        assert_eq!(
            decide(&config(false, None), &q, Timestamp(0), "1"),
            GateDecision::Enter(Route::riddle("1"))
        );
        let unparsed = GateConfig {
            target: None,
            ..GateConfig::default()
        };
        assert_eq!(
            decide(&unparsed, &Query::default(), Timestamp(0), "1"),
            GateDecision::Enter(Route::riddle("1"))
        );
    }
}
