// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reads the hunt configuration embedded in the page.

use alloc::format;
use alloc::string::String;

use web_sys::Document;

use waypost_backend_web::now;
use waypost_core::config::HuntConfig;
use waypost_core::trace::{HostErrorEvent, HostOp, TraceSink, Tracer};

/// Id of the `<script type="application/json">` element holding the config.
pub(crate) const CONFIG_ELEMENT_ID: &str = "waypost-config";

/// Parses and validates a JSON configuration.
pub(crate) fn parse(json: &str) -> Result<HuntConfig, String> {
    let config: HuntConfig = serde_json::from_str(json).map_err(|e| format!("{e}"))?;
    config.validate().map_err(|e| format!("{e}"))
}

/// Returns the page's configuration, or the built-in hunt when there is none.
///
/// A config block that fails to parse or validate is reported to `sink` and
/// ignored as a whole.
pub(crate) fn load(doc: &Document, sink: &mut dyn TraceSink) -> HuntConfig {
    let Some(text) = doc
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return HuntConfig::default();
    };
    if text.trim().is_empty() {
        return HuntConfig::default();
    }
    match parse(&text) {
        Ok(config) => config,
        Err(detail) => {
            Tracer::new(sink).host_error(&HostErrorEvent {
                at: now(),
                op: HostOp::Config,
                detail: &detail,
            });
            HuntConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_merge_with_defaults() {
        let config = parse(r#"{ "target_date": "2030-01-01T09:00:00", "prompt_step": null }"#)
            .unwrap();
        assert_eq!(config.target_date, "2030-01-01T09:00:00");
        assert_eq!(config.prompt_step, None);
        assert_eq!(config.riddles.len(), 4);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(parse("{ not json").is_err());
        let err = parse(r#"{ "prompt_step": "9" }"#).unwrap_err();
        assert!(err.contains('9'), "got: {err}");
    }
}
