// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The location bar: current path, query string and history.

use alloc::string::String;

use wasm_bindgen::prelude::*;
use web_sys::{History, Location};

fn location() -> Result<Location, JsValue> {
    web_sys::window()
        .map(|w| w.location())
        .ok_or_else(|| JsValue::from_str("no window"))
}

fn history() -> Result<History, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .history()
}

/// `location.pathname`.
pub fn pathname() -> Result<String, JsValue> {
    location()?.pathname()
}

/// `location.search`, including the leading `?` when non-empty.
pub fn search() -> Result<String, JsValue> {
    location()?.search()
}

/// Adds a history entry for `path` without reloading.
pub fn push(path: &str) -> Result<(), JsValue> {
    history()?.push_state_with_url(&JsValue::NULL, "", Some(path))
}

/// Replaces the current history entry with `path` without reloading.
pub fn replace(path: &str) -> Result<(), JsValue> {
    history()?.replace_state_with_url(&JsValue::NULL, "", Some(path))
}

/// Reloads the page.
pub fn reload() -> Result<(), JsValue> {
    location()?.reload()
}
