// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routes and query strings.
//!
//! | path             | route                 |
//! |------------------|-----------------------|
//! | `/`              | [`Route::Gate`]       |
//! | `/riddle/:step`  | [`Route::Riddle`]     |
//! | `/final`         | [`Route::Final`]      |
//!
//! Anything else, including a riddle step missing from the table, redirects
//! to the gate.

use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::riddle::RiddleTable;

/// A screen of the hunt.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Countdown gate at `/`.
    Gate,
    /// Riddle screen at `/riddle/:step`.
    Riddle(String),
    /// Map screen at `/final`.
    Final,
}

impl Route {
    /// Parses a location pathname. Returns `None` for unknown shapes.
    ///
    /// A trailing slash is ignored.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Self::Gate),
            "/final" => Some(Self::Final),
            _ => {
                let step = trimmed.strip_prefix("/riddle/")?;
                if step.is_empty() || step.contains('/') {
                    None
                } else {
                    Some(Self::Riddle(step.to_owned()))
                }
            }
        }
    }

    /// Parses `path` and checks riddle steps against `table`.
    #[must_use]
    pub fn resolve(path: &str, table: &RiddleTable) -> RouteMatch {
        match Self::parse(path) {
            Some(Self::Riddle(step)) if table.get_by_path(&step).is_none() => {
                RouteMatch::Redirect(Self::Gate)
            }
            Some(route) => RouteMatch::Show(route),
            None => RouteMatch::Redirect(Self::Gate),
        }
    }

    /// Route for riddle `step`.
    #[must_use]
    pub fn riddle(step: &str) -> Self {
        Self::Riddle(step.to_owned())
    }

    /// Pathname for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Gate => "/".to_owned(),
            Self::Riddle(step) => format!("/riddle/{step}"),
            Self::Final => "/final".to_owned(),
        }
    }
}

/// Outcome of [`Route::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteMatch {
    /// Render this route.
    Show(Route),
    /// Replace the location with this route, then render it.
    Redirect(Route),
}

impl RouteMatch {
    /// The route that ends up on screen.
    #[must_use]
    pub fn route(&self) -> &Route {
        match self {
            Self::Show(r) | Self::Redirect(r) => r,
        }
    }
}

/// Decoded `key=value` pairs of a query string, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Parses `search`, with or without the leading `?`, as
    /// `application/x-www-form-urlencoded`.
    ///
    /// `+` decodes to a space and malformed percent escapes are kept
    /// literally.
    #[must_use]
    pub fn parse(search: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        let pairs = form_urlencoded::parse(search.as_bytes())
            .into_owned()
            .collect();
        Self { pairs }
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Gate));
        assert_eq!(Route::parse(""), Some(Route::Gate));
        assert_eq!(Route::parse("/final"), Some(Route::Final));
        assert_eq!(Route::parse("/final/"), Some(Route::Final));
        assert_eq!(Route::parse("/riddle/2"), Some(Route::riddle("2")));
        assert_eq!(Route::parse("/riddle/2/"), Some(Route::riddle("2")));
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert_eq!(Route::parse("/riddle"), None);
        assert_eq!(Route::parse("/riddle/"), None);
        assert_eq!(Route::parse("/riddle/1/extra"), None);
        assert_eq!(Route::parse("/nope"), None);
        assert_eq!(Route::parse("/finale"), None);
    }

    #[test]
    fn resolve_redirects_to_gate() {
        let table = RiddleTable::default();
        assert_eq!(
            Route::resolve("/riddle/3", &table),
            RouteMatch::Show(Route::riddle("3"))
        );
        assert_eq!(
            Route::resolve("/riddle/9", &table),
            RouteMatch::Redirect(Route::Gate)
        );
        assert_eq!(
            Route::resolve("/somewhere", &table),
            RouteMatch::Redirect(Route::Gate)
        );
        assert_eq!(Route::resolve("/final", &table).route(), &Route::Final);
    }

    #[test]
    fn paths_round_trip() {
        for route in [Route::Gate, Route::riddle("4"), Route::Final] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn query_decoding() {
        let q = Query::parse("?dev=1&devToken=a%2Bb+c&flag&bad=%zz&tail=%4");
        assert_eq!(q.get("dev"), Some("1"));
        assert_eq!(q.get("devToken"), Some("a+b c"));
        assert_eq!(q.get("flag"), Some(""));
        assert_eq!(q.get("bad"), Some("%zz"));
        assert_eq!(q.get("tail"), Some("%4"));
        assert_eq!(q.get("missing"), None);
        assert_eq!(Query::parse(""), Query::default());
    }

    #[test]
    fn query_decodes_utf8_and_skips_empty_pairs() {
        let q = Query::parse("?&pista=S%C3%A3o+Jo%C3%A3o&&dev=1");
        assert_eq!(q.get("pista"), Some("São João"));
        assert_eq!(q.get("dev"), Some("1"));
        assert_eq!(q.get(""), None, "empty segments are not pairs");
    }

    #[test]
    fn first_value_wins() {
        let q = Query::parse("dev=0&dev=1");
        assert_eq!(q.get("dev"), Some("0"));
    }
}
