// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The page shell: owns the configuration, the trace sink and the mounted
//! view, and switches views on navigation.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use core::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement};

use waypost_backend_web::{ConsoleSink, defer, dom, location, now};
use waypost_core::config::HuntConfig;
use waypost_core::gate::GateConfig;
use waypost_core::route::{Query, Route, RouteMatch};
use waypost_core::subscription::Subscriptions;
use waypost_core::trace::{HostErrorEvent, HostOp, NavTarget, NavigateEvent, Tracer};

use crate::{gate, map, riddle};

pub(crate) struct Shell {
    pub(crate) doc: Document,
    pub(crate) root: HtmlElement,
    pub(crate) config: HuntConfig,
    pub(crate) gate: GateConfig,
    pub(crate) query: Query,
    sink: RefCell<ConsoleSink>,
    view: RefCell<Option<Subscriptions>>,
}

impl Shell {
    pub(crate) fn new(
        doc: Document,
        root: HtmlElement,
        config: HuntConfig,
        gate: GateConfig,
        query: Query,
        sink: ConsoleSink,
    ) -> Self {
        Self {
            doc,
            root,
            config,
            gate,
            query,
            sink: RefCell::new(sink),
            view: RefCell::new(None),
        }
    }

    /// Runs `f` against a tracer writing to the console.
    pub(crate) fn trace(&self, f: impl FnOnce(&mut Tracer<'_>)) {
        let mut sink = self.sink.borrow_mut();
        let mut tracer = Tracer::new(&mut *sink);
        f(&mut tracer);
    }

    /// Logs a failed host call. Never fatal.
    pub(crate) fn host_error(&self, op: HostOp, err: &JsValue) {
        let detail = err.as_string().unwrap_or_else(|| format!("{err:?}"));
        self.trace(|t| {
            t.host_error(&HostErrorEvent {
                at: now(),
                op,
                detail: &detail,
            });
        });
    }

    /// Runs `f` on the mounted view's subscriptions. Returns `None` when no
    /// view is mounted.
    pub(crate) fn with_subs<R>(&self, f: impl FnOnce(&mut Subscriptions) -> R) -> Option<R> {
        self.view.borrow_mut().as_mut().map(f)
    }

    /// Navigates to `path` after the current callback returns.
    pub(crate) fn navigate(self: &Rc<Self>, path: impl Into<String>) {
        let shell = Rc::clone(self);
        let path = path.into();
        defer(move || {
            if let Err(err) = location::push(&path) {
                shell.host_error(HostOp::History, &err);
            }
            shell.show(&path);
        });
    }

    /// Replaces the current location with `route` after the current callback
    /// returns.
    pub(crate) fn redirect(self: &Rc<Self>, route: &Route) {
        let shell = Rc::clone(self);
        let path = route.path();
        defer(move || shell.mount_path(&path, true));
    }

    /// Tears down the mounted view and mounts the one for `path`.
    pub(crate) fn show(self: &Rc<Self>, path: &str) {
        self.mount_path(path, false);
    }

    fn mount_path(self: &Rc<Self>, path: &str, redirect: bool) {
        let (route, redirected) = match Route::resolve(path, &self.config.riddles) {
            RouteMatch::Show(route) => (route, redirect),
            RouteMatch::Redirect(route) => (route, true),
        };
        if redirected && let Err(err) = location::replace(&route.path()) {
            self.host_error(HostOp::History, &err);
        }
        self.trace(|t| {
            t.navigate(&NavigateEvent {
                at: now(),
                to: NavTarget::from(&route),
                redirect: redirected,
            });
        });

        let previous = self.view.take();
        drop(previous);
        dom::clear(&self.root);

        let mut subs = Subscriptions::new();
        let mounted = match &route {
            Route::Gate => gate::mount(self, &mut subs),
            Route::Riddle(step) => riddle::mount(self, step, &mut subs),
            Route::Final => map::mount(self, &mut subs),
        };
        if let Err(err) = mounted {
            self.host_error(HostOp::Dom, &err);
            self.root
                .set_text_content(Some(&err.as_string().unwrap_or_else(|| "erro".to_string())));
        }
        *self.view.borrow_mut() = Some(subs);
    }
}
