// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The final screen: a schematic map from the participant to the
//! destination, updated live until they arrive.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use kurbo::{CubicBez, Point};
use wasm_bindgen::JsValue;
use web_sys::{Element, HtmlButtonElement, HtmlElement};

use waypost_backend_web::dom::{self, Listener};
use waypost_backend_web::{PositionWatch, RafLoop, locate_once, location, now};
use waypost_core::geo::{GeoFix, format_accuracy, format_distance, format_eta};
use waypost_core::navigator::{GeoError, LocateOptions, Navigator, Reading};
use waypost_core::projection::{Canvas, RouteGeometry};
use waypost_core::subscription::{SubscriptionKind, Subscriptions};
use waypost_core::trace::{ArrivalEvent, GeoErrorEvent, GeoFixEvent, HostOp};

use crate::shell::Shell;
use crate::ui;

/// SVG path data for a cubic segment.
fn path_data(c: &CubicBez) -> String {
    format!(
        "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
        c.p0.x, c.p0.y, c.p1.x, c.p1.y, c.p2.x, c.p2.y, c.p3.x, c.p3.y
    )
}

struct MapUi {
    status: HtmlElement,
    panel: HtmlElement,
    route: Element,
    user: Element,
    destination: Element,
    marker: Element,
    distance: HtmlElement,
    eta: HtmlElement,
    accuracy: HtmlElement,
    modal: HtmlElement,
    dismiss: HtmlButtonElement,
    failure: HtmlElement,
    failure_text: HtmlElement,
    retry: HtmlButtonElement,
}

impl MapUi {
    fn build(shell: &Shell) -> Result<Self, JsValue> {
        let doc = &shell.doc;
        let card = ui::card(doc, &shell.root)?;
        card.append_child(&dom::text_element(doc, "h1", ui::TITLE, "Destino final")?.into())?;
        let status = dom::text_element(doc, "p", ui::MUTED, "Obtendo sua localização…")?;
        card.append_child(&status)?;

        let panel = dom::element(doc, "div")?;
        dom::style(&panel, "display: grid; gap: 12px; width: 100%; justify-items: center;")?;
        dom::set_visible(&panel, false)?;

        let size = Canvas::MAP.size;
        let view_box = format!("0 0 {} {}", size.width, size.height);
        let svg = ui::svg(doc, "svg")?;
        ui::attrs(
            &svg,
            &[
                ("viewBox", &view_box),
                ("width", "100%"),
                ("style", "border-radius: 12px; background: rgba(0,0,0,0.25);"),
            ],
        )?;
        let route = ui::svg(doc, "path")?;
        ui::attrs(
            &route,
            &[
                ("fill", "none"),
                ("stroke", "rgba(224,184,90,0.7)"),
                ("stroke-width", "4"),
                ("stroke-dasharray", "10 8"),
                ("stroke-linecap", "round"),
            ],
        )?;
        let destination = ui::svg(doc, "circle")?;
        ui::attrs(&destination, &[("r", "12"), ("fill", "#e0b85a")])?;
        let user = ui::svg(doc, "circle")?;
        ui::attrs(
            &user,
            &[("r", "9"), ("fill", "#5ab0e0"), ("stroke", "#fff"), ("stroke-width", "2")],
        )?;
        let marker = ui::svg(doc, "circle")?;
        ui::attrs(&marker, &[("r", "5"), ("fill", "#fff")])?;
        svg.append_child(&route)?;
        svg.append_child(&destination)?;
        svg.append_child(&user)?;
        svg.append_child(&marker)?;
        panel.append_child(&svg)?;

        let stats = dom::element(doc, "div")?;
        dom::style(&stats, "display: flex; gap: 18px; flex-wrap: wrap; justify-content: center;")?;
        let distance = dom::text_element(doc, "span", "font-size: 20px; font-weight: 600;", "")?;
        let eta = dom::text_element(doc, "span", "font-size: 20px;", "")?;
        stats.append_child(&distance)?;
        stats.append_child(&eta)?;
        panel.append_child(&stats)?;
        let accuracy = dom::text_element(doc, "p", ui::MUTED, "")?;
        panel.append_child(&accuracy)?;
        card.append_child(&panel)?;

        let failure = dom::element(doc, "div")?;
        dom::style(&failure, "display: grid; gap: 10px; justify-items: center;")?;
        let failure_text = dom::text_element(doc, "p", ui::ERROR, "")?;
        let retry = ui::button(doc, "Tentar Novamente", ui::BUTTON)?;
        failure.append_child(&failure_text)?;
        failure.append_child(&retry)?;
        dom::set_visible(&failure, false)?;
        card.append_child(&failure)?;

        let modal = dom::element(doc, "div")?;
        dom::style(&modal, ui::OVERLAY)?;
        let dialog = dom::element(doc, "div")?;
        dom::style(&dialog, ui::DIALOG)?;
        dialog.append_child(&dom::text_element(
            doc,
            "h2",
            "margin: 0; font-size: 24px;",
            "Você chegou!",
        )?.into())?;
        dialog.append_child(&dom::text_element(
            doc,
            "p",
            ui::MUTED,
            "Parabéns, você encontrou o destino final.",
        )?.into())?;
        let dismiss = ui::button(doc, "Entendi", ui::BUTTON)?;
        dialog.append_child(&dismiss)?;
        modal.append_child(&dialog)?;
        dom::set_visible(&modal, false)?;
        shell.root.append_child(&modal)?;

        Ok(Self {
            status,
            panel,
            route,
            user,
            destination,
            marker,
            distance,
            eta,
            accuracy,
            modal,
            dismiss,
            failure,
            failure_text,
            retry,
        })
    }

    fn render(
        &self,
        reading: &Reading,
        arrived: bool,
        geometry: &RouteGeometry,
    ) -> Result<(), JsValue> {
        self.status.set_text_content(Some(status_text(arrived)));
        self.distance
            .set_text_content(Some(&format_distance(reading.distance_km)));
        self.eta
            .set_text_content(Some(&format_eta(reading.eta_minutes)));
        self.accuracy.set_text_content(Some(&format!(
            "Precisão: {}",
            format_accuracy(reading.fix.accuracy_m)
        )));
        self.route.set_attribute("d", &path_data(&geometry.curve))?;
        place(&self.user, geometry.user)?;
        place(&self.destination, geometry.destination)?;
        place(&self.marker, geometry.user)?;
        dom::set_visible(&self.panel, true)
    }

    fn show_failure(&self, error: GeoError) -> Result<(), JsValue> {
        self.failure_text.set_text_content(Some(error.message()));
        self.status.set_text_content(None);
        dom::set_visible(&self.panel, false)?;
        dom::set_visible(&self.failure, true)
    }
}

/// Headline above the map. Follows the session arrival latch.
fn status_text(arrived: bool) -> &'static str {
    if arrived {
        "Você está no local!"
    } else {
        "Siga até o destino"
    }
}

fn place(circle: &Element, at: Point) -> Result<(), JsValue> {
    circle.set_attribute("cx", &format!("{:.1}", at.x))?;
    circle.set_attribute("cy", &format!("{:.1}", at.y))
}

struct MapView {
    shell: Rc<Shell>,
    ui: MapUi,
    navigator: RefCell<Navigator>,
}

pub(crate) fn mount(shell: &Rc<Shell>, subs: &mut Subscriptions) -> Result<(), JsValue> {
    let view = Rc::new(MapView {
        shell: Rc::clone(shell),
        ui: MapUi::build(shell)?,
        navigator: RefCell::new(Navigator::new(shell.config.destination, Canvas::MAP)),
    });

    let dismiss = {
        let view = Rc::clone(&view);
        Listener::new(&view.ui.dismiss.clone(), "click", move |_| {
            view.navigator.borrow_mut().dismiss_modal();
            view.sync_modal();
        })?
    };
    subs.push(SubscriptionKind::Listener, dismiss);

    let retry = {
        let shell = Rc::clone(shell);
        Listener::new(&view.ui.retry, "click", move |_| {
            if let Err(err) = location::reload() {
                shell.host_error(HostOp::History, &err);
            }
        })?
    };
    subs.push(SubscriptionKind::Listener, retry);

    let on_fix = {
        let view = Rc::clone(&view);
        move |fix: GeoFix| {
            view.handle_fix(fix);
            view.start_tracking();
        }
    };
    let on_error = {
        let view = Rc::clone(&view);
        move |error: GeoError| view.initial_error(error)
    };
    match locate_once(&LocateOptions::DEFAULT, on_fix, on_error) {
        Ok(request) => {
            subs.push(SubscriptionKind::LocationWatch, request);
        }
        Err(error) => view.initial_error(error),
    }
    Ok(())
}

impl MapView {
    fn handle_fix(&self, fix: GeoFix) {
        let at = now();
        let update = self.navigator.borrow_mut().on_fix(fix);
        let Some(update) = update else {
            return;
        };
        let reading = update.reading;
        self.shell.trace(|t| {
            t.geo_fix(&GeoFixEvent {
                at,
                latitude: fix.point.latitude,
                longitude: fix.point.longitude,
                accuracy_m: fix.accuracy_m,
                distance_m: reading.distance_m(),
                near: reading.near,
            });
            if update.arrived_now {
                t.arrival(&ArrivalEvent {
                    at,
                    distance_m: reading.distance_m(),
                });
            }
        });
        let (arrived, geometry) = {
            let navigator = self.navigator.borrow();
            (navigator.has_arrived(), navigator.geometry())
        };
        if let Some(geometry) = geometry
            && let Err(err) = self.ui.render(&reading, arrived, &geometry)
        {
            self.shell.host_error(HostOp::Dom, &err);
        }
        self.sync_modal();
    }

    /// Follows the participant after the first fix.
    fn start_tracking(self: &Rc<Self>) {
        let on_fix = {
            let view = Rc::clone(self);
            move |fix: GeoFix| view.handle_fix(fix)
        };
        let on_error = {
            let view = Rc::clone(self);
            move |error: GeoError| {
                view.navigator.borrow_mut().on_watch_error(error);
                view.shell.trace(|t| {
                    t.geo_error(&GeoErrorEvent {
                        at: now(),
                        error,
                        initial: false,
                    });
                });
            }
        };
        match PositionWatch::start(&LocateOptions::DEFAULT, on_fix, on_error) {
            Ok(watch) => {
                self.shell
                    .with_subs(|subs| subs.push(SubscriptionKind::LocationWatch, watch));
            }
            Err(error) => self.shell.trace(|t| {
                t.geo_error(&GeoErrorEvent {
                    at: now(),
                    error,
                    initial: false,
                });
            }),
        }

        let view = Rc::clone(self);
        let animation = RafLoop::new(move |frame_ms| {
            let at = view.navigator.borrow_mut().marker_at(frame_ms);
            if let Some(at) = at
                && let Err(err) = place(&view.ui.marker, at)
            {
                view.shell.host_error(HostOp::Dom, &err);
            }
        });
        animation.start();
        self.shell
            .with_subs(|subs| subs.push(SubscriptionKind::AnimationFrame, animation));
    }

    fn initial_error(&self, error: GeoError) {
        let failed = self.navigator.borrow_mut().on_initial_error(error);
        self.shell.trace(|t| {
            t.geo_error(&GeoErrorEvent {
                at: now(),
                error,
                initial: true,
            });
        });
        if failed && let Err(err) = self.ui.show_failure(error) {
            self.shell.host_error(HostOp::Dom, &err);
        }
    }

    fn sync_modal(&self) {
        let open = self.navigator.borrow().modal_open();
        if let Err(err) = dom::set_visible(&self.ui.modal, open) {
            self.shell.host_error(HostOp::Dom, &err);
        }
    }
}

#[cfg(test)]
mod tests {
    use waypost_core::geo::GeoPoint;
    use waypost_core::navigator::DestinationConfig;
    use waypost_core::time::Timestamp;

    use super::*;

    #[test]
    fn path_data_lists_all_control_points() {
        let c = CubicBez::new((0.0, 1.0), (2.0, 3.0), (4.0, 5.0), (6.0, 7.0));
        assert_eq!(
            path_data(&c),
            "M 0.0 1.0 C 2.0 3.0, 4.0 5.0, 6.0 7.0",
            "path data should spell out the curve"
        );
    }

    #[test]
    fn status_follows_arrival_latch() {
        let mut nav = Navigator::new(DestinationConfig::default(), Canvas::MAP);
        let dest = nav.destination().point;
        let fix = |latitude: f64| GeoFix {
            point: GeoPoint::new(latitude, dest.longitude),
            accuracy_m: 10.0,
            timestamp: Timestamp(0),
        };
        nav.on_fix(fix(dest.latitude));
        let noisy = nav.on_fix(fix(dest.latitude + 0.0012)).expect("tracking");
        assert!(!noisy.reading.near, "the noisy fix is outside the radius");
        assert_eq!(
            status_text(nav.has_arrived()),
            "Você está no local!",
            "status should not flicker back after arrival"
        );
        assert_eq!(status_text(false), "Siga até o destino");
    }
}
