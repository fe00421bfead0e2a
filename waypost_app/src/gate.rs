// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gate screen: a countdown ring until the hunt opens.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::ToString as _;
use core::cell::{Cell, RefCell};
use core::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::{Element, HtmlElement};

use waypost_backend_web::{Interval, Timeout, dom, now};
use waypost_core::countdown::{
    Countdown, CountdownState, MainUnit, RING_RADIUS, StartAction, TickOutcome, ring_dash_offset,
};
use waypost_core::gate::{GateDecision, decide};
use waypost_core::route::Route;
use waypost_core::subscription::{SubscriptionId, SubscriptionKind, Subscriptions};
use waypost_core::time::Duration;
use waypost_core::trace::{CountdownCompleteEvent, CountdownTickEvent, HostOp};

use crate::shell::Shell;
use crate::ui;

struct GateUi {
    ring: Element,
    numeral: HtmlElement,
    unit: HtmlElement,
    breakdown: HtmlElement,
    progress: HtmlElement,
    headline: HtmlElement,
}

impl GateUi {
    fn build(shell: &Shell) -> Result<Self, JsValue> {
        let doc = &shell.doc;
        let card = ui::card(doc, &shell.root)?;

        let headline = dom::text_element(doc, "h1", ui::TITLE, "A caçada começa em")?;
        card.append_child(&headline)?;

        let ring_box = dom::element(doc, "div")?;
        dom::style(&ring_box, "position: relative; width: 200px; height: 200px;")?;
        let svg = ui::svg(doc, "svg")?;
        ui::attrs(&svg, &[("width", "200"), ("height", "200"), ("viewBox", "0 0 200 200")])?;
        let radius = RING_RADIUS.to_string();
        let track = ui::svg(doc, "circle")?;
        ui::attrs(
            &track,
            &[
                ("cx", "100"),
                ("cy", "100"),
                ("r", &radius),
                ("fill", "none"),
                ("stroke", "rgba(255,255,255,0.12)"),
                ("stroke-width", "10"),
            ],
        )?;
        let ring = ui::svg(doc, "circle")?;
        let circumference = format!("{:.3}", TAU * RING_RADIUS);
        ui::attrs(
            &ring,
            &[
                ("cx", "100"),
                ("cy", "100"),
                ("r", &radius),
                ("fill", "none"),
                ("stroke", "#e0b85a"),
                ("stroke-width", "10"),
                ("stroke-linecap", "round"),
                ("stroke-dasharray", &circumference),
                ("transform", "rotate(-90 100 100)"),
            ],
        )?;
        svg.append_child(&track)?;
        svg.append_child(&ring)?;
        ring_box.append_child(&svg)?;

        let center = dom::element(doc, "div")?;
        dom::style(
            &center,
            "position: absolute; inset: 0; display: grid; place-content: center; gap: 2px;",
        )?;
        let numeral = dom::text_element(doc, "span", "font-size: 56px; font-weight: 700;", "")?;
        let unit = dom::text_element(doc, "span", "font-size: 13px; letter-spacing: 0.2em;", "")?;
        center.append_child(&numeral)?;
        center.append_child(&unit)?;
        ring_box.append_child(&center)?;
        card.append_child(&ring_box)?;

        let breakdown = dom::text_element(doc, "p", "margin: 0; font-size: 20px;", "")?;
        let progress = dom::text_element(doc, "p", ui::MUTED, "")?;
        card.append_child(&breakdown)?;
        card.append_child(&progress)?;

        Ok(Self {
            ring,
            numeral,
            unit,
            breakdown,
            progress,
            headline,
        })
    }

    fn render(&self, state: &CountdownState) -> Result<(), JsValue> {
        let main = MainUnit::of(state.remaining);
        self.numeral.set_text_content(Some(&main.value().to_string()));
        self.unit.set_text_content(Some(main.label()));
        let b = state.remaining;
        self.breakdown.set_text_content(Some(&format!(
            "{}d {:02}h {:02}m {:02}s",
            b.days, b.hours, b.minutes, b.seconds
        )));
        self.progress
            .set_text_content(Some(&format!("{:.0}% do caminho", state.progress_percent)));
        self.ring.set_attribute(
            "stroke-dashoffset",
            &format!("{:.3}", ring_dash_offset(state.progress_percent)),
        )?;
        if state.is_complete {
            self.headline.set_text_content(Some("Chegou a hora!"));
        }
        Ok(())
    }
}

pub(crate) fn mount(shell: &Rc<Shell>, subs: &mut Subscriptions) -> Result<(), JsValue> {
    let first = shell.config.riddles.first().path.clone();
    if let GateDecision::Enter(route) = decide(&shell.gate, &shell.query, now(), &first) {
        shell.redirect(&route);
        return Ok(());
    }

    let ui = Rc::new(GateUi::build(shell)?);
    let countdown = Rc::new(RefCell::new(Countdown::new(
        shell.gate.target,
        now(),
        shell.config.countdown,
    )));
    ui.render(&countdown.borrow().state())?;

    let start = countdown.borrow().start();
    match start {
        StartAction::Tick { every } => {
            let interval_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
            let tick = {
                let shell = Rc::clone(shell);
                let ui = Rc::clone(&ui);
                let countdown = Rc::clone(&countdown);
                let interval_id = Rc::clone(&interval_id);
                move || {
                    let at = now();
                    let outcome = countdown.borrow_mut().tick(at);
                    match outcome {
                        TickOutcome::Running(state) => {
                            shell.trace(|t| {
                                t.countdown_tick(&CountdownTickEvent {
                                    at,
                                    remaining: Duration::from_millis(
                                        state.remaining.total_millis(),
                                    ),
                                    progress_percent: state.progress_percent,
                                });
                            });
                            if let Err(err) = ui.render(&state) {
                                shell.host_error(HostOp::Dom, &err);
                            }
                        }
                        TickOutcome::Completed {
                            state,
                            notify_after,
                        } => {
                            shell.trace(|t| {
                                t.countdown_complete(&CountdownCompleteEvent { at, notify_after });
                            });
                            if let Err(err) = ui.render(&state) {
                                shell.host_error(HostOp::Dom, &err);
                            }
                            schedule_entry(&shell, &countdown, notify_after);
                            if let Some(id) = interval_id.take() {
                                shell.with_subs(|subs| subs.cancel(id));
                            }
                        }
                        TickOutcome::Idle => {}
                    }
                }
            };
            let id = subs.push(SubscriptionKind::Interval, Interval::new(every, tick));
            interval_id.set(Some(id));
        }
        StartAction::NotifyAfter(delay) => {
            let shell_ref = Rc::clone(shell);
            let countdown = Rc::clone(&countdown);
            subs.push(
                SubscriptionKind::Timeout,
                Timeout::new(delay, move || enter(&shell_ref, &countdown)),
            );
        }
    }
    Ok(())
}

fn schedule_entry(shell: &Rc<Shell>, countdown: &Rc<RefCell<Countdown>>, delay: Duration) {
    let shell_ref = Rc::clone(shell);
    let countdown = Rc::clone(countdown);
    shell.with_subs(|subs| {
        subs.push(
            SubscriptionKind::Timeout,
            Timeout::new(delay, move || enter(&shell_ref, &countdown)),
        )
    });
}

fn enter(shell: &Rc<Shell>, countdown: &RefCell<Countdown>) {
    if countdown.borrow_mut().notify() {
        let first = shell.config.riddles.first().path.clone();
        shell.navigate(Route::riddle(&first).path());
    }
}
